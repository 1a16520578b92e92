pub mod probe;
pub mod report;
pub mod runner;
pub mod schema;
pub mod utils;

// Re-export common items
pub use probe::BackendProbe;
pub use report::generate_report;
pub use runner::run_probe;
pub use schema::SchemaVerifier;

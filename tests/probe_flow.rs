mod support;

use rider_tester::probe::{self, BackendProbe};
use rider_tester::utils::config::ProbeConfig;
use serde_json::json;
use support::{Canned, MockBackend};

fn config_for(server: &MockBackend, timeout_secs: u64) -> ProbeConfig {
    ProbeConfig::new(server.base_url(), timeout_secs).expect("valid mock URL")
}

/// Backend that registers fine and serves every GPS route
fn healthy_routes(wildcard_status: u16) -> Vec<(&'static str, &'static str, Canned)> {
    vec![
        ("GET", "/api/health", Canned::json(200, json!({ "status": "ok" }))),
        (
            "POST",
            "/api/auth/register",
            Canned::json(200, json!({ "access_token": "tok1" })),
        ),
        ("GET", "/api/gps/all", Canned::json(200, json!([]))),
        (
            "GET",
            "/api/gps/locations",
            Canned::json(200, json!([{ "rider_id": "r1" }])),
        ),
        ("POST", "/api/gps", Canned::text(200, "OK")),
        (
            "GET",
            "/api/gps/test-rider-123",
            Canned::json(wildcard_status, json!({ "error": "boom" })),
        ),
    ]
}

#[tokio::test]
async fn health_failure_prevents_further_calls() {
    let server = MockBackend::spawn(vec![(
        "GET",
        "/api/health",
        Canned::text(503, "unavailable"),
    )])
    .await;

    let probe = BackendProbe::new(config_for(&server, 5)).unwrap();
    let report = probe.run().await;

    assert_eq!(server.hit_lines(), ["GET /api/health"]);
    assert!(report.summary.aborted);
    assert!(!report.is_success());
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].message, "API returned 503");
}

#[tokio::test]
async fn unreachable_backend_aborts_with_connection_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = ProbeConfig::new(&format!("http://127.0.0.1:{}", port), 2).unwrap();
    let report = BackendProbe::new(config).unwrap().run().await;

    assert!(report.summary.aborted);
    assert_eq!(report.records.len(), 1);
    assert!(report.records[0].message.starts_with("Connection failed"));
    assert_eq!(report.records[0].http_status, None);
}

#[tokio::test]
async fn duplicate_registration_falls_back_to_single_login() {
    let mut routes = healthy_routes(404);
    routes[1] = (
        "POST",
        "/api/auth/register",
        Canned::json(400, json!({ "error": "Email already registered" })),
    );
    routes.push((
        "POST",
        "/api/auth/login",
        Canned::json(200, json!({ "access_token": "tok-login" })),
    ));
    let server = MockBackend::spawn(routes).await;

    let mut probe = BackendProbe::new(config_for(&server, 5)).unwrap();
    assert!(probe.check_health().await);
    assert!(probe.authenticate().await);
    assert_eq!(probe.auth_token(), Some("tok-login"));

    assert_eq!(server.count("POST", "/api/auth/register"), 1);
    assert_eq!(server.count("POST", "/api/auth/login"), 1);

    let login = probe
        .records()
        .iter()
        .find(|r| r.name == probe::USER_LOGIN)
        .unwrap();
    assert!(login.success);

    // Later requests carry the login token
    assert!(probe.check_location_update(probe::GPS_POST, "/api/gps").await);
    let post = server
        .hits()
        .into_iter()
        .find(|h| h.method == "POST" && h.path == "/api/gps")
        .unwrap();
    assert_eq!(post.authorization.as_deref(), Some("Bearer tok-login"));
    let sent: serde_json::Value = serde_json::from_str(&post.body).unwrap();
    assert_eq!(sent["latitude"], json!(-6.2088));
    assert_eq!(sent["longitude"], json!(106.8456));
}

#[tokio::test]
async fn full_run_with_404_wildcard_succeeds() {
    let server = MockBackend::spawn(healthy_routes(404)).await;

    let report = BackendProbe::new(config_for(&server, 5)).unwrap().run().await;

    assert!(report.is_success());
    assert!(report.summary.authenticated);
    assert!(report.summary.retrieval_working);
    assert!(report.summary.update_working);
    assert!(report.summary.route_order_clean);

    let wildcard = report.record(probe::WILDCARD_ROUTE).unwrap();
    assert!(wildcard.success);
    assert_eq!(wildcard.http_status, Some(404));

    // /api/gps/update is not served; POST /api/gps alone carries the update check
    let update = report.record(probe::GPS_UPDATE).unwrap();
    assert!(!update.success);

    assert_eq!(
        server.hit_lines(),
        [
            "GET /api/health",
            "POST /api/auth/register",
            "GET /api/gps/all",
            "GET /api/gps/locations",
            "POST /api/gps",
            "POST /api/gps/update",
            "GET /api/gps/test-rider-123",
        ]
    );
}

#[tokio::test]
async fn wildcard_500_is_reported_but_does_not_gate() {
    let server = MockBackend::spawn(healthy_routes(500)).await;

    let report = BackendProbe::new(config_for(&server, 5)).unwrap().run().await;

    assert!(report.is_success());
    assert!(!report.summary.route_order_clean);

    let wildcard = report.record(probe::WILDCARD_ROUTE).unwrap();
    assert!(!wildcard.success);
    assert!(wildcard.message.contains("route order"));
    assert_eq!(wildcard.http_status, Some(500));
}

#[tokio::test]
async fn failed_auth_skips_updates_but_still_checks_routing() {
    let mut routes = healthy_routes(404);
    routes[1] = (
        "POST",
        "/api/auth/register",
        Canned::json(403, json!({ "error": "Registrasi dinonaktifkan" })),
    );
    let server = MockBackend::spawn(routes).await;

    let report = BackendProbe::new(config_for(&server, 5)).unwrap().run().await;

    assert!(!report.summary.authenticated);
    assert_eq!(server.count("POST", "/api/gps"), 0);
    assert_eq!(server.count("POST", "/api/gps/update"), 0);
    assert_eq!(server.count("POST", "/api/auth/login"), 0);
    assert_eq!(server.count("GET", "/api/gps/test-rider-123"), 1);

    let registration = report.record(probe::USER_REGISTRATION).unwrap();
    assert!(registration.message.starts_with("Registration failed: 403"));

    // Retrieval alone decides the outcome when unauthenticated
    assert!(report.is_success());
}

#[tokio::test]
async fn timeout_fails_one_check_and_continues() {
    let mut routes = healthy_routes(404);
    routes[2] = (
        "GET",
        "/api/gps/all",
        Canned::json(200, json!([])).delayed(std::time::Duration::from_secs(5)),
    );
    let server = MockBackend::spawn(routes).await;

    let report = BackendProbe::new(config_for(&server, 1)).unwrap().run().await;

    let all = report.record(probe::GPS_ALL).unwrap();
    assert!(!all.success);
    assert!(all.message.starts_with("Request failed"));
    assert_eq!(all.http_status, None);

    assert_eq!(server.count("GET", "/api/gps/locations"), 1);
    assert!(report.summary.retrieval_working);
    assert!(report.is_success());
}

#[tokio::test]
async fn run_probe_writes_reports() {
    let server = MockBackend::spawn(healthy_routes(404)).await;
    let dir = tempfile::tempdir().unwrap();

    let report = rider_tester::run_probe(config_for(&server, 5), dir.path(), true)
        .await
        .unwrap();

    let saved = rider_tester::report::load(&dir.path().join("results.json")).unwrap();
    assert_eq!(saved.session_id, report.session_id);
    assert_eq!(saved.records.len(), report.records.len());

    let xml = std::fs::read_to_string(dir.path().join("junit.xml")).unwrap();
    assert_eq!(xml.matches("<testcase").count(), report.records.len());
    assert_eq!(xml.matches("<failure").count(), report.summary.failed as usize);
}

#[tokio::test]
async fn rejected_login_after_duplicate_registration_runs_unauthenticated() {
    let mut routes = healthy_routes(404);
    routes[1] = (
        "POST",
        "/api/auth/register",
        Canned::json(400, json!({ "error": "Email already registered" })),
    );
    routes.push((
        "POST",
        "/api/auth/login",
        Canned::json(401, json!({ "error": "Invalid credentials" })),
    ));
    let server = MockBackend::spawn(routes).await;

    let report = BackendProbe::new(config_for(&server, 5)).unwrap().run().await;

    assert_eq!(server.count("POST", "/api/auth/register"), 1);
    assert_eq!(server.count("POST", "/api/auth/login"), 1);

    let login = report.record(probe::USER_LOGIN).unwrap();
    assert!(!login.success);
    assert!(login.message.starts_with("Login failed: 401"));
    assert_eq!(login.http_status, Some(401));
    assert!(report.record(probe::USER_REGISTRATION).is_none());

    assert!(!report.summary.authenticated);
    assert_eq!(server.count("POST", "/api/gps"), 0);
    assert_eq!(server.count("POST", "/api/gps/update"), 0);
    assert!(report.record(probe::GPS_POST).is_none());

    // Retrieval alone decides the outcome when unauthenticated
    assert!(report.summary.retrieval_working);
    assert!(report.is_success());
}

#[tokio::test]
async fn empty_400_registration_logs_in_once() {
    let mut routes = healthy_routes(404);
    routes[1] = ("POST", "/api/auth/register", Canned::text(400, ""));
    routes.push((
        "POST",
        "/api/auth/login",
        Canned::json(200, json!({ "access_token": "tok-empty" })),
    ));
    let server = MockBackend::spawn(routes).await;

    let report = BackendProbe::new(config_for(&server, 5)).unwrap().run().await;

    assert_eq!(server.count("POST", "/api/auth/register"), 1);
    assert_eq!(server.count("POST", "/api/auth/login"), 1);
    assert!(report.record(probe::USER_LOGIN).unwrap().success);
    assert!(report.summary.authenticated);

    let post = server
        .hits()
        .into_iter()
        .find(|h| h.method == "POST" && h.path == "/api/gps")
        .unwrap();
    assert_eq!(post.authorization.as_deref(), Some("Bearer tok-empty"));
    assert!(report.is_success());
}

#[tokio::test]
async fn login_without_access_token_is_a_failure() {
    let mut routes = healthy_routes(404);
    routes[1] = (
        "POST",
        "/api/auth/register",
        Canned::json(400, json!({ "error": "Email already registered" })),
    );
    routes.push((
        "POST",
        "/api/auth/login",
        Canned::json(200, json!({ "user": { "id": "u1" } })),
    ));
    let server = MockBackend::spawn(routes).await;

    let report = BackendProbe::new(config_for(&server, 5)).unwrap().run().await;

    let login = report.record(probe::USER_LOGIN).unwrap();
    assert!(!login.success);
    assert_eq!(
        login.message,
        "Login succeeded but no access_token was returned"
    );
    assert_eq!(login.http_status, Some(200));

    assert!(!report.summary.authenticated);
    assert_eq!(server.count("POST", "/api/auth/login"), 1);
    assert_eq!(server.count("POST", "/api/gps"), 0);
    assert_eq!(server.count("POST", "/api/gps/update"), 0);
}

use super::types::ProbeReport;
use super::ReportError;
use crate::runner::state::CheckRecord;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::Path;

/// Generate JUnit XML report string from a probe report
pub fn generate_junit_xml(report: &ProbeReport) -> Result<String, ReportError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let total = report.records.len().to_string();
    let failures = report
        .records
        .iter()
        .filter(|r| !r.success)
        .count()
        .to_string();
    let time = (report.summary.total_duration_ms.unwrap_or(0) as f64 / 1000.0).to_string();

    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", "rider-tester-probe"));
    suites_start.push_attribute(("tests", total.as_str()));
    suites_start.push_attribute(("failures", failures.as_str()));
    suites_start.push_attribute(("time", time.as_str()));
    writer.write_event(Event::Start(suites_start))?;

    // One suite per run, named after the backend under test
    let mut suite_start = BytesStart::new("testsuite");
    suite_start.push_attribute(("name", report.backend_url.as_str()));
    suite_start.push_attribute(("tests", total.as_str()));
    suite_start.push_attribute(("failures", failures.as_str()));
    suite_start.push_attribute(("skipped", "0"));
    suite_start.push_attribute(("id", report.session_id.as_str()));
    suite_start.push_attribute(("time", time.as_str()));
    suite_start.push_attribute(("timestamp", report.generated_at.as_str()));
    writer.write_event(Event::Start(suite_start))?;

    for record in &report.records {
        write_test_case(&mut writer, record)?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8(bytes)?)
}

fn write_test_case<W: std::io::Write>(
    writer: &mut Writer<W>,
    record: &CheckRecord,
) -> Result<(), ReportError> {
    let mut case_start = BytesStart::new("testcase");
    case_start.push_attribute(("name", record.name.as_str()));
    case_start.push_attribute(("classname", "gps"));
    writer.write_event(Event::Start(case_start))?;

    if !record.success {
        let mut fail_start = BytesStart::new("failure");
        fail_start.push_attribute(("message", record.message.as_str()));
        fail_start.push_attribute(("type", "AssertionError"));
        writer.write_event(Event::Start(fail_start))?;

        if let Some(status) = record.http_status {
            let text = format!("HTTP {}", status);
            writer.write_event(Event::Text(BytesText::new(&text)))?;
        }

        writer.write_event(Event::End(BytesEnd::new("failure")))?;
    }

    let out = format!("{} {}", record.timestamp.to_rfc3339(), record.message);
    writer.write_event(Event::Start(BytesStart::new("system-out")))?;
    writer.write_event(Event::Text(BytesText::new(&out)))?;
    writer.write_event(Event::End(BytesEnd::new("system-out")))?;

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

/// Write `junit.xml` into the output directory
pub fn write_report(report: &ProbeReport, output_dir: &Path) -> Result<(), ReportError> {
    let xml = generate_junit_xml(report)?;
    let path = output_dir.join("junit.xml");
    super::write_file(&path, &xml)?;
    println!("    Generated JUnit report: {}", path.display());
    Ok(())
}

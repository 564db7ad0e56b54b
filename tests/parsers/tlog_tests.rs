//! Comprehensive tests for the telemetry log parser
//!
//! Tests cover:
//! - Statement dispatch (init, create, sense, actuate, declarations)
//! - Key:value block handling and overwrite rules
//! - Diagnostics for malformed input
//! - Unterminated blocks
//! - Timestamp conventions

use crate::common::float_cmp::*;
use crate::common::synthetic;
use tlogview::parsers::{Category, DiagnosticKind, Parseable, TimeScale, Tlog, TlogError};
use tlogview::store::{TelemetryLog, TimeWindow};

fn parse(text: &str) -> TelemetryLog {
    Tlog::default()
        .parse(text)
        .expect("Parsing never fails on malformed input")
}

fn diagnostic_kinds(log: &TelemetryLog) -> Vec<DiagnosticKind> {
    log.diagnostics().iter().map(|d| d.kind).collect()
}

// ============================================
// Basic Parsing Tests
// ============================================

#[test]
fn test_parse_sonar_example() {
    let sample = r#"100 sense sonar1 {
firstDistance:12.5
}
200 sense sonar1 {
firstDistance:13.0
}
"#;
    let log = parse(sample);
    let series = log
        .time_series(Category::Sensor, "sonar1", "firstDistance", TimeWindow::all())
        .unwrap();

    assert_eq!(series.times, vec![100.0, 200.0]);
    assert_eq!(series.values, vec![12.5, 13.0]);
}

#[test]
fn test_parse_empty_input() {
    let log = parse("");
    assert_eq!(log.reading_count(), 0);
    assert!(log.diagnostics().is_empty());
    assert!(log.devices(Category::Sensor).is_empty());
    assert!(log.devices(Category::Actuator).is_empty());
}

#[test]
fn test_parse_comments_only() {
    let log = parse("# header\n\n   # another\n");
    assert_eq!(log.reading_count(), 0);
    assert!(log.diagnostics().is_empty());
}

#[test]
fn test_every_numeric_pair_recorded() {
    let text = synthetic::sense(
        40,
        "imu",
        &[("gx", 0.5), ("gy", -1.25), ("gz", 3.0), ("ax", 9.81)],
    );
    let log = parse(&text);

    assert_eq!(log.reading_count(), 4);
    assert_eq!(
        log.measurements(Category::Sensor, "imu").unwrap(),
        vec!["ax", "gx", "gy", "gz"]
    );
    let gy = log
        .time_series(Category::Sensor, "imu", "gy", TimeWindow::all())
        .unwrap();
    assert_eq!(gy.times, vec![40.0]);
    assert_eq!(gy.values, vec![-1.25]);
}

#[test]
fn test_actuate_targets_actuator_store() {
    let text = synthetic::actuate(75, "esc1", &[("pwm", 1500.0)]);
    let log = parse(&text);

    assert_eq!(log.devices(Category::Actuator), vec!["esc1"]);
    assert!(log.devices(Category::Sensor).is_empty());

    let series = log
        .time_series(Category::Actuator, "esc1", "pwm", TimeWindow::all())
        .unwrap();
    assert_eq!(series.values, vec![1500.0]);
}

#[test]
fn test_value_syntax_variants() {
    let sample = "10 sense baro {\na:-3\nb:+2.5\nc:1e3\nd:-4.5E-2\ne:.5\n}\n";
    let log = parse(sample);
    assert!(log.diagnostics().is_empty());

    let value = |name: &str| {
        log.time_series(Category::Sensor, "baro", name, TimeWindow::all())
            .unwrap()
            .values[0]
    };
    assert_eq!(value("a"), -3.0);
    assert_eq!(value("b"), 2.5);
    assert_eq!(value("c"), 1000.0);
    assert_approx_eq(value("d"), -0.045, DEFAULT_TOLERANCE);
    assert_eq!(value("e"), 0.5);
}

#[test]
fn test_duplicate_timestamp_last_write_wins() {
    let sample = r#"100 sense gps {
alt:10
alt:11
}
100 sense gps {
alt:12
}
"#;
    let log = parse(sample);
    let series = log
        .time_series(Category::Sensor, "gps", "alt", TimeWindow::all())
        .unwrap();

    assert_eq!(series.times, vec![100.0]);
    assert_eq!(series.values, vec![12.0]);
}

#[test]
fn test_out_of_order_timestamps_sorted_on_query() {
    let text = [
        synthetic::sense(300, "baro", &[("alt", 3.0)]),
        synthetic::sense(100, "baro", &[("alt", 1.0)]),
        synthetic::sense(200, "baro", &[("alt", 2.0)]),
    ]
    .concat();
    let log = parse(&text);

    let series = log
        .time_series(Category::Sensor, "baro", "alt", TimeWindow::all())
        .unwrap();
    assert_eq!(series.times, vec![100.0, 200.0, 300.0]);
    assert_eq!(series.values, vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_brace_on_own_line_in_block_nests() {
    // A nested block inside a value block raises the depth; its lines are
    // still read as readings when they are single tokens
    let sample = r#"10 sense gps {
fix {
sats:7
}
hdop:0.9
}
20 sense gps {
hdop:1.1
}
"#;
    let log = parse(sample);

    let hdop = log
        .time_series(Category::Sensor, "gps", "hdop", TimeWindow::all())
        .unwrap();
    assert_eq!(hdop.times, vec![10.0, 20.0]);

    let sats = log
        .time_series(Category::Sensor, "gps", "sats", TimeWindow::all())
        .unwrap();
    assert_eq!(sats.values, vec![7.0]);
}

#[test]
fn test_multi_token_lines_in_block_ignored() {
    let sample = "10 sense gps {\nlat: 52.1\nlon:4.3 extra\nalt:3\n}\n";
    let log = parse(sample);

    assert!(log.diagnostics().is_empty());
    assert_eq!(log.measurements(Category::Sensor, "gps").unwrap(), vec!["alt"]);
}

#[test]
fn test_extra_statement_arguments_ignored() {
    let sample = "10 sense gps primary {\nalt:3\n}\n";
    let log = parse(sample);
    assert_eq!(log.devices(Category::Sensor), vec!["gps"]);
}

// ============================================
// Statement Dispatch Tests
// ============================================

#[test]
fn test_init_is_noop() {
    let log = parse("0 init\n5 init extra args\n");
    assert_eq!(log.reading_count(), 0);
    assert!(log.diagnostics().is_empty());
}

#[test]
fn test_create_binfile_is_silent() {
    let log = parse("0 create binfile flight.bin\n");
    assert_eq!(log.reading_count(), 0);
    assert!(log.diagnostics().is_empty());
}

#[test]
fn test_create_unknown_reports_once() {
    let log = parse("0 create foo\n");
    assert_eq!(log.reading_count(), 0);
    assert_eq!(diagnostic_kinds(&log), vec![DiagnosticKind::UnknownCreate]);
    assert!(log.diagnostics()[0].message.contains("foo"));
}

#[test]
fn test_create_without_argument() {
    let log = parse("0 create\n");
    assert_eq!(diagnostic_kinds(&log), vec![DiagnosticKind::ShortCreate]);
}

#[test]
fn test_missing_verb() {
    let log = parse("42\n");
    assert_eq!(diagnostic_kinds(&log), vec![DiagnosticKind::MissingVerb]);
    assert_eq!(log.diagnostics()[0].timestamp, Some(42));
}

#[test]
fn test_unknown_verb_silently_ignored() {
    let log = parse("10 heartbeat ok\n20 land\n");
    assert!(log.diagnostics().is_empty());
    assert_eq!(log.reading_count(), 0);
}

#[test]
fn test_verbs_are_case_sensitive() {
    let log = parse("10 Sense gps {\nalt:1\n}\n");
    // "Sense" is unknown, so its block lines become top-level lines
    assert!(log.devices(Category::Sensor).is_empty());
    assert_eq!(
        diagnostic_kinds(&log),
        vec![DiagnosticKind::UnrecognizedLine, DiagnosticKind::UnrecognizedLine]
    );
}

#[test]
fn test_declaration_blocks_skipped() {
    let sample = r#"10 actuators {
    esc1 {
        pwm:1000
    }
}
10 sensors {
    sonar1 {
        firstDistance:5
    }
}
20 sense sonar1 {
    firstDistance:6
}
"#;
    let log = parse(sample);

    assert!(log.diagnostics().is_empty());
    assert!(log.devices(Category::Actuator).is_empty());
    let series = log
        .time_series(Category::Sensor, "sonar1", "firstDistance", TimeWindow::all())
        .unwrap();
    assert_eq!(series.times, vec![20.0]);
    assert_eq!(series.values, vec![6.0]);
}

// ============================================
// Diagnostics Tests
// ============================================

#[test]
fn test_unrecognized_line_skipped() {
    let sample = "hello world\n-5 sense gps {\n10 sense gps {\nalt:2\n}\n";
    let log = parse(sample);

    assert_eq!(
        diagnostic_kinds(&log),
        vec![DiagnosticKind::UnrecognizedLine, DiagnosticKind::UnrecognizedLine]
    );
    assert_eq!(log.diagnostics()[0].line, 1);
    assert_eq!(log.diagnostics()[0].timestamp, None);
    assert_eq!(log.reading_count(), 1);
}

#[test]
fn test_unrecognized_line_keeps_last_timestamp() {
    let log = parse("10 init\n\nbogus\n");
    let diag = &log.diagnostics()[0];
    assert_eq!(diag.kind, DiagnosticKind::UnrecognizedLine);
    assert_eq!(diag.line, 3);
    assert_eq!(diag.timestamp, Some(10));
}

#[test]
fn test_non_numeric_value_dropped() {
    let sample = "10 sense gps {\nfoo:bar\nalt:3\n}\n";
    let log = parse(sample);

    assert_eq!(diagnostic_kinds(&log), vec![DiagnosticKind::NonNumericValue]);
    assert_eq!(log.diagnostics()[0].line, 2);
    assert_eq!(log.measurements(Category::Sensor, "gps").unwrap(), vec!["alt"]);
    assert!(matches!(
        log.time_series(Category::Sensor, "gps", "foo", TimeWindow::all()),
        Err(TlogError::MeasurementNotFound { .. })
    ));
}

#[test]
fn test_malformed_pairs() {
    let sample = "10 sense gps {\nnocolon\na:b:c\n{\n}\n}\n";
    let log = parse(sample);

    // A lone "{" is a single-token line, so it is checked as a pair too
    assert_eq!(
        diagnostic_kinds(&log),
        vec![
            DiagnosticKind::MalformedPair,
            DiagnosticKind::MalformedPair,
            DiagnosticKind::MalformedPair,
        ]
    );
    assert_eq!(log.reading_count(), 0);
}

#[test]
fn test_empty_actuate_opens_no_device() {
    let log = parse("50 actuate\n");

    assert_eq!(diagnostic_kinds(&log), vec![DiagnosticKind::EmptyDevice]);
    assert!(log.devices(Category::Actuator).is_empty());
    assert!(log.devices(Category::Sensor).is_empty());
}

#[test]
fn test_empty_sense_does_not_consume_following_lines() {
    let log = parse("50 sense\n60 sense gps {\nalt:1\n}\n");

    assert_eq!(diagnostic_kinds(&log), vec![DiagnosticKind::EmptyDevice]);
    assert_eq!(log.reading_count(), 1);
}

#[test]
fn test_device_opened_even_without_readings() {
    let log = parse("10 actuate servo {\n}\n");

    assert_eq!(log.devices(Category::Actuator), vec!["servo"]);
    assert!(log.measurements(Category::Actuator, "servo").unwrap().is_empty());
}

// ============================================
// Unterminated Block Tests
// ============================================

#[test]
fn test_unterminated_value_block_keeps_readings() {
    let log = parse("10 sense gps {\nalt:1\nalt2:2\n");

    assert!(log.diagnostics().is_empty());
    assert_eq!(log.reading_count(), 2);
}

#[test]
fn test_unterminated_declaration_swallows_rest() {
    let sample = format!(
        "10 sensors {{\n{}",
        synthetic::sense(20, "gps", &[("alt", 1.0)])
    );
    let log = parse(&sample);

    // The sense statement's braces keep the declaration open until EOF
    assert!(log.diagnostics().is_empty());
    assert_eq!(log.reading_count(), 0);
}

// ============================================
// Timestamp Convention Tests
// ============================================

#[test]
fn test_ticks_convention() {
    let text = synthetic::sense(1_500_000, "imu", &[("gz", 0.1)]);
    let log = Tlog::new(TimeScale::Ticks).parse(&text).unwrap();

    let series = log
        .time_series(Category::Sensor, "imu", "gz", TimeWindow::all())
        .unwrap();
    assert_eq!(series.times, vec![1_500_000.0]);
    assert_eq!(log.time_scale(), TimeScale::Ticks);
}

#[test]
fn test_microseconds_convention() {
    let text = [
        synthetic::sense(1_500_000, "imu", &[("gz", 0.1)]),
        synthetic::sense(2_000_000, "imu", &[("gz", 0.2)]),
    ]
    .concat();
    let log = Tlog::new(TimeScale::Microseconds).parse(&text).unwrap();

    let series = log
        .time_series(Category::Sensor, "imu", "gz", TimeWindow::all())
        .unwrap();
    assert_eq!(series.times, vec![1.5, 2.0]);

    let windowed = log
        .time_series(Category::Sensor, "imu", "gz", TimeWindow::new(1.5, 2.0))
        .unwrap();
    assert_eq!(windowed.times, vec![1.5]);
}

#[test]
fn test_diagnostic_timestamps_are_raw_ticks() {
    let text = "1500000 create foo\n";
    let log = Tlog::new(TimeScale::Microseconds).parse(text).unwrap();
    assert_eq!(log.diagnostics()[0].timestamp, Some(1_500_000));
}

// ============================================
// Scale Tests
// ============================================

#[test]
fn test_large_log() {
    let text = synthetic::sonar_log(2000);
    let log = parse(&text);

    let series = log
        .time_series(Category::Sensor, "sonar1", "firstDistance", TimeWindow::all())
        .unwrap();
    assert_eq!(series.len(), 2000);
    assert_eq!(series.times[1999], 199_900.0);
    assert_eq!(series.values[1999], 999.5);
}

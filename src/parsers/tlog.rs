//! Flight-controller telemetry log (.tlog) parser
//!
//! A `.tlog` file is a sequence of statements, one per line:
//!
//! ```text
//! <timestamp> <verb> [args...]
//! ```
//!
//! `sense` and `actuate` statements open a brace block of `key:value`
//! readings for the named device. `sensors` and `actuators` declare the
//! device schema in a block that is skipped. `init` and `create binfile`
//! carry nothing needed for data extraction.
//!
//! Malformed input never aborts the parse: every anomaly is recorded as a
//! [`Diagnostic`], traced at `warn` level, and skipped.

use std::path::Path;
use std::str::FromStr;
use strum::EnumString;

use super::cursor::Cursor;
use super::tokenizer::{tokenize, TokenLine};
use super::types::{Category, Diagnostic, DiagnosticKind, Parseable, TimeScale, TlogError};
use crate::store::{ReadingStore, TelemetryLog};

/// Statement verbs understood by the dispatcher
#[derive(Clone, Copy, Debug, EnumString, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
enum Verb {
    Init,
    Create,
    Actuators,
    Sensors,
    Actuate,
    Sense,
}

/// Argument of `create` that declares a binary companion file
const CREATE_BINFILE: &str = "binfile";

/// Telemetry log parser
#[derive(Clone, Copy, Debug, Default)]
pub struct Tlog {
    time_scale: TimeScale,
}

impl Tlog {
    pub fn new(time_scale: TimeScale) -> Self {
        Self { time_scale }
    }

    pub fn time_scale(&self) -> TimeScale {
        self.time_scale
    }

    /// Check if a file path looks like a telemetry log (.tlog)
    pub fn is_tlog_path(path: &Path) -> bool {
        if let Some(ext) = path.extension() {
            ext.to_string_lossy().to_lowercase() == "tlog"
        } else {
            false
        }
    }

    /// Detect telemetry log text: the first statement is an integer
    /// timestamp followed by a known verb
    pub fn detect(contents: &str) -> bool {
        let Some(first) = contents
            .lines()
            .enumerate()
            .find_map(|(idx, raw)| TokenLine::from_raw(idx + 1, raw))
        else {
            return false;
        };

        parse_timestamp(first.head()).is_some()
            && first
                .rest()
                .first()
                .is_some_and(|verb| Verb::from_str(verb).is_ok())
    }
}

impl Parseable for Tlog {
    fn parse(&self, contents: &str) -> Result<TelemetryLog, TlogError> {
        let lines = tokenize(contents);
        tracing::debug!("Tokenized {} statement lines", lines.len());

        let mut dispatcher = Dispatcher::new(&lines);
        dispatcher.run()?;

        let log = TelemetryLog::new(dispatcher.store, dispatcher.diagnostics, self.time_scale);
        tracing::info!(
            "Parsed {} readings from {} sensors and {} actuators ({} diagnostics)",
            log.reading_count(),
            log.devices(Category::Sensor).len(),
            log.devices(Category::Actuator).len(),
            log.diagnostics().len()
        );

        Ok(log)
    }
}

/// Largest tick count that survives conversion to `f64` exactly (2^53)
pub const MAX_TIMESTAMP: u64 = 1 << 53;

/// Timestamps are plain runs of ASCII digits no larger than
/// [`MAX_TIMESTAMP`]; signs and other numeric syntax are not timestamps
fn parse_timestamp(token: &str) -> Option<u64> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse::<u64>().ok().filter(|ticks| *ticks <= MAX_TIMESTAMP)
}

/// Parse a reading value. Underscores are accepted as digit separators
/// (`1_100`) but only between two digits.
fn parse_value(raw: &str) -> Option<f64> {
    if !raw.contains('_') {
        return raw.parse().ok();
    }

    let bytes = raw.as_bytes();
    let grouped = bytes.iter().enumerate().all(|(i, b)| {
        *b != b'_'
            || (i > 0
                && bytes[i - 1].is_ascii_digit()
                && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
    });
    if !grouped {
        return None;
    }
    raw.replace('_', "").parse().ok()
}

/// Statement interpreter. Owns the cursor and the store being built.
struct Dispatcher<'a> {
    cursor: Cursor<'a>,
    store: ReadingStore,
    diagnostics: Vec<Diagnostic>,
    /// Timestamp of the last statement that had one
    last_timestamp: Option<u64>,
}

impl<'a> Dispatcher<'a> {
    fn new(lines: &'a [TokenLine]) -> Self {
        Self {
            cursor: Cursor::new(lines),
            store: ReadingStore::default(),
            diagnostics: Vec::new(),
            last_timestamp: None,
        }
    }

    fn run(&mut self) -> Result<(), TlogError> {
        while self.cursor.has_more() {
            let line = self.cursor.next_line()?;

            let Some(timestamp) = parse_timestamp(line.head()) else {
                self.report(
                    DiagnosticKind::UnrecognizedLine,
                    line,
                    format!("unexpected line: {}", line),
                );
                continue;
            };

            self.last_timestamp = Some(timestamp);
            self.dispatch(line, timestamp)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, line: &'a TokenLine, timestamp: u64) -> Result<(), TlogError> {
        let Some((verb, args)) = line.rest().split_first() else {
            self.report(DiagnosticKind::MissingVerb, line, "no action in line".to_string());
            return Ok(());
        };

        let Ok(verb) = Verb::from_str(verb) else {
            tracing::debug!("Ignoring unknown verb '{}' at t={}", verb, timestamp);
            return Ok(());
        };

        match verb {
            Verb::Init => {}
            Verb::Create => self.process_create(line, args),
            Verb::Actuators | Verb::Sensors => {
                let skipped = self.cursor.skip_block()?;
                tracing::debug!("Skipped {:?} declaration block ({} lines)", verb, skipped);
            }
            Verb::Actuate => self.process_update(Category::Actuator, line, args, timestamp)?,
            Verb::Sense => self.process_update(Category::Sensor, line, args, timestamp)?,
        }
        Ok(())
    }

    fn process_create(&mut self, line: &TokenLine, args: &[String]) {
        match args.first().map(String::as_str) {
            None => self.report(
                DiagnosticKind::ShortCreate,
                line,
                "too short create statement".to_string(),
            ),
            // Binary companion files are not read
            Some(CREATE_BINFILE) => {}
            Some(_) => self.report(
                DiagnosticKind::UnknownCreate,
                line,
                format!("unrecognized create statement: create {}", args.join(" ")),
            ),
        }
    }

    /// Handle `actuate`/`sense`: open the device and read its value block
    fn process_update(
        &mut self,
        category: Category,
        line: &TokenLine,
        args: &[String],
        timestamp: u64,
    ) -> Result<(), TlogError> {
        let Some(device) = args.first() else {
            self.report(
                DiagnosticKind::EmptyDevice,
                line,
                format!("empty {} statement", verb_name(category)),
            );
            return Ok(());
        };

        self.store.device_mut(category, device);

        let mut depth = 1;
        while let Some(entry) = self.cursor.next_in_block(&mut depth)? {
            match entry.tokens() {
                [token] if token != "}" => {
                    self.record_pair(category, device, entry, token, timestamp);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn record_pair(
        &mut self,
        category: Category,
        device: &str,
        entry: &TokenLine,
        token: &str,
        timestamp: u64,
    ) {
        let parts: Vec<&str> = token.split(':').collect();
        let [key, raw_value] = parts.as_slice() else {
            self.report(
                DiagnosticKind::MalformedPair,
                entry,
                format!("unrecognized kv: {}", token),
            );
            return;
        };

        match parse_value(raw_value) {
            Some(value) => {
                self.store.record(category, device, key, timestamp, value);
            }
            None => self.report(
                DiagnosticKind::NonNumericValue,
                entry,
                format!("illegal kv: {}", token),
            ),
        }
    }

    fn report(&mut self, kind: DiagnosticKind, line: &TokenLine, message: String) {
        let diagnostic = Diagnostic {
            kind,
            line: line.number(),
            timestamp: self.last_timestamp,
            message,
        };
        tracing::warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }
}

fn verb_name(category: Category) -> &'static str {
    match category {
        Category::Sensor => "sense",
        Category::Actuator => "actuate",
    }
}

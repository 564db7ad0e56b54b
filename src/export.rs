//! Series export (CSV, JSON).

use serde::Serialize;
use std::io::Write;
use thiserror::Error;

use crate::parsers::TimeScale;
use crate::state::SeriesKey;
use crate::store::Series;

/// Errors that can occur while exporting a series
#[derive(Debug, Error)]
pub enum ExportError {
    /// Failed to write output
    #[error("Failed to write export: {0}")]
    WriteError(#[from] std::io::Error),

    /// Failed to serialize series
    #[error("Failed to serialize series: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Write a series as `time,value` CSV rows with a header
pub fn series_to_csv<W: Write>(
    series: &Series,
    time_scale: TimeScale,
    writer: &mut W,
) -> Result<(), ExportError> {
    writeln!(writer, "time_{},value", time_scale.unit())?;
    for (time, value) in series.points() {
        writeln!(writer, "{},{}", time, value)?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct SeriesDocument<'a> {
    category: String,
    device: &'a str,
    measurement: &'a str,
    time_unit: &'static str,
    times: &'a [f64],
    values: &'a [f64],
}

/// Render a series and its identity as pretty JSON
pub fn series_to_json(
    key: &SeriesKey,
    series: &Series,
    time_scale: TimeScale,
) -> Result<String, ExportError> {
    let doc = SeriesDocument {
        category: key.category.to_string(),
        device: &key.device,
        measurement: &key.measurement,
        time_unit: time_scale.unit(),
        times: &series.times,
        values: &series.values,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

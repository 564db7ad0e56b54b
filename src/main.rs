//! tlogview - inspect UAV flight-controller telemetry logs
//!
//! Prints a summary of the devices and measurements in a `.tlog` file,
//! exports single series, and renders series to PNG charts.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::Level;

use tlogview::export::{series_to_csv, series_to_json};
use tlogview::loader::load_tlog;
use tlogview::parsers::{Category, TimeScale};
use tlogview::render::{Chart, Trace, TraceStyle};
use tlogview::settings::ViewerSettings;
use tlogview::state::{LoadedFile, SeriesKey, CHART_COLORS};
use tlogview::store::TimeWindow;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Telemetry log file (.tlog)
    file: PathBuf,

    /// Timestamps are microsecond ticks; report times in seconds
    #[arg(long, global = true)]
    microseconds: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List devices, measurements and parse diagnostics
    Summary {
        /// Print every diagnostic
        #[arg(long)]
        diagnostics: bool,
    },
    /// Print one series
    Series {
        category: Category,
        device: String,
        measurement: String,
        #[command(flatten)]
        window: WindowArgs,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render a series (and an optional overlay on a second axis) to PNG
    Plot {
        category: Category,
        device: String,
        measurement: String,
        #[command(flatten)]
        window: WindowArgs,
        /// Trace style: scatter, line or step
        #[arg(long, default_value = "scatter")]
        style: TraceStyle,
        /// Second series on the right axis, as category/device/measurement
        #[arg(long)]
        overlay: Option<SeriesKey>,
        /// Trace style of the overlay
        #[arg(long, default_value = "step")]
        overlay_style: TraceStyle,
        /// Draw a zero reference line on the left axis
        #[arg(long)]
        zero_line: bool,
        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct WindowArgs {
    /// Include readings at or after this time
    #[arg(long)]
    from: Option<f64>,
    /// Include readings strictly before this time
    #[arg(long)]
    to: Option<f64>,
}

impl WindowArgs {
    fn window(&self) -> TimeWindow {
        TimeWindow::from_bounds(self.from, self.to)
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Csv,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; parse diagnostics are warnings
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let settings = ViewerSettings::load();
    let time_scale = if cli.microseconds {
        TimeScale::Microseconds
    } else {
        settings.time_scale
    };

    let loaded = load_tlog(&cli.file, time_scale)
        .with_context(|| format!("Failed to load {}", cli.file.display()))?;

    match cli.command.unwrap_or(Command::Summary { diagnostics: false }) {
        Command::Summary { diagnostics } => {
            print_summary(&loaded, diagnostics || settings.show_diagnostics)
        }
        Command::Series {
            category,
            device,
            measurement,
            window,
            format,
            output,
        } => {
            let key = SeriesKey::new(category, &device, &measurement);
            let series = loaded
                .log
                .time_series(category, &device, &measurement, window.window())?;

            let mut writer: Box<dyn Write> = match &output {
                Some(path) => Box::new(BufWriter::new(
                    File::create(path)
                        .with_context(|| format!("Failed to create {}", path.display()))?,
                )),
                None => Box::new(std::io::stdout().lock()),
            };

            match format {
                Format::Csv => series_to_csv(&series, time_scale, &mut writer)?,
                Format::Json => {
                    writeln!(writer, "{}", series_to_json(&key, &series, time_scale)?)?
                }
            }
            Ok(())
        }
        Command::Plot {
            category,
            device,
            measurement,
            window,
            style,
            overlay,
            overlay_style,
            zero_line,
            output,
        } => {
            let window = window.window();
            let primary = loaded
                .log
                .time_series(category, &device, &measurement, window)?;
            let secondary = match &overlay {
                Some(key) => Some(loaded.log.time_series(
                    key.category,
                    &key.device,
                    &key.measurement,
                    window,
                )?),
                None => None,
            };

            let mut chart = Chart::new(Trace::new(&primary, style, CHART_COLORS[0]))
                .with_size(settings.chart_width, settings.chart_height)
                .with_zero_line(zero_line);
            if let Some(series) = &secondary {
                chart = chart.with_secondary(Trace::new(series, overlay_style, CHART_COLORS[1]));
            }

            chart
                .save_png(&output)
                .with_context(|| format!("Failed to render {}", output.display()))?;
            println!("Wrote {}", output.display());
            Ok(())
        }
    }
}

fn print_summary(loaded: &LoadedFile, show_diagnostics: bool) -> Result<()> {
    let log = &loaded.log;
    let unit = log.time_scale().unit();

    println!("{}", loaded.name);
    println!("  readings: {}", log.reading_count());
    match log.time_range() {
        Some((start, end)) => println!("  time: {} .. {} {}", start, end, unit),
        None => println!("  time: (no readings)"),
    }

    for category in Category::ALL {
        let devices = log.devices(category);
        println!("{} ({} devices)", category, devices.len());
        for device in devices {
            println!("  {}", device);
            for measurement in log.measurements(category, device)? {
                let series =
                    log.time_series(category, device, measurement, TimeWindow::all())?;
                match (series.time_range(), series.value_range()) {
                    (Some((t0, t1)), Some((lo, hi))) => println!(
                        "    {:<24} {:>7} samples  t={}..{} {}  range {}..{}",
                        measurement,
                        series.len(),
                        t0,
                        t1,
                        unit,
                        lo,
                        hi
                    ),
                    _ => println!("    {:<24} {:>7} samples", measurement, series.len()),
                }
            }
        }
    }

    println!("diagnostics: {}", log.diagnostics().len());
    if show_diagnostics {
        for diagnostic in log.diagnostics() {
            println!("  [{}] {}", diagnostic.kind, diagnostic);
        }
    }
    Ok(())
}

//! Reading store and time-series queries.
//!
//! Readings are kept as category → device → measurement → tick → value.
//! Ticks are stored exactly as written in the log; the log's [`TimeScale`]
//! is applied when times leave the store, so ordering and overwrite rules
//! always operate on the raw integer timestamps.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::parsers::types::{Category, Diagnostic, TimeScale, TlogError};

/// Values of one measurement keyed by raw tick
pub type Readings = BTreeMap<u64, f64>;

/// All measurements reported by one device
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DeviceReadings {
    measurements: BTreeMap<String, Readings>,
}

impl DeviceReadings {
    pub fn measurement(&self, name: &str) -> Option<&Readings> {
        self.measurements.get(name)
    }

    /// Measurement names in sorted order
    pub fn measurement_names(&self) -> Vec<&str> {
        self.measurements.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Readings)> {
        self.measurements.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Total readings across all measurements
    pub fn reading_count(&self) -> usize {
        self.measurements.values().map(BTreeMap::len).sum()
    }
}

/// Category → device → measurement → readings
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ReadingStore {
    sensors: BTreeMap<String, DeviceReadings>,
    actuators: BTreeMap<String, DeviceReadings>,
}

impl ReadingStore {
    pub fn category(&self, category: Category) -> &BTreeMap<String, DeviceReadings> {
        match category {
            Category::Sensor => &self.sensors,
            Category::Actuator => &self.actuators,
        }
    }

    fn category_mut(&mut self, category: Category) -> &mut BTreeMap<String, DeviceReadings> {
        match category {
            Category::Sensor => &mut self.sensors,
            Category::Actuator => &mut self.actuators,
        }
    }

    pub fn device(&self, category: Category, name: &str) -> Option<&DeviceReadings> {
        self.category(category).get(name)
    }

    /// Get or create the entry for a device
    pub fn device_mut(&mut self, category: Category, name: &str) -> &mut DeviceReadings {
        self.category_mut(category)
            .entry(name.to_string())
            .or_default()
    }

    /// Record a reading, returning the value it replaced at the same tick
    pub fn record(
        &mut self,
        category: Category,
        device: &str,
        measurement: &str,
        tick: u64,
        value: f64,
    ) -> Option<f64> {
        self.device_mut(category, device)
            .measurements
            .entry(measurement.to_string())
            .or_default()
            .insert(tick, value)
    }

    pub fn reading_count(&self) -> usize {
        self.sensors
            .values()
            .chain(self.actuators.values())
            .map(DeviceReadings::reading_count)
            .sum()
    }
}

/// Half-open time window `[from, to)` in the log's reported time unit
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeWindow {
    pub from: f64,
    pub to: f64,
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::all()
    }
}

impl TimeWindow {
    /// Unbounded window
    pub fn all() -> Self {
        Self {
            from: f64::NEG_INFINITY,
            to: f64::INFINITY,
        }
    }

    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    pub fn starting_at(from: f64) -> Self {
        Self { from, ..Self::all() }
    }

    pub fn ending_before(to: f64) -> Self {
        Self { to, ..Self::all() }
    }

    /// Build from optional bounds, leaving missing ends unbounded
    pub fn from_bounds(from: Option<f64>, to: Option<f64>) -> Self {
        Self {
            from: from.unwrap_or(f64::NEG_INFINITY),
            to: to.unwrap_or(f64::INFINITY),
        }
    }

    #[inline]
    pub fn contains(&self, time: f64) -> bool {
        self.from <= time && time < self.to
    }
}

/// Parallel time/value sequences, times ascending
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Series {
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }

    /// (first, last) time, if any
    pub fn time_range(&self) -> Option<(f64, f64)> {
        Some((*self.times.first()?, *self.times.last()?))
    }

    /// (min, max) over finite values
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// A fully parsed telemetry log. Immutable once built.
#[derive(Clone, Debug, Default)]
pub struct TelemetryLog {
    store: ReadingStore,
    diagnostics: Vec<Diagnostic>,
    time_scale: TimeScale,
}

impl TelemetryLog {
    pub fn new(store: ReadingStore, diagnostics: Vec<Diagnostic>, time_scale: TimeScale) -> Self {
        Self {
            store,
            diagnostics,
            time_scale,
        }
    }

    pub fn store(&self) -> &ReadingStore {
        &self.store
    }

    pub fn sensors(&self) -> &BTreeMap<String, DeviceReadings> {
        self.store.category(Category::Sensor)
    }

    pub fn actuators(&self) -> &BTreeMap<String, DeviceReadings> {
        self.store.category(Category::Actuator)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn time_scale(&self) -> TimeScale {
        self.time_scale
    }

    pub fn reading_count(&self) -> usize {
        self.store.reading_count()
    }

    /// Device names in a category, sorted
    pub fn devices(&self, category: Category) -> Vec<&str> {
        self.store
            .category(category)
            .keys()
            .map(String::as_str)
            .collect()
    }

    /// Measurement names for a device, sorted
    pub fn measurements(&self, category: Category, device: &str) -> Result<Vec<&str>, TlogError> {
        Ok(self.lookup_device(category, device)?.measurement_names())
    }

    /// Readings of one measurement inside a half-open window.
    ///
    /// Unknown devices and measurements are errors, not empty series.
    pub fn time_series(
        &self,
        category: Category,
        device: &str,
        measurement: &str,
        window: TimeWindow,
    ) -> Result<Series, TlogError> {
        let readings = self
            .lookup_device(category, device)?
            .measurement(measurement)
            .ok_or_else(|| TlogError::MeasurementNotFound {
                category,
                device: device.to_string(),
                measurement: measurement.to_string(),
            })?;

        let mut series = Series::default();
        for (&tick, &value) in readings {
            let time = self.time_scale.apply(tick);
            if window.contains(time) {
                series.times.push(time);
                series.values.push(value);
            }
        }
        Ok(series)
    }

    /// Earliest and latest reading time across every series
    pub fn time_range(&self) -> Option<(f64, f64)> {
        let ticks = Category::ALL
            .iter()
            .flat_map(|&c| self.store.category(c).values())
            .flat_map(|device| device.measurements.values())
            .flat_map(|readings| {
                let first = readings.keys().next().copied();
                let last = readings.keys().next_back().copied();
                first.into_iter().chain(last)
            });

        let (min, max) = ticks.fold((u64::MAX, u64::MIN), |(lo, hi), t| (lo.min(t), hi.max(t)));
        if min <= max {
            Some((self.time_scale.apply(min), self.time_scale.apply(max)))
        } else {
            None
        }
    }

    fn lookup_device(
        &self,
        category: Category,
        device: &str,
    ) -> Result<&DeviceReadings, TlogError> {
        self.store
            .device(category, device)
            .ok_or_else(|| TlogError::DeviceNotFound {
                category,
                device: device.to_string(),
            })
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Chart and map payload types produced by the fire map analytics.
//!
//! Chart payloads are dense, fixed-shape JSON objects consumed directly by
//! the dashboard's charting library. Each type here owns its shape: keys
//! come from the closed [`Month`] and [`FireSeverity`] enumerations and
//! are emitted in a fixed order by hand-written `Serialize` impls, so
//! serializing the same value always produces the same bytes.

use std::collections::BTreeMap;

use fire_map_fire_models::{FireSeverity, Month};
use serde::ser::SerializeMap as _;
use serde::{Serialize, Serializer};

/// Number of countries in the multi-line trend chart.
pub const TOP_COUNTRY_COUNT: usize = 3;

/// Incident counts for each of the twelve months.
///
/// Serializes as `{"01": n, ..., "12": n}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthSeries {
    counts: [u64; 12],
}

impl MonthSeries {
    /// A series with every month at zero.
    #[must_use]
    pub const fn zeroed() -> Self {
        Self { counts: [0; 12] }
    }

    /// Count for `month`.
    #[must_use]
    pub const fn get(&self, month: Month) -> u64 {
        self.counts[month.index()]
    }

    /// Adds `count` to `month`.
    pub fn add(&mut self, month: Month, count: u64) {
        self.counts[month.index()] += count;
    }

    /// Sum over all months.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Iterates `(month, count)` pairs in calendar order.
    pub fn iter(&self) -> impl Iterator<Item = (Month, u64)> + '_ {
        Month::ALL.iter().map(|m| (*m, self.get(*m)))
    }
}

impl Serialize for MonthSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Month::ALL.len()))?;
        for (month, count) in self.iter() {
            map.serialize_entry(month.code(), &count)?;
        }
        map.end()
    }
}

/// Incident counts per month of a single year, for the line chart.
///
/// Serializes as `{"Jan": n, ..., "Dec": n}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthlyCounts {
    /// The underlying per-month counts.
    pub series: MonthSeries,
}

impl Serialize for MonthlyCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Month::ALL.len()))?;
        for (month, count) in self.series.iter() {
            map.serialize_entry(month.abbreviation(), &count)?;
        }
        map.end()
    }
}

/// Incident counts per severity level, for the pie chart.
///
/// Only severities with at least one incident are present. Serializes as
/// `{"1": n, "3": n}` in ascending severity order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    counts: BTreeMap<FireSeverity, u64>,
}

impl SeverityCounts {
    /// Adds `count` incidents of `severity`.
    pub fn add(&mut self, severity: FireSeverity, count: u64) {
        *self.counts.entry(severity).or_default() += count;
    }

    /// Count for `severity`, or `None` if it has no incidents.
    #[must_use]
    pub fn get(&self, severity: FireSeverity) -> Option<u64> {
        self.counts.get(&severity).copied()
    }

    /// Number of distinct severities present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no severities are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl Serialize for SeverityCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (severity, count) in &self.counts {
            map.serialize_entry(&severity.code(), count)?;
        }
        map.end()
    }
}

/// One line of the top-country trend chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryTrend {
    /// Country name, or `"Country N"` for a placeholder.
    pub country: String,
    /// Per-month counts for the year.
    pub months: MonthSeries,
    /// Whether this entry pads the chart rather than describing real data.
    pub placeholder: bool,
}

/// Monthly trends of the [`TOP_COUNTRY_COUNT`] countries with the most
/// incidents, for the multi-line chart.
///
/// Always holds exactly [`TOP_COUNTRY_COUNT`] entries. Serializes as
/// `{"<country>": {"01": n, ...}, ...}` in rank order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryTrends {
    entries: Vec<CountryTrend>,
}

impl CountryTrends {
    /// Builds the chart from countries already sorted by rank.
    ///
    /// Keeps the first [`TOP_COUNTRY_COUNT`] countries and pads with
    /// all-zero `"Country N"` entries until there are exactly that many.
    #[must_use]
    pub fn from_ranked(ranked: impl IntoIterator<Item = (String, MonthSeries)>) -> Self {
        let mut entries: Vec<CountryTrend> = ranked
            .into_iter()
            .take(TOP_COUNTRY_COUNT)
            .map(|(country, months)| CountryTrend {
                country,
                months,
                placeholder: false,
            })
            .collect();

        while entries.len() < TOP_COUNTRY_COUNT {
            entries.push(CountryTrend {
                country: format!("Country {}", entries.len() + 1),
                months: MonthSeries::zeroed(),
                placeholder: true,
            });
        }

        Self { entries }
    }

    /// Entries in rank order, placeholders last.
    #[must_use]
    pub fn entries(&self) -> &[CountryTrend] {
        &self.entries
    }
}

impl Serialize for CountryTrends {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.country, &entry.months)?;
        }
        map.end()
    }
}

/// Per-month incident counts for each severity level present in the data,
/// for the grouped bar chart.
///
/// Serializes as `{"<severity>": {"01": n, ...}, ...}` in ascending
/// severity order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeverityMonthBreakdown {
    series: BTreeMap<FireSeverity, MonthSeries>,
}

impl SeverityMonthBreakdown {
    /// Records that `severity` occurs in the data, without counting any
    /// month. Used for incidents whose date is unknown.
    pub fn touch(&mut self, severity: FireSeverity) -> &mut MonthSeries {
        self.series.entry(severity).or_default()
    }

    /// Adds `count` incidents of `severity` in `month`.
    pub fn add(&mut self, severity: FireSeverity, month: Month, count: u64) {
        self.touch(severity).add(month, count);
    }

    /// Series for `severity`, if present.
    #[must_use]
    pub fn get(&self, severity: FireSeverity) -> Option<&MonthSeries> {
        self.series.get(&severity)
    }

    /// Severities present, ascending.
    pub fn severities(&self) -> impl Iterator<Item = FireSeverity> + '_ {
        self.series.keys().copied()
    }
}

impl Serialize for SeverityMonthBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.series.len()))?;
        for (severity, months) in &self.series {
            map.serialize_entry(&severity.code(), months)?;
        }
        map.end()
    }
}

/// A fire station marker on the station map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationMarker {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// An incident marker on the incident map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentMarker {
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    /// `YYYY-MM-DD HH:MM`, or `N/A` when the incident has no date.
    pub date: String,
    pub severity: FireSeverity,
}

/// Everything the incident map page needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IncidentMap {
    /// One marker per incident.
    pub incidents: Vec<IncidentMarker>,
    /// Distinct cities among the incidents, sorted.
    pub cities: Vec<String>,
}

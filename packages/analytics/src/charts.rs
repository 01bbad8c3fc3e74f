//! Aggregations behind the dashboard charts.
//!
//! Month extraction happens in SQL with `strftime('%m', ...)`, which yields
//! `NULL` for incidents without a date. Those rows are never counted in a
//! month bucket.

use std::collections::BTreeMap;

use chrono::Datelike as _;
use fire_map_analytics_models::{
    CountryTrends, MonthSeries, MonthlyCounts, SeverityCounts, SeverityMonthBreakdown,
};
use fire_map_fire_models::{FireSeverity, Month};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::AnalyticsError;

/// The current calendar year (UTC), used as the default reporting year.
#[must_use]
pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

fn year_param(year: i32) -> DatabaseValue {
    DatabaseValue::String(format!("{year:04}"))
}

/// Converts a SQL `COUNT(*)` into an unsigned count.
#[allow(clippy::cast_sign_loss)]
const fn to_count(count: i64) -> u64 {
    if count < 0 { 0 } else { count as u64 }
}

/// Parses the `strftime('%m', ...)` output. `None` means the incident has
/// no date; an unexpected string is logged and treated the same way.
fn parse_month(raw: Option<&str>) -> Option<Month> {
    let raw = raw?;
    match Month::from_code(raw) {
        Ok(month) => Some(month),
        Err(e) => {
            log::warn!("Skipping aggregation row: {e}");
            None
        }
    }
}

fn parse_severity(raw: i64) -> Option<FireSeverity> {
    match FireSeverity::from_i64(raw) {
        Ok(severity) => Some(severity),
        Err(e) => {
            log::warn!("Skipping aggregation row: {e}");
            None
        }
    }
}

/// Builds the pie chart from `(severity_level, count)` rows.
pub fn tally_severities(rows: impl IntoIterator<Item = (i64, i64)>) -> SeverityCounts {
    let mut counts = SeverityCounts::default();
    for (severity, count) in rows {
        if let Some(severity) = parse_severity(severity) {
            counts.add(severity, to_count(count));
        }
    }
    counts
}

/// Builds the line chart from `(month, count)` rows.
///
/// All twelve months start at zero before any row is applied.
pub fn bucket_months(rows: impl IntoIterator<Item = (Option<String>, i64)>) -> MonthlyCounts {
    let mut series = MonthSeries::zeroed();
    for (month, count) in rows {
        if let Some(month) = parse_month(month.as_deref()) {
            series.add(month, to_count(count));
        }
    }
    MonthlyCounts { series }
}

/// Builds the top-country trend chart from `(country, month, count)` rows
/// covering a single year.
///
/// Countries are ranked by total count descending, ties broken by country
/// name ascending. Only dated rows contribute to a country's total.
pub fn rank_countries(
    rows: impl IntoIterator<Item = (String, Option<String>, i64)>,
) -> CountryTrends {
    let mut by_country: BTreeMap<String, MonthSeries> = BTreeMap::new();
    for (country, month, count) in rows {
        if let Some(month) = parse_month(month.as_deref()) {
            by_country
                .entry(country)
                .or_default()
                .add(month, to_count(count));
        }
    }

    // BTreeMap iteration is name-ascending and the sort is stable, so equal
    // totals keep alphabetical order.
    let mut ranked: Vec<(String, MonthSeries)> = by_country.into_iter().collect();
    ranked.sort_by(|(_, a), (_, b)| b.total().cmp(&a.total()));

    CountryTrends::from_ranked(ranked)
}

/// Builds the grouped bar chart from `(severity_level, month, count)` rows.
///
/// A severity that only appears on undated incidents still gets an
/// all-zero series.
pub fn breakdown_by_severity(
    rows: impl IntoIterator<Item = (i64, Option<String>, i64)>,
) -> SeverityMonthBreakdown {
    let mut breakdown = SeverityMonthBreakdown::default();
    for (severity, month, count) in rows {
        let Some(severity) = parse_severity(severity) else {
            continue;
        };
        match parse_month(month.as_deref()) {
            Some(month) => breakdown.add(severity, month, to_count(count)),
            None => {
                breakdown.touch(severity);
            }
        }
    }
    breakdown
}

/// Counts all incidents by severity level.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the database query fails.
pub async fn severity_counts(db: &dyn Database) -> Result<SeverityCounts, AnalyticsError> {
    let rows = db
        .query_raw_params(
            "SELECT severity_level, COUNT(*) AS cnt
             FROM fire_incident
             GROUP BY severity_level
             ORDER BY severity_level",
            &[],
        )
        .await?;

    log::debug!("severity_counts: {} group(s)", rows.len());

    Ok(tally_severities(rows.iter().map(|row| {
        let severity: i64 = row.to_value("severity_level").unwrap_or(0);
        let count: i64 = row.to_value("cnt").unwrap_or(0);
        (severity, count)
    })))
}

/// Counts the incidents of `year` per month.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the database query fails.
pub async fn monthly_counts(db: &dyn Database, year: i32) -> Result<MonthlyCounts, AnalyticsError> {
    let rows = db
        .query_raw_params(
            "SELECT strftime('%m', date_time) AS month, COUNT(*) AS cnt
             FROM fire_incident
             WHERE date_time IS NOT NULL
               AND strftime('%Y', date_time) = $1
             GROUP BY month
             ORDER BY month",
            &[year_param(year)],
        )
        .await?;

    log::debug!("monthly_counts({year}): {} month(s) with data", rows.len());

    Ok(bucket_months(rows.iter().map(|row| {
        let month: Option<String> = row.to_value("month").unwrap_or(None);
        let count: i64 = row.to_value("cnt").unwrap_or(0);
        (month, count)
    })))
}

/// Monthly trends for the three countries with the most incidents in
/// `year`, padded with placeholders when fewer countries have data.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the database query fails.
pub async fn top_country_trends(
    db: &dyn Database,
    year: i32,
) -> Result<CountryTrends, AnalyticsError> {
    let rows = db
        .query_raw_params(
            "SELECT l.country AS country,
                    strftime('%m', i.date_time) AS month,
                    COUNT(i.id) AS cnt
             FROM fire_incident i
             JOIN fire_locations l ON i.location_id = l.id
             WHERE i.date_time IS NOT NULL
               AND strftime('%Y', i.date_time) = $1
             GROUP BY l.country, month
             ORDER BY l.country, month",
            &[year_param(year)],
        )
        .await?;

    log::debug!("top_country_trends({year}): {} row(s)", rows.len());

    Ok(rank_countries(rows.iter().map(|row| {
        let country: String = row.to_value("country").unwrap_or_default();
        let month: Option<String> = row.to_value("month").unwrap_or(None);
        let count: i64 = row.to_value("cnt").unwrap_or(0);
        (country, month, count)
    })))
}

/// Per-month incident counts for each severity level, across all years.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the database query fails.
pub async fn severity_month_breakdown(
    db: &dyn Database,
) -> Result<SeverityMonthBreakdown, AnalyticsError> {
    let rows = db
        .query_raw_params(
            "SELECT severity_level,
                    strftime('%m', date_time) AS month,
                    COUNT(id) AS cnt
             FROM fire_incident
             GROUP BY severity_level, month
             ORDER BY severity_level, month",
            &[],
        )
        .await?;

    Ok(breakdown_by_severity(rows.iter().map(|row| {
        let severity: i64 = row.to_value("severity_level").unwrap_or(0);
        let month: Option<String> = row.to_value("month").unwrap_or(None);
        let count: i64 = row.to_value("cnt").unwrap_or(0);
        (severity, month, count)
    })))
}

// src/services/aggregate.rs
//
// Monthly aggregation for a single store: bucket normalized rows by
// calendar month, sum totals, attach the per-month category breakdown,
// and keep the most recent five months of history.

use log::info;
use std::collections::BTreeMap;

use crate::models::{HistoryPoint, NormalizedRow, Period, Table};
use crate::services::categories::{find_category_name_col, month_categories, wide_category_cols};

/// Rows before this year are outside the dashboard's window.
pub const CUTOFF_YEAR: i32 = 2020;

/// How many trailing months of history the payload carries.
pub const HISTORY_MONTHS: usize = 5;

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[derive(Debug)]
pub enum Aggregation {
    Ready {
        history: Vec<HistoryPoint>,
        /// Period of the last history point; the forecast lands one month after.
        last_period: Period,
        /// Chronologically last raw row, the forecast's feature source.
        latest_row: NormalizedRow,
    },
    /// Not enough data to build a history; the request degrades to an
    /// empty payload rather than an error.
    Insufficient,
}

/// Aggregate one store's normalized rows into monthly history points.
///
/// `rows` must already be scoped to a single store. Fewer than two
/// distinct months (or no rows at all inside the window) is reported as
/// `Insufficient`.
pub fn aggregate_store(
    store_id: u32,
    mut rows: Vec<NormalizedRow>,
    table: &Table,
    total_col: &str,
) -> Aggregation {
    rows.retain(|r| Period::from_date(r.date).year >= CUTOFF_YEAR);
    if rows.is_empty() {
        info!("No rows for store {} after normalization", store_id);
        return Aggregation::Insufficient;
    }
    rows.sort_by_key(|r| r.date);
    let latest_row = rows.last().cloned().expect("rows is non-empty");

    let mut buckets: BTreeMap<Period, Vec<NormalizedRow>> = BTreeMap::new();
    for row in rows {
        buckets.entry(Period::from_date(row.date)).or_default().push(row);
    }

    let name_col = find_category_name_col(table);
    let wide_cols = wide_category_cols(table, total_col);

    let mut history: Vec<(Period, HistoryPoint)> = buckets
        .into_iter()
        .map(|(period, month_rows)| {
            let total: f64 = month_rows.iter().map(|r| r.total_sales).sum();
            // fresh map per period, never reused across iterations
            let categories = month_categories(&month_rows, table, name_col, &wide_cols);
            let point = HistoryPoint {
                date: period.first_day().format("%Y-%m-%d").to_string(),
                label: period.label(),
                total_sales: round2(total),
                source: "history",
                categories,
            };
            (period, point)
        })
        .collect();

    if history.len() > HISTORY_MONTHS {
        history.drain(..history.len() - HISTORY_MONTHS);
    }
    if history.len() < 2 {
        info!(
            "Store {} has <2 months after grouping; returning empty forecast",
            store_id
        );
        return Aggregation::Insufficient;
    }

    let last_period = history.last().expect("history has >=2 points").0;
    Aggregation::Ready {
        history: history.into_iter().map(|(_, p)| p).collect(),
        last_period,
        latest_row,
    }
}

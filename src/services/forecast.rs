// src/services/forecast.rs
//
// The forecast pipeline: normalize the table's schema, scope to one
// store, aggregate monthly history, then ask the model for the next
// month. Recoverable gaps (unrecognizable schema, unknown store, too
// little history) come back as `Outcome::Empty`; only a prediction
// failure is an error.

use log::{info, warn};

use crate::models::{ForecastPayload, ForecastPoint, NormalizedRow, Table};
use crate::services::aggregate::{aggregate_store, round2, Aggregation};
use crate::services::schema::{
    find_date_col, find_store_col, find_total_col, normalize_rows, numeric,
};
use crate::services::model::SalesModel;
use crate::BoxError;

#[derive(Debug)]
pub enum Outcome {
    Ready(ForecastPayload),
    /// Nothing to forecast; distinct from "something broke".
    Empty,
}

/// Feature vector for the model, in required-feature order. Features the
/// row does not carry (or carries non-numerically) default to 0.0 so the
/// model never sees a gap.
fn feature_vector(row: &NormalizedRow, features: &[String]) -> Vec<f64> {
    features
        .iter()
        .map(|f| row.cells.get(f).and_then(numeric).unwrap_or(0.0))
        .collect()
}

pub fn build_forecast(
    store_id: u32,
    table: &Table,
    features: &[String],
    model: &dyn SalesModel,
) -> Result<Outcome, BoxError> {
    let store_col = match find_store_col(table) {
        Some(c) => c,
        None => {
            warn!(
                "No recognizable store column. Columns={:?}",
                &table.columns[..table.columns.len().min(20)]
            );
            return Ok(Outcome::Empty);
        }
    };
    let total_col = match find_total_col(table) {
        Some(c) => c,
        None => {
            warn!(
                "No recognizable total-sales column. Columns={:?}",
                &table.columns[..table.columns.len().min(20)]
            );
            return Ok(Outcome::Empty);
        }
    };
    let date_col = match find_date_col(table) {
        Some(c) => c,
        None => {
            warn!(
                "No recognizable date column. Columns={:?}",
                &table.columns[..table.columns.len().min(20)]
            );
            return Ok(Outcome::Empty);
        }
    };

    let mut rows = normalize_rows(table, store_col, date_col, total_col);
    rows.retain(|r| r.store == i64::from(store_id));

    let (history, last_period, latest_row) =
        match aggregate_store(store_id, rows, table, total_col) {
            Aggregation::Ready {
                history,
                last_period,
                latest_row,
            } => (history, last_period, latest_row),
            Aggregation::Insufficient => return Ok(Outcome::Empty),
        };

    let vector = feature_vector(&latest_row, features);
    let yhat = model.predict(&vector)?;

    let next = last_period.next();
    let forecast_point = ForecastPoint {
        date: next.first_day().format("%Y-%m-%d").to_string(),
        label: next.label(),
        predicted: round2(yhat),
        sales: round2(yhat),
        source: "forecast",
    };

    info!(
        "Forecast payload for store {} -> months={}, next={}",
        store_id,
        history.len(),
        forecast_point.date
    );

    Ok(Outcome::Ready(ForecastPayload {
        history,
        forecast: vec![forecast_point],
    }))
}

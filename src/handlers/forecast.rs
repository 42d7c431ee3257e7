// src/handlers/forecast.rs
use log::{error, info};
use serde::Serialize;
use std::sync::Arc;
use warp::Rejection;

use super::error::ApiError;
use crate::models::ForecastPayload;
use crate::services::data::AppState;
use crate::services::forecast::{build_forecast, Outcome};

/// Payloads carry no-store so dashboards never cache a stale month.
fn no_store_json<T: Serialize>(payload: &T) -> impl warp::Reply {
    warp::reply::with_header(warp::reply::json(payload), "Cache-Control", "no-store")
}

pub async fn get_forecast_for_store(
    store_id: u32,
    state: Arc<AppState>,
) -> Result<impl warp::Reply, Rejection> {
    info!("Handling forecast request for store {}", store_id);

    let (table, model) = match (&state.table, &state.model) {
        (Some(table), Some(model)) => (table, model),
        _ => {
            error!(
                "Dataset or model not loaded; cannot forecast store {}",
                store_id
            );
            return Err(warp::reject::custom(ApiError::new("Required data not loaded")));
        }
    };

    match build_forecast(store_id, table, &state.features, model.as_ref()) {
        Ok(Outcome::Ready(payload)) => Ok(no_store_json(&payload)),
        Ok(Outcome::Empty) => Ok(no_store_json(&ForecastPayload::empty())),
        Err(e) => {
            // internal detail stays in the log, not in the response
            error!("Forecast pipeline error for store {}: {}", store_id, e);
            Err(warp::reject::custom(ApiError::new(
                "Failed to generate forecast",
            )))
        }
    }
}

// src/routes.rs
use std::sync::Arc;
use warp::reject::Rejection;

use crate::handlers::error::ApiError;
use crate::handlers::{forecast::get_forecast_for_store, insight::category_insight};
use crate::services::data::AppState;
use log::info;

use std::convert::Infallible;
use warp::{Filter, Reply};

// Map our custom rejections (and anything unexpected) to an error body.
// Error responses are marked non-cacheable like everything else we serve.
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = warp::http::StatusCode::NOT_FOUND;
        message = "Not Found";
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status;
        message = &api_error.message;
    } else {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error";
    }

    Ok(warp::reply::with_header(
        warp::reply::with_status(
            warp::reply::json(&serde_json::json!({
                "error": message,
            })),
            code,
        ),
        "Cache-Control",
        "no-store",
    ))
}

pub fn routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let state_filter = warp::any().map(move || state.clone());

    let forecast_route = warp::path!("api" / "forecast" / u32)
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_forecast_for_store);

    let insight_route = warp::path!("api" / "insights" / "category")
        .and(warp::post())
        .and(warp::body::json())
        .and(state_filter.clone())
        .and_then(category_insight);

    info!("All routes configured successfully.");

    forecast_route.or(insight_route).recover(handle_rejection)
}

// src/handlers/insight.rs
use log::info;
use std::sync::Arc;
use warp::Rejection;

use crate::models::{InsightRequest, InsightResponse};
use crate::services::data::AppState;
use crate::services::insights::{build_prompt, complete, format_pairs};

pub async fn category_insight(
    body: InsightRequest,
    state: Arc<AppState>,
) -> Result<impl warp::Reply, Rejection> {
    let month = body.month.as_deref().unwrap_or("the selected month");
    info!(
        "Handling category insight request for {} ({} items)",
        month,
        body.items.len()
    );

    let pairs = format_pairs(&body.items);
    let prompt = build_prompt(month, &pairs);
    let text = complete(&state.insight, &prompt, &pairs).await;

    Ok(warp::reply::json(&InsightResponse { text }))
}

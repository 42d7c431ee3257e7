// src/services/model.rs
//
// Predictive-model boundary. The pipeline only ever calls
// `predict(feature_vector) -> number`; what sits behind that is the
// loader's business. A linear model deserialized from JSON is the
// default concrete implementation.

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::BoxError;

pub trait SalesModel: Send + Sync {
    fn predict(&self, features: &[f64]) -> Result<f64, BoxError>;
}

/// Linear model: prediction = intercept + weights . features.
/// The file also names its features, in vector order; that list is the
/// process-wide required-feature list.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    pub features: Vec<String>,
    pub intercept: f64,
    pub weights: Vec<f64>,
}

impl LinearModel {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading model file {}", path.display()))?;
        let model: LinearModel = serde_json::from_str(&raw)
            .with_context(|| format!("parsing model file {}", path.display()))?;
        ensure!(
            model.features.len() == model.weights.len(),
            "model file {}: {} features but {} weights",
            path.display(),
            model.features.len(),
            model.weights.len()
        );
        Ok(model)
    }
}

impl SalesModel for LinearModel {
    fn predict(&self, features: &[f64]) -> Result<f64, BoxError> {
        if features.len() != self.weights.len() {
            return Err(format!(
                "feature vector has {} values, model expects {}",
                features.len(),
                self.weights.len()
            )
            .into());
        }
        let dot: f64 = features
            .iter()
            .zip(&self.weights)
            .map(|(x, w)| x * w)
            .sum();
        let yhat = self.intercept + dot;
        if !yhat.is_finite() {
            return Err("model produced a non-finite prediction".into());
        }
        Ok(yhat)
    }
}

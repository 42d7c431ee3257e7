// src/services/data.rs
//
// Startup loading of the shared dataset and model, plus the request
// state handed to handlers. Both objects are optional at runtime: a
// server without them still answers, reporting the missing precondition.

use anyhow::{Context, Result};
use csv::Reader;
use log::{info, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::env;
use std::path::Path;

use crate::models::{Cell, Table};
use crate::services::insights::InsightConfig;
use crate::services::model::{LinearModel, SalesModel};

pub struct AppState {
    pub table: Option<Table>,
    pub model: Option<Box<dyn SalesModel>>,
    pub features: Vec<String>,
    pub insight: InsightConfig,
}

impl AppState {
    /// Build the state from `SALES_DATA_PATH` and `MODEL_PATH`. A missing
    /// or unreadable input leaves that slot empty; requests then get the
    /// precondition error instead of the process refusing to start.
    pub fn from_env() -> Self {
        let table = match env::var("SALES_DATA_PATH") {
            Ok(path) => match load_table(Path::new(&path)) {
                Ok(table) => {
                    info!(
                        "Loaded dataset from {}: {} columns, {} rows",
                        path,
                        table.columns.len(),
                        table.rows.len()
                    );
                    Some(table)
                }
                Err(e) => {
                    warn!("Failed to load dataset from {}: {:#}", path, e);
                    None
                }
            },
            Err(_) => {
                warn!("$SALES_DATA_PATH not set; forecast endpoint will report missing data");
                None
            }
        };

        let (model, features) = match env::var("MODEL_PATH") {
            Ok(path) => match LinearModel::from_file(Path::new(&path)) {
                Ok(model) => {
                    info!("Loaded model from {}: {} features", path, model.features.len());
                    let features = model.features.clone();
                    (Some(Box::new(model) as Box<dyn SalesModel>), features)
                }
                Err(e) => {
                    warn!("Failed to load model from {}: {:#}", path, e);
                    (None, Vec::new())
                }
            },
            Err(_) => {
                warn!("$MODEL_PATH not set; forecast endpoint will report missing model");
                (None, Vec::new())
            }
        };

        AppState {
            table,
            model,
            features,
            insight: InsightConfig::from_env(),
        }
    }
}

/// Cells keep their narrowest JSON type: integer, then float, then
/// string; empty cells become null.
fn parse_cell(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() {
            return Value::from(f);
        }
    }
    Value::from(trimmed)
}

pub fn load_table(path: &Path) -> Result<Table> {
    let mut rdr = Reader::from_path(path)
        .with_context(|| format!("opening dataset {}", path.display()))?;
    let columns: Vec<String> = rdr
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.context("reading CSV record")?;
        let row: HashMap<String, Cell> = columns
            .iter()
            .cloned()
            .zip(record.iter().map(parse_cell))
            .collect();
        rows.push(row);
    }

    Ok(Table { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_cell_narrows_types() {
        assert_eq!(parse_cell("12"), Value::from(12));
        assert_eq!(parse_cell(" 3.5 "), Value::from(3.5));
        assert_eq!(parse_cell("2020-01-01"), Value::from("2020-01-01"));
        assert_eq!(parse_cell(""), Value::Null);
        assert_eq!(parse_cell("  "), Value::Null);
    }

    #[test]
    fn load_table_reads_headers_and_rows() {
        let f = tempfile_with(
            "store_id,Date,Total_Sales\n5,2020-01-15,100.5\n7,2020-02-01,\n",
        );
        let table = load_table(f.path()).unwrap();
        assert_eq!(
            table.columns,
            vec!["store_id", "Date", "Total_Sales"]
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["store_id"], Value::from(5));
        assert_eq!(table.rows[0]["Total_Sales"], Value::from(100.5));
        assert_eq!(table.rows[1]["Total_Sales"], Value::Null);
    }

    fn tempfile_with(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }
}

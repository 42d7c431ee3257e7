// src/models.rs
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// A single table cell. Input data is heterogeneous, so cells stay as
/// loosely typed JSON values until a pipeline step coerces them.
pub type Cell = Value;

/// An in-memory tabular dataset: ordered column names plus one cell map
/// per row. Loaded once at startup and shared read-only across requests.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<HashMap<String, Cell>>,
}

impl Table {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}

/// A row that survived schema normalization: store id and date coerced,
/// total sales extracted, raw cells kept for category extraction and
/// for building the model's feature vector.
#[derive(Debug, Clone)]
pub struct NormalizedRow {
    pub store: i64,
    pub date: NaiveDate,
    pub total_sales: f64,
    pub cells: HashMap<String, Cell>,
}

/// A calendar month, the aggregation bucket. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn from_date(date: NaiveDate) -> Self {
        Period {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First day of the month, used as the canonical date of the bucket.
    pub fn first_day(&self) -> NaiveDate {
        // year/month come from a valid NaiveDate or from next(), so day 1 exists
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("period holds a valid year/month")
    }

    /// The calendar month immediately after this one.
    pub fn next(&self) -> Period {
        if self.month == 12 {
            Period {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Period {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Human label, e.g. "Jan 20".
    pub fn label(&self) -> String {
        self.first_day().format("%b %y").to_string()
    }
}

/// Category name -> summed amount for one store+month. Always freshly
/// allocated per period; BTreeMap keeps serialization order stable.
pub type CategoryMap = BTreeMap<String, f64>;

#[derive(Debug, Clone, Serialize)]
pub struct HistoryPoint {
    pub date: String,
    pub label: String,
    pub total_sales: f64,
    pub source: &'static str,
    pub categories: CategoryMap,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastPoint {
    pub date: String,
    pub label: String,
    pub predicted: f64,
    // Same value under a second key; older chart clients read `sales`.
    pub sales: f64,
    pub source: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ForecastPayload {
    pub history: Vec<HistoryPoint>,
    pub forecast: Vec<ForecastPoint>,
}

impl ForecastPayload {
    pub fn empty() -> Self {
        ForecastPayload {
            history: Vec::new(),
            forecast: Vec::new(),
        }
    }
}

/// One category entry in an insight request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightItem {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Deserialize)]
pub struct InsightRequest {
    pub month: Option<String>,
    #[serde(default)]
    pub items: Vec<InsightItem>,
}

#[derive(Debug, Serialize)]
pub struct InsightResponse {
    pub text: String,
}

use serde::{ser::SerializeMap, Serialize, Serializer};
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::fmt;
use crate::{Identifier, MIN_DISPLAY_COUNT};

/// A single nullable cell as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Numeric reading of the cell. Text is accepted when it parses as a finite number
    /// after trimming.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Null => None,
            Scalar::Int(v) => Some(*v as f64),
            Scalar::Float(v) if v.is_finite() => Some(*v),
            Scalar::Float(_) => None,
            Scalar::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    /// Serialized text of the cell, `None` for null.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Scalar::Null => None,
            Scalar::Int(v) => Some(v.to_string()),
            Scalar::Float(v) => Some(v.to_string()),
            Scalar::Text(s) => Some(s.clone()),
        }
    }

    /// Store-like ordering: nulls first, then numbers, then text (case-insensitive).
    pub fn compare(&self, other: &Scalar) -> Ordering {
        fn rank(value: &Scalar) -> u8 {
            match value {
                Scalar::Null => 0,
                Scalar::Int(_) | Scalar::Float(_) => 1,
                Scalar::Text(_) => 2,
            }
        }

        match (self, other) {
            (Scalar::Text(a), Scalar::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (a, b) if rank(a) == 1 && rank(b) == 1 => {
                let a = OrderedFloat(a.as_f64().unwrap_or(f64::NAN));
                let b = OrderedFloat(b.as_f64().unwrap_or(f64::NAN));
                a.cmp(&b)
            }
            (a, b) => rank(a).cmp(&rank(b)),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(text) => f.write_str(&text),
            None => f.write_str("NULL"),
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

/// Ordered column → value snapshot of one stored row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: Vec<(String, Scalar)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Scalar>,
    {
        Self {
            cells: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn push(&mut self, column: impl Into<String>, value: Scalar) {
        self.cells.push((column.into(), value));
    }

    pub fn get(&self, column: &str) -> Option<&Scalar> {
        self.cells.iter().find(|(name, _)| name == column).map(|(_, v)| v)
    }

    pub fn numeric(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Scalar::as_f64)
    }

    pub fn values(&self) -> impl Iterator<Item = &Scalar> {
        self.cells.iter().map(|(_, v)| v)
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableDescriptor {
    pub name: Identifier,
    pub columns: Vec<Identifier>,
}

impl TableDescriptor {
    pub fn column(&self, name: &str) -> Option<&Identifier> {
        self.columns.iter().find(|c| c.as_str() == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.to_string()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Anything other than a descending keyword is ascending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(dir) if dir.eq_ignore_ascii_case("desc") || dir.eq_ignore_ascii_case("descending") => {
                SortDirection::Descending
            }
            _ => SortDirection::Ascending,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub rows: Vec<Row>,
    pub total_matching: u64,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStatistic {
    pub column: String,
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation (divisor `n`).
    pub stddev: f64,
}

impl ColumnStatistic {
    pub fn is_displayable(&self) -> bool {
        self.count > MIN_DISPLAY_COUNT
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CentroidValue {
    pub feature: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Cluster {
    pub id: usize,
    pub size: usize,
    pub centroid: Vec<CentroidValue>,
    pub sse: f64,
    pub share_percent: f64,
    pub samples: Vec<Row>,
}

impl Cluster {
    pub fn centroid_of(&self, feature: &str) -> Option<f64> {
        self.centroid.iter().find(|c| c.feature == feature).map(|c| c.value)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClusteringResult {
    pub table: String,
    pub k: usize,
    pub clusters: Vec<Cluster>,
    pub sse_total: f64,
    pub features_used: Vec<String>,
    pub data_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_sse_per_point: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElbowPoint {
    pub k: usize,
    pub sse_total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduction: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduction_percent: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ElbowReport {
    pub table: String,
    pub features_used: Vec<String>,
    pub data_count: usize,
    pub points: Vec<ElbowPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub name: String,
    pub display_name: String,
    pub row_count: u64,
}

use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::clustering::ClusterForm;
use crate::explorer::ExplorerRequest;
use crate::{ClusteringResult, DatasetSummary, ElbowReport, SortDirection};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    pub store_connected: bool,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

/// Integer query parameter that falls back to a default instead of rejecting the request.
pub fn lenient_int(name: &str, raw: Option<&str>) -> Option<i64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) => {
            debug!("Ignoring unparseable {} parameter {:?}", name, raw);
            None
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExplorerParams {
    pub table: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub page: Option<String>,
    pub export: Option<String>,
    pub format: Option<String>,
}

impl ExplorerParams {
    pub fn to_request(&self) -> ExplorerRequest {
        ExplorerRequest {
            table: self.table.clone().unwrap_or_default(),
            search: self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()).map(String::from),
            sort: self.sort.clone(),
            direction: SortDirection::parse(self.dir.as_deref()),
            page: lenient_int("page", self.page.as_deref()).unwrap_or(0),
        }
    }

    pub fn wants_csv(&self) -> bool {
        self.export.as_deref().is_some_and(|e| e.eq_ignore_ascii_case("csv"))
    }

    pub fn wants_html(&self) -> bool {
        self.format.as_deref().is_some_and(|f| f.eq_ignore_ascii_case("html"))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SampleParams {
    pub table: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClusterParams {
    pub table: Option<String>,
    pub k: Option<String>,
    pub action: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterAction {
    Form,
    Run,
    Elbow,
}

impl ClusterAction {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|a| a.trim().to_ascii_lowercase()).as_deref() {
            Some("run") => ClusterAction::Run,
            Some("elbow") => ClusterAction::Elbow,
            _ => ClusterAction::Form,
        }
    }
}

#[derive(Serialize)]
pub struct DatasetsResponse {
    pub datasets: Vec<DatasetSummary>,
}

#[derive(Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ClusterResponse {
    Form(ClusterForm),
    Run(ClusteringResult),
    Elbow(ElbowReport),
}

pub mod schema;
pub mod stats;
pub mod pagination;
pub mod export;
pub mod render;

pub use schema::*;
pub use stats::{compute_statistics, displayable, summarize, OnlineStats};
pub use pagination::*;
pub use export::*;
pub use render::*;

use serde::Serialize;
use tracing::{info, warn};
use crate::config::AnalyticsConfig;
use crate::{
    AnalyticsStore, ColumnStatistic, DatasetSummary, ExplorerQuery, Identifier, QueryResult,
    Result, Row, SortDirection, TableDescriptor, DEFAULT_SAMPLE_LIMIT, MAX_SAMPLE_LIMIT,
};

/// Parameters of one explorer page request, after HTTP/CLI decoding.
#[derive(Debug, Clone, Default)]
pub struct ExplorerRequest {
    pub table: String,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub direction: SortDirection,
    pub page: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplorerPage {
    pub table: String,
    pub display_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub total_matching: u64,
    pub page: u64,
    pub limit: u64,
    pub pagination: Pagination,
    pub statistics: Vec<ColumnStatistic>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableSample {
    pub table: String,
    pub total_rows: u64,
    pub limit: u64,
    pub rows: Vec<Row>,
}

/// Runs the data and count queries for one page of a described table.
pub async fn query_page(
    store: &dyn AnalyticsStore,
    descriptor: &TableDescriptor,
    request: &ExplorerRequest,
    limit: u64,
) -> Result<QueryResult> {
    let query = ExplorerQuery::build(
        descriptor,
        request.search.as_deref(),
        request.sort.as_deref(),
        request.direction,
        request.page,
        limit,
    );

    let rows = store.fetch_page(&query).await?;
    let total_matching = store.count_matching(&query).await?;

    Ok(QueryResult {
        rows,
        total_matching,
        page: query.page,
        limit: query.limit,
    })
}

/// Full explorer page: rows, pagination and the displayable column statistics.
pub async fn explore(
    store: &dyn AnalyticsStore,
    config: &AnalyticsConfig,
    request: &ExplorerRequest,
) -> Result<ExplorerPage> {
    let descriptor = describe_table(store, config, &request.table).await?;
    let result = query_page(store, &descriptor, request, config.page_limit).await?;

    let numeric = numeric_columns(store, &descriptor).await?;
    let statistics = displayable(compute_statistics(store, &descriptor.name, &numeric).await);

    info!(
        "Explorer page {} of {}: {} rows of {} matching, {} statistics",
        result.page,
        descriptor.name,
        result.rows.len(),
        result.total_matching,
        statistics.len()
    );

    Ok(ExplorerPage {
        table: descriptor.name.to_string(),
        display_name: display_name(descriptor.name.as_str()),
        columns: descriptor.column_names(),
        pagination: paginate(result.total_matching, result.limit, result.page),
        rows: result.rows,
        total_matching: result.total_matching,
        page: result.page,
        limit: result.limit,
        statistics,
    })
}

/// The current page only, as CSV bytes with its suggested filename.
pub async fn export_page(
    store: &dyn AnalyticsStore,
    config: &AnalyticsConfig,
    request: &ExplorerRequest,
) -> Result<(String, Vec<u8>)> {
    let descriptor = describe_table(store, config, &request.table).await?;
    let result = query_page(store, &descriptor, request, config.page_limit).await?;
    let bytes = export_csv(&descriptor.column_names(), &result.rows)?;

    info!("Exported {} rows from {}", result.rows.len(), descriptor.name);
    Ok((export_filename(descriptor.name.as_str()), bytes))
}

/// Tables in the dataset namespace with their row counts, alphabetically.
pub async fn list_datasets(
    store: &dyn AnalyticsStore,
    config: &AnalyticsConfig,
) -> Result<Vec<DatasetSummary>> {
    let mut tables: Vec<String> = store
        .list_tables()
        .await?
        .into_iter()
        .filter(|t| config.in_namespace(t))
        .collect();
    tables.sort();

    let mut datasets = Vec::with_capacity(tables.len());
    for name in tables {
        let row_count = match Identifier::parse(&name) {
            Ok(ident) => store.count_rows(&ident).await.unwrap_or_else(|e| {
                warn!("Failed to count rows of {}: {}", name, e);
                0
            }),
            Err(_) => {
                warn!("Skipping row count for table with unusual name {}", name);
                0
            }
        };
        datasets.push(DatasetSummary {
            display_name: display_name(&name),
            name,
            row_count,
        });
    }

    Ok(datasets)
}

/// First rows of a table, for previews.
pub async fn sample_table(
    store: &dyn AnalyticsStore,
    config: &AnalyticsConfig,
    table: &str,
    limit: Option<i64>,
) -> Result<TableSample> {
    let limit = limit
        .map(|l| l.clamp(1, MAX_SAMPLE_LIMIT as i64) as u64)
        .unwrap_or(DEFAULT_SAMPLE_LIMIT);

    let descriptor = describe_table(store, config, table).await?;
    let request = ExplorerRequest {
        table: table.to_string(),
        ..Default::default()
    };
    let result = query_page(store, &descriptor, &request, limit).await?;
    let total_rows = store.count_rows(&descriptor.name).await?;

    Ok(TableSample {
        table: descriptor.name.to_string(),
        total_rows,
        limit,
        rows: result.rows,
    })
}

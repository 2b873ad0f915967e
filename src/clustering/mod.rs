pub mod quantile;
pub mod elbow;

pub use quantile::{clamp_k, partition, quantile_bounds};
pub use elbow::{elbow_points, is_non_increasing, sse_curve};

use serde::Serialize;
use tracing::{info, warn};
use crate::config::AnalyticsConfig;
use crate::explorer::{describe_table, numeric_columns};
use crate::{
    AnalyticsStore, ClusteringResult, ElbowReport, Error, Identifier, Result, Row, SampleQuery,
    TableDescriptor, CLUSTER_SAMPLE_CAP, DEFAULT_CLUSTERS, MAX_CLUSTER_FEATURES,
};

/// What the clustering form offers before anything is run.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterForm {
    pub tables: Vec<String>,
    pub selected_table: String,
    pub k: usize,
}

/// Rows and features a clustering run works from.
#[derive(Debug, Clone)]
pub struct FeatureSample {
    pub descriptor: TableDescriptor,
    pub features: Vec<String>,
    pub rows: Vec<Row>,
}

/// Allow-listed tables that currently exist, with the resolved selection.
pub async fn cluster_form(
    store: &dyn AnalyticsStore,
    config: &AnalyticsConfig,
    table: Option<&str>,
    k: Option<i64>,
) -> Result<ClusterForm> {
    let mut tables = Vec::new();
    for name in &config.cluster_tables {
        let Ok(ident) = Identifier::parse(name) else {
            warn!("Ignoring malformed clustering table {}", name);
            continue;
        };
        if store.table_exists(&ident).await? {
            tables.push(name.clone());
        }
    }

    Ok(ClusterForm {
        tables,
        selected_table: resolve_table(config, table).to_string(),
        k: k.map(clamp_k).unwrap_or(DEFAULT_CLUSTERS),
    })
}

/// Applies the allow-list, falling back to the default table.
pub fn resolve_table<'a>(config: &'a AnalyticsConfig, requested: Option<&str>) -> &'a str {
    let resolved = config.cluster_table(requested);
    if let Some(requested) = requested {
        if requested != resolved {
            warn!(
                "Table {} is not available for clustering; using {}",
                requested, resolved
            );
        }
    }
    resolved
}

/// Picks up to three numeric features and fetches the ordered sample.
pub async fn load_features(
    store: &dyn AnalyticsStore,
    config: &AnalyticsConfig,
    table: Option<&str>,
) -> Result<FeatureSample> {
    let descriptor = describe_table(store, config, resolve_table(config, table)).await?;

    let features: Vec<Identifier> = numeric_columns(store, &descriptor)
        .await?
        .into_iter()
        .take(MAX_CLUSTER_FEATURES)
        .collect();
    if features.is_empty() {
        return Err(Error::NoNumericFeatures(descriptor.name.to_string()));
    }

    let query = SampleQuery {
        table: descriptor.name.clone(),
        columns: descriptor.columns.clone(),
        features: features.clone(),
        cap: CLUSTER_SAMPLE_CAP,
    };
    let rows = store.fetch_sample(&query).await?;

    info!(
        "Loaded {} rows of {} with features {:?}",
        rows.len(),
        descriptor.name,
        features
    );

    Ok(FeatureSample {
        features: features.iter().map(|f| f.to_string()).collect(),
        descriptor,
        rows,
    })
}

/// Quantile clustering of one table into `k` bins, `k` clamped to the supported range.
pub async fn run_clustering(
    store: &dyn AnalyticsStore,
    config: &AnalyticsConfig,
    table: Option<&str>,
    k: i64,
) -> Result<ClusteringResult> {
    let k = clamp_k(k);
    let sample = load_features(store, config, table).await?;
    let result = partition(sample.descriptor.name.as_str(), &sample.rows, &sample.features, k);

    info!(
        "Clustered {} rows of {} into {} bins, SSE {:.4}",
        result.data_count,
        result.table,
        result.clusters.len(),
        result.sse_total
    );
    Ok(result)
}

/// SSE for each k in the elbow range over a single fetched sample.
pub async fn run_elbow(
    store: &dyn AnalyticsStore,
    config: &AnalyticsConfig,
    table: Option<&str>,
) -> Result<ElbowReport> {
    let sample = load_features(store, config, table).await?;
    let table = sample.descriptor.name.to_string();
    let curve = sse_curve(&table, &sample.rows, &sample.features);
    let points = elbow_points(&curve);

    if !is_non_increasing(&points) {
        warn!("SSE rises with k on {}; the primary feature is heavily tied", table);
    }

    let data_count = quantile::rank_rows(&sample.rows, &sample.features[0]).len();
    Ok(ElbowReport {
        table,
        features_used: sample.features,
        data_count,
        points,
    })
}

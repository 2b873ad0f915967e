use ordered_float::OrderedFloat;
use std::ops::Range;
use crate::explorer::OnlineStats;
use crate::{
    CentroidValue, Cluster, ClusteringResult, Row, CLUSTER_SAMPLE_ROWS, MAX_CLUSTERS, MIN_CLUSTERS,
};

/// Clamps a requested cluster count into the supported range.
pub fn clamp_k(k: i64) -> usize {
    k.clamp(MIN_CLUSTERS as i64, MAX_CLUSTERS as i64) as usize
}

/// Rank ranges of `k` contiguous buckets over `n` ordered rows. Boundaries fall at
/// `i * n / k`, so sizes differ by at most one. Buckets may be empty when `n < k`.
pub fn quantile_bounds(n: usize, k: usize) -> Vec<Range<usize>> {
    let k = k.max(1);
    (0..k).map(|i| (i * n / k)..((i + 1) * n / k)).collect()
}

/// Rows carrying a numeric primary feature, stably ordered by it.
pub fn rank_rows<'a>(rows: &'a [Row], primary: &str) -> Vec<&'a Row> {
    let mut ranked: Vec<&Row> = rows.iter().filter(|row| row.numeric(primary).is_some()).collect();
    ranked.sort_by_key(|row| OrderedFloat(row.numeric(primary).unwrap_or(0.0)));
    ranked
}

/// Splits rows into `k` ordered quantile bins on the first feature and scores each bin.
///
/// This is not Lloyd's k-means: membership is fixed by rank on the primary feature, and the
/// remaining features only contribute to centroids and SSE. Missing secondary values are
/// skipped for that feature alone. Empty bins are dropped but keep their ids.
pub fn partition(table: &str, rows: &[Row], features: &[String], k: usize) -> ClusteringResult {
    let ranked = match features.first() {
        Some(primary) => rank_rows(rows, primary),
        None => Vec::new(),
    };
    let data_count = ranked.len();

    let mut clusters = Vec::new();
    for (index, bounds) in quantile_bounds(data_count, k).into_iter().enumerate() {
        if bounds.is_empty() {
            continue;
        }
        let members = &ranked[bounds];
        clusters.push(score_bucket(index + 1, members, features, data_count));
    }

    let sse_total: f64 = clusters.iter().map(|c| c.sse).sum();

    ClusteringResult {
        table: table.to_string(),
        k: k.max(1),
        clusters,
        sse_total,
        features_used: features.to_vec(),
        data_count,
        avg_sse_per_point: (data_count > 0).then(|| sse_total / data_count as f64),
    }
}

fn score_bucket(id: usize, members: &[&Row], features: &[String], data_count: usize) -> Cluster {
    let mut centroid = Vec::with_capacity(features.len());
    let mut sse = 0.0;

    for feature in features {
        let values: Vec<f64> = members.iter().filter_map(|row| row.numeric(feature)).collect();
        if values.is_empty() {
            continue;
        }
        let stats = OnlineStats::create(&values);
        centroid.push(CentroidValue {
            feature: feature.clone(),
            value: stats.mean(),
        });
        sse += stats.sum_squared_deviations();
    }

    Cluster {
        id,
        size: members.len(),
        centroid,
        sse,
        share_percent: members.len() as f64 / data_count as f64 * 100.0,
        samples: members
            .iter()
            .take(CLUSTER_SAMPLE_ROWS)
            .map(|row| (*row).clone())
            .collect(),
    }
}

use crate::clustering::quantile::partition;
use crate::{ElbowPoint, Row, ELBOW_K_END, ELBOW_K_START};

/// SSE for every k in the elbow range, all computed over the same rows.
pub fn sse_curve(table: &str, rows: &[Row], features: &[String]) -> Vec<(usize, f64)> {
    (ELBOW_K_START..=ELBOW_K_END)
        .map(|k| (k, partition(table, rows, features, k).sse_total))
        .collect()
}

/// Attaches the drop from the previous k to each point. The first point has no
/// predecessor; a percentage needs a non-zero previous SSE.
pub fn elbow_points(curve: &[(usize, f64)]) -> Vec<ElbowPoint> {
    let mut points = Vec::with_capacity(curve.len());
    let mut previous: Option<f64> = None;

    for &(k, sse_total) in curve {
        let reduction = previous.map(|prev| prev - sse_total);
        let reduction_percent = previous
            .filter(|prev| *prev != 0.0)
            .map(|prev| (prev - sse_total) / prev * 100.0);

        points.push(ElbowPoint {
            k,
            sse_total,
            reduction,
            reduction_percent,
        });
        previous = Some(sse_total);
    }

    points
}

/// Whether SSE never rises as k grows. Holds for smoothly distributed features; rank bins
/// for k and k+1 are not nested, so heavily tied data can break it.
pub fn is_non_increasing(points: &[ElbowPoint]) -> bool {
    points
        .windows(2)
        .all(|pair| pair[1].sse_total <= pair[0].sse_total + 1e-9 * pair[0].sse_total.abs().max(1.0))
}

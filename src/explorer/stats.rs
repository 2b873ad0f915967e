use tracing::{debug, warn};
use crate::{AnalyticsStore, ColumnStatistic, Identifier};

/// count/min/max/mean/M2 over one group of observations.
#[derive(Debug, Clone)]
pub struct OnlineStats {
    n: u64,
    mean: f64,
    m2: f64, // Second central moment
    min: f64,
    max: f64,
}

impl OnlineStats {
    fn new() -> Self {
        Self {
            n: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Exact moments over a complete set of values.
    pub fn create(values: &[f64]) -> Self {
        let mut stats = Self::new();
        let n = values.len() as u64;
        if n == 0 {
            return stats;
        }

        let mean: f64 = values.iter().sum::<f64>() / n as f64;
        let mut m2 = 0.0;
        for &x in values {
            let delta = x - mean;
            m2 += delta * delta;
            stats.min = stats.min.min(x);
            stats.max = stats.max.max(x);
        }

        stats.n = n;
        stats.mean = mean;
        stats.m2 = m2;
        stats
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Σ (x − mean)², the within-group squared error.
    pub fn sum_squared_deviations(&self) -> f64 {
        self.m2
    }

    /// Population variance (divisor `n`), matching the store's `STDDEV_POP`.
    pub fn population_variance(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            (self.m2 / self.n as f64).max(0.0)
        }
    }

    pub fn to_statistic(&self, column: &str) -> Option<ColumnStatistic> {
        if self.n == 0 {
            return None;
        }
        Some(ColumnStatistic {
            column: column.to_string(),
            count: self.n,
            min: self.min,
            max: self.max,
            mean: self.mean,
            stddev: self.population_variance().sqrt(),
        })
    }
}

/// Statistic over already-extracted non-null values; `None` when there are none.
pub fn summarize(column: &str, values: &[f64]) -> Option<ColumnStatistic> {
    OnlineStats::create(values).to_statistic(column)
}

/// One statistic per column that has observations. Columns are aggregated independently;
/// a column whose aggregate fails is left out.
pub async fn compute_statistics(
    store: &dyn AnalyticsStore,
    table: &Identifier,
    numeric_columns: &[Identifier],
) -> Vec<ColumnStatistic> {
    let mut statistics = Vec::with_capacity(numeric_columns.len());

    for column in numeric_columns {
        match store.column_statistic(table, column).await {
            Ok(Some(stat)) => statistics.push(stat),
            Ok(None) => debug!("Column {}.{} has no observations", table, column),
            Err(e) => warn!("Skipping statistics for {}.{}: {}", table, column, e),
        }
    }

    statistics
}

/// Statistics with enough observations to be worth showing.
pub fn displayable(statistics: Vec<ColumnStatistic>) -> Vec<ColumnStatistic> {
    statistics.into_iter().filter(ColumnStatistic::is_displayable).collect()
}

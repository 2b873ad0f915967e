pub mod mysql;
pub mod memory;

pub use mysql::MySqlStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use crate::{ColumnStatistic, ExplorerQuery, Identifier, Result, Row, SampleQuery};

#[async_trait]
pub trait DatabaseConnection: Send + Sync {
    async fn connect(&self) -> Result<()>;
    async fn disconnect(&self) -> Result<()>;
    async fn is_connected(&self) -> bool;
}

/// Read-only access to the relational store backing the explorer and clustering pages.
///
/// Every identifier reaching an implementation has already been validated or read back from
/// the catalog; implementations must bind all values as parameters.
#[async_trait]
pub trait AnalyticsStore: DatabaseConnection {
    /// All table names in the store's schema, unfiltered.
    async fn list_tables(&self) -> Result<Vec<String>>;

    async fn table_exists(&self, table: &Identifier) -> Result<bool>;

    /// Column names in catalog order.
    async fn list_columns(&self, table: &Identifier) -> Result<Vec<String>>;

    async fn count_rows(&self, table: &Identifier) -> Result<u64>;

    /// `Ok(false)` when the column does not aggregate as numeric. `Err` is reserved for the
    /// store itself failing.
    async fn probe_numeric(&self, table: &Identifier, column: &Identifier) -> Result<bool>;

    /// `None` when the column has no non-null observations.
    async fn column_statistic(
        &self,
        table: &Identifier,
        column: &Identifier,
    ) -> Result<Option<ColumnStatistic>>;

    async fn fetch_page(&self, query: &ExplorerQuery) -> Result<Vec<Row>>;

    async fn count_matching(&self, query: &ExplorerQuery) -> Result<u64>;

    async fn fetch_sample(&self, query: &SampleQuery) -> Result<Vec<Row>>;
}

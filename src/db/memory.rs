use async_trait::async_trait;
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;
use tracing::debug;
use crate::explorer::stats::summarize;
use crate::{
    AnalyticsStore, ColumnStatistic, DatabaseConnection, Error, ExplorerQuery, Identifier, Result,
    Row, SampleQuery, Scalar, SortDirection, NUMERIC_REGEX,
};

#[derive(Debug, Clone, Default)]
struct MemoryTable {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl MemoryTable {
    fn project(&self, row: &Row, columns: &[Identifier]) -> Row {
        let mut out = Row::new();
        for column in columns {
            out.push(
                column.as_str(),
                row.get(column.as_str()).cloned().unwrap_or(Scalar::Null),
            );
        }
        out
    }
}

/// In-process store holding fixed tables. Mirrors the MySQL store's filtering, ordering,
/// probing and aggregation rules so the engine behaves identically on either. A column is
/// numeric when every non-null cell's text matches [`NUMERIC_PATTERN`](crate::NUMERIC_PATTERN),
/// the same pattern the MySQL probe binds.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, MemoryTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table. Cells missing from a row read as null.
    pub fn with_table<S: Into<String>>(mut self, name: &str, columns: Vec<S>, rows: Vec<Row>) -> Self {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let rows = rows
            .into_iter()
            .map(|row| {
                let mut normalized = Row::new();
                for column in &columns {
                    normalized.push(column.as_str(), row.get(column).cloned().unwrap_or(Scalar::Null));
                }
                normalized
            })
            .collect();
        self.tables.insert(name.to_string(), MemoryTable { columns, rows });
        self
    }

    fn table(&self, table: &Identifier) -> Result<&MemoryTable> {
        self.tables
            .get(table.as_str())
            .ok_or_else(|| Error::QueryFailed(format!("Table '{}' doesn't exist", table)))
    }

    fn numeric_values(&self, table: &Identifier, column: &Identifier) -> Result<Vec<f64>> {
        Ok(self
            .table(table)?
            .rows
            .iter()
            .filter_map(|row| row.numeric(column.as_str()))
            .collect())
    }
}

#[async_trait]
impl DatabaseConnection for MemoryStore {
    async fn connect(&self) -> Result<()> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        true
    }
}

#[async_trait]
impl AnalyticsStore for MemoryStore {
    async fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.tables.keys().cloned().collect())
    }

    async fn table_exists(&self, table: &Identifier) -> Result<bool> {
        Ok(self.tables.contains_key(table.as_str()))
    }

    async fn list_columns(&self, table: &Identifier) -> Result<Vec<String>> {
        Ok(self
            .tables
            .get(table.as_str())
            .map(|t| t.columns.clone())
            .unwrap_or_default())
    }

    async fn count_rows(&self, table: &Identifier) -> Result<u64> {
        Ok(self.table(table)?.rows.len() as u64)
    }

    async fn probe_numeric(&self, table: &Identifier, column: &Identifier) -> Result<bool> {
        let table = self.table(table)?;
        if !table.columns.iter().any(|c| c == column.as_str()) {
            return Ok(false);
        }

        let mut present = 0usize;
        for value in table.rows.iter().filter_map(|row| row.get(column.as_str())) {
            if value.is_null() {
                continue;
            }
            let numeric = value.to_text().is_some_and(|text| NUMERIC_REGEX.is_match(&text));
            if !numeric {
                debug!("Column {} holds non-numeric value {:?}", column, value);
                return Ok(false);
            }
            present += 1;
        }
        Ok(present > 0)
    }

    async fn column_statistic(
        &self,
        table: &Identifier,
        column: &Identifier,
    ) -> Result<Option<ColumnStatistic>> {
        let values = self.numeric_values(table, column)?;
        Ok(summarize(column.as_str(), &values))
    }

    async fn fetch_page(&self, query: &ExplorerQuery) -> Result<Vec<Row>> {
        let table = self.table(&query.table)?;
        let mut matching: Vec<&Row> = table.rows.iter().filter(|row| query.matches(row)).collect();

        let sort_column = query
            .sort
            .as_ref()
            .or_else(|| query.columns.first())
            .map(|c| c.as_str().to_string());

        if let Some(column) = sort_column {
            let null = Scalar::Null;
            matching.sort_by(|a, b| {
                let left = a.get(&column).unwrap_or(&null);
                let right = b.get(&column).unwrap_or(&null);
                match query.direction {
                    SortDirection::Ascending => left.compare(right),
                    SortDirection::Descending => right.compare(left),
                }
            });
        }

        Ok(matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .map(|row| table.project(row, &query.columns))
            .collect())
    }

    async fn count_matching(&self, query: &ExplorerQuery) -> Result<u64> {
        let table = self.table(&query.table)?;
        Ok(table.rows.iter().filter(|row| query.matches(row)).count() as u64)
    }

    async fn fetch_sample(&self, query: &SampleQuery) -> Result<Vec<Row>> {
        let table = self.table(&query.table)?;
        let Some(primary) = query.primary() else {
            return Ok(table.rows.iter().take(query.cap as usize).cloned().collect());
        };

        let mut rows: Vec<&Row> = table
            .rows
            .iter()
            .filter(|row| row.get(primary.as_str()).map_or(false, |v| !v.is_null()))
            .collect();
        rows.sort_by_key(|row| OrderedFloat(row.numeric(primary.as_str()).unwrap_or(0.0)));

        let columns: Vec<Identifier> = if query.columns.is_empty() {
            table.columns.iter().map(|c| Identifier::from_catalog(c.as_str())).collect()
        } else {
            query.columns.clone()
        };

        Ok(rows
            .into_iter()
            .take(query.cap as usize)
            .map(|row| table.project(row, &columns))
            .collect())
    }
}

use crate::config::StoreConfig;
use crate::query::{probe_statement, row_count_statement, statistic_statement};
use crate::{
    AnalyticsStore, ColumnStatistic, DatabaseConnection, Error, ExplorerQuery, Identifier, Result,
    Row, SampleQuery, Scalar, Statement,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::TryStreamExt;
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Params, Pool, PoolConstraints, PoolOpts, Value};
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

pub struct MySqlStore {
    pool: Mutex<Option<Pool>>,
    config: StoreConfig,
    reconnect_attempts: u32,
    reconnect_delay: Duration,
    deadline: Duration,
}

impl MySqlStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            pool: Mutex::new(None),
            reconnect_attempts: 3,
            reconnect_delay: config.retry_delay(),
            deadline: config.query_deadline(),
            config,
        }
    }

    fn create_pool(&self) -> Result<Pool> {
        info!(
            "Creating connection pool for {}:{} (database {})",
            self.config.host, self.config.port, self.config.database
        );

        let constraints = PoolConstraints::new(0, self.config.pool_max.max(1))
            .ok_or_else(|| Error::Config("Invalid pool constraints".to_string()))?;
        let pool_opts = PoolOpts::default().with_constraints(constraints);

        let opts = mysql_async::OptsBuilder::default()
            .ip_or_hostname(self.config.host.clone())
            .tcp_port(self.config.port)
            .user(Some(self.config.user.clone()))
            .pass(Some(self.config.password.clone()))
            .db_name(Some(self.config.database.clone()))
            .pool_opts(pool_opts);

        Ok(Pool::new(opts))
    }

    async fn get_or_create_pool(&self) -> Result<Pool> {
        let mut guard = self.pool.lock().await;
        if let Some(pool) = guard.as_ref() {
            return Ok(pool.clone());
        }
        let pool = self.create_pool()?;
        *guard = Some(pool.clone());
        Ok(pool)
    }

    /// Checks a connection out of the pool, retrying transient failures.
    async fn conn(&self) -> Result<Conn> {
        let pool = self.get_or_create_pool().await?;
        let mut attempts = 0;

        loop {
            attempts += 1;
            match self.with_deadline("connection checkout", pool.get_conn()).await {
                Ok(conn) => return Ok(conn),
                Err(e) if attempts < self.reconnect_attempts => {
                    warn!(
                        "Attempt {} to get a connection failed: {}. Retrying in {} seconds...",
                        attempts,
                        e,
                        self.reconnect_delay.as_secs()
                    );
                    tokio::time::sleep(self.reconnect_delay).await;
                }
                Err(e) => {
                    error!(
                        "Failed to get a connection after {} attempts: {}",
                        self.reconnect_attempts, e
                    );
                    return Err(e);
                }
            }
        }
    }

    /// Applies the per-call deadline to a store operation.
    async fn with_deadline<T, F>(&self, what: &str, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, mysql_async::Error>>,
    {
        match tokio::time::timeout(self.deadline, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!("Store call '{}' failed: {}", what, e);
                Err(e.into())
            }
            Err(_) => {
                error!("Store call '{}' timed out after {:?}", what, self.deadline);
                Err(Error::QueryFailed(format!(
                    "{} timed out after {:?}",
                    what, self.deadline
                )))
            }
        }
    }

    async fn fetch_rows(&self, what: &str, stmt: Statement) -> Result<Vec<Row>> {
        debug!("Executing {}: {} ({} params)", what, stmt.sql, stmt.params.len());
        let start_time = std::time::Instant::now();
        let mut conn = self.conn().await?;

        let rows = self
            .with_deadline(what, async {
                conn.exec_stream::<mysql_async::Row, _, _>(stmt.sql.as_str(), params_of(&stmt))
                    .await?
                    .map_ok(row_from_mysql)
                    .try_collect::<Vec<Row>>()
                    .await
            })
            .await?;

        debug!("{} returned {} rows in {:?}", what, rows.len(), start_time.elapsed());
        Ok(rows)
    }

    async fn fetch_values(&self, what: &str, stmt: Statement) -> Result<Option<Vec<Scalar>>> {
        debug!("Executing {}: {}", what, stmt.sql);
        let mut conn = self.conn().await?;
        let row: Option<mysql_async::Row> = self
            .with_deadline(what, conn.exec_first(stmt.sql.as_str(), params_of(&stmt)))
            .await?;
        Ok(row.map(|row| row_from_mysql(row).values().cloned().collect()))
    }

    async fn fetch_u64(&self, what: &str, stmt: Statement) -> Result<u64> {
        let values = self.fetch_values(what, stmt).await?;
        Ok(values
            .and_then(|v| v.first().and_then(Scalar::as_f64))
            .map(|v| v.max(0.0) as u64)
            .unwrap_or(0))
    }
}

fn params_of(stmt: &Statement) -> Params {
    if stmt.params.is_empty() {
        Params::Empty
    } else {
        Params::Positional(stmt.params.clone())
    }
}

pub(crate) fn row_from_mysql(row: mysql_async::Row) -> Row {
    let mut out = Row::new();
    for (i, column) in row.columns_ref().iter().enumerate() {
        let value = row.as_ref(i).cloned().unwrap_or(Value::NULL);
        out.push(column.name_str().into_owned(), scalar_from_value(value));
    }
    out
}

pub(crate) fn scalar_from_value(value: Value) -> Scalar {
    match value {
        Value::NULL => Scalar::Null,
        Value::Int(v) => Scalar::Int(v),
        Value::UInt(v) => i64::try_from(v)
            .map(Scalar::Int)
            .unwrap_or_else(|_| Scalar::Text(v.to_string())),
        Value::Float(v) => Scalar::Float(v as f64),
        Value::Double(v) => Scalar::Float(v),
        Value::Bytes(bytes) => Scalar::Text(String::from_utf8_lossy(&bytes).into_owned()),
        Value::Date(year, month, day, hour, minute, second, micros) => {
            Scalar::Text(format_date(year, month, day, hour, minute, second, micros))
        }
        Value::Time(negative, days, hours, minutes, seconds, micros) => {
            let total_hours = days as u64 * 24 + hours as u64;
            let sign = if negative { "-" } else { "" };
            let mut text = format!("{}{:02}:{:02}:{:02}", sign, total_hours, minutes, seconds);
            if micros > 0 {
                text.push_str(&format!(".{:06}", micros));
            }
            Scalar::Text(text)
        }
    }
}

fn format_date(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8, micros: u32) -> String {
    let datetime = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
        .and_then(|date| date.and_hms_micro_opt(hour as u32, minute as u32, second as u32, micros));

    match datetime {
        Some(dt) if hour == 0 && minute == 0 && second == 0 && micros == 0 => {
            dt.format("%Y-%m-%d").to_string()
        }
        Some(dt) if micros == 0 => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
        // Zero dates are legal in MySQL but not in chrono.
        None => format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            year, month, day, hour, minute, second
        ),
    }
}

#[async_trait]
impl DatabaseConnection for MySqlStore {
    async fn connect(&self) -> Result<()> {
        for attempt in 0..self.reconnect_attempts {
            let pool = self.get_or_create_pool().await?;
            match self.with_deadline("connect", pool.get_conn()).await {
                Ok(_) => {
                    info!("Successfully established test connection to database");
                    return Ok(());
                }
                Err(e) => {
                    if attempt == self.reconnect_attempts - 1 {
                        return Err(Error::QueryFailed(format!(
                            "Failed to connect after maximum attempts: {}",
                            e
                        )));
                    }
                    warn!("Connection attempt {} failed: {}", attempt + 1, e);
                    tokio::time::sleep(self.reconnect_delay).await;
                }
            }
        }

        Err(Error::QueryFailed("Failed to connect after maximum attempts".to_string()))
    }

    async fn disconnect(&self) -> Result<()> {
        if let Some(pool) = self.pool.lock().await.take() {
            pool.disconnect().await?;
        }
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        let pool = match self.pool.lock().await.as_ref() {
            Some(pool) => pool.clone(),
            None => return false,
        };
        self.with_deadline("ping", pool.get_conn()).await.is_ok()
    }
}

#[async_trait]
impl AnalyticsStore for MySqlStore {
    async fn list_tables(&self) -> Result<Vec<String>> {
        let stmt = Statement {
            sql: "SELECT TABLE_NAME FROM information_schema.TABLES \
                  WHERE TABLE_SCHEMA = DATABASE() ORDER BY TABLE_NAME"
                .to_string(),
            params: Vec::new(),
        };
        let rows = self.fetch_rows("list tables", stmt).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.values().next().and_then(Scalar::to_text))
            .collect())
    }

    async fn table_exists(&self, table: &Identifier) -> Result<bool> {
        let stmt = Statement {
            sql: "SELECT COUNT(*) FROM information_schema.TABLES \
                  WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?"
                .to_string(),
            params: vec![Value::from(table.as_str())],
        };
        Ok(self.fetch_u64("table lookup", stmt).await? > 0)
    }

    async fn list_columns(&self, table: &Identifier) -> Result<Vec<String>> {
        let stmt = Statement {
            sql: "SELECT COLUMN_NAME FROM information_schema.COLUMNS \
                  WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? ORDER BY ORDINAL_POSITION"
                .to_string(),
            params: vec![Value::from(table.as_str())],
        };
        let rows = self.fetch_rows("list columns", stmt).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.values().next().and_then(Scalar::to_text))
            .collect())
    }

    async fn count_rows(&self, table: &Identifier) -> Result<u64> {
        self.fetch_u64("row count", row_count_statement(table)).await
    }

    async fn probe_numeric(&self, table: &Identifier, column: &Identifier) -> Result<bool> {
        let stmt = probe_statement(table, column);
        let mut conn = self.conn().await?;
        let outcome: std::result::Result<Option<mysql_async::Row>, mysql_async::Error> =
            match tokio::time::timeout(
                self.deadline,
                conn.exec_first(stmt.sql.as_str(), params_of(&stmt)),
            )
            .await
            {
                Ok(outcome) => outcome,
                Err(_) => {
                    return Err(Error::QueryFailed(format!(
                        "numeric probe of {}.{} timed out",
                        table, column
                    )))
                }
            };

        match outcome {
            Ok(Some(row)) => {
                let values: Vec<Scalar> = row_from_mysql(row).values().cloned().collect();
                let present = values.first().and_then(Scalar::as_f64).unwrap_or(0.0);
                let numeric_like = values.get(1).and_then(Scalar::as_f64).unwrap_or(0.0);
                let average = values.get(2).and_then(Scalar::as_f64);
                let numeric = present > 0.0 && numeric_like == present && average.is_some();
                debug!(
                    "Probe {}.{}: present={}, numeric_like={}, numeric={}",
                    table, column, present, numeric_like, numeric
                );
                Ok(numeric)
            }
            Ok(None) => Ok(false),
            // The server refusing the aggregate means "not numeric", not a failed request.
            Err(mysql_async::Error::Server(e)) => {
                debug!("Aggregate over {}.{} rejected: {}", table, column, e);
                Ok(false)
            }
            Err(e) => {
                error!("Numeric probe of {}.{} failed: {}", table, column, e);
                Err(e.into())
            }
        }
    }

    async fn column_statistic(
        &self,
        table: &Identifier,
        column: &Identifier,
    ) -> Result<Option<ColumnStatistic>> {
        let values = self
            .fetch_values("column statistics", statistic_statement(table, column))
            .await?;
        let Some(values) = values else {
            return Ok(None);
        };

        let number = |i: usize| values.get(i).and_then(Scalar::as_f64);
        let count = number(0).unwrap_or(0.0) as u64;
        if count == 0 {
            return Ok(None);
        }

        Ok(Some(ColumnStatistic {
            column: column.to_string(),
            count,
            min: number(1).unwrap_or(0.0),
            max: number(2).unwrap_or(0.0),
            mean: number(3).unwrap_or(0.0),
            stddev: number(4).unwrap_or(0.0),
        }))
    }

    async fn fetch_page(&self, query: &ExplorerQuery) -> Result<Vec<Row>> {
        info!(
            "Fetching page {} of {} (limit {}, search: {})",
            query.page,
            query.table,
            query.limit,
            query.search.is_some()
        );
        self.fetch_rows("explorer page", query.data_statement()).await
    }

    async fn count_matching(&self, query: &ExplorerQuery) -> Result<u64> {
        self.fetch_u64("explorer count", query.count_statement()).await
    }

    async fn fetch_sample(&self, query: &SampleQuery) -> Result<Vec<Row>> {
        info!(
            "Fetching up to {} clustering rows from {}",
            query.cap, query.table
        );
        self.fetch_rows("clustering sample", query.statement()).await
    }
}

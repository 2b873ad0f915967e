use std::env;
use crate::{
    config::db::parse_var, Result, DEFAULT_CLUSTER_TABLE, DEFAULT_CLUSTER_TABLES,
    DEFAULT_PAGE_LIMIT, DEFAULT_TABLE_PREFIXES,
};

#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub page_limit: u64,
    /// Tables outside these prefixes are treated as absent.
    pub table_prefixes: Vec<String>,
    pub cluster_tables: Vec<String>,
    pub default_cluster_table: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            page_limit: DEFAULT_PAGE_LIMIT,
            table_prefixes: DEFAULT_TABLE_PREFIXES.iter().map(|p| p.to_string()).collect(),
            cluster_tables: DEFAULT_CLUSTER_TABLES.iter().map(|t| t.to_string()).collect(),
            default_cluster_table: DEFAULT_CLUSTER_TABLE.to_string(),
        }
    }
}

impl AnalyticsConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let page_limit = parse_var("EXPLORER_PAGE_LIMIT", defaults.page_limit)?.max(1);

        Ok(Self {
            page_limit,
            table_prefixes: list_var("EXPLORER_TABLE_PREFIXES").unwrap_or(defaults.table_prefixes),
            cluster_tables: list_var("CLUSTER_TABLES").unwrap_or(defaults.cluster_tables),
            default_cluster_table: env::var("CLUSTER_DEFAULT_TABLE")
                .unwrap_or(defaults.default_cluster_table),
        })
    }

    pub fn in_namespace(&self, table: &str) -> bool {
        self.table_prefixes.iter().any(|prefix| table.starts_with(prefix.as_str()))
    }

    /// Resolves a requested clustering table against the allow-list.
    pub fn cluster_table(&self, requested: Option<&str>) -> &str {
        match requested {
            Some(table) => self
                .cluster_tables
                .iter()
                .find(|allowed| allowed.as_str() == table)
                .map(String::as_str)
                .unwrap_or(&self.default_cluster_table),
            None => &self.default_cluster_table,
        }
    }
}

fn list_var(key: &str) -> Option<Vec<String>> {
    let raw = env::var(key).ok()?;
    let items: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

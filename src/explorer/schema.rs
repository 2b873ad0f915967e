use tracing::{debug, info, warn};
use crate::config::AnalyticsConfig;
use crate::{AnalyticsStore, Error, Identifier, Result, TableDescriptor};

/// Validates a requested table name and reads its columns from the catalog.
pub async fn describe_table(
    store: &dyn AnalyticsStore,
    config: &AnalyticsConfig,
    raw_table: &str,
) -> Result<TableDescriptor> {
    let name = Identifier::parse(raw_table)?;

    if !config.in_namespace(name.as_str()) {
        warn!("Table {} is outside the dataset namespace", name);
        return Err(Error::UnknownTable(name.to_string()));
    }
    if !store.table_exists(&name).await? {
        warn!("Requested table {} does not exist", name);
        return Err(Error::UnknownTable(name.to_string()));
    }

    let columns: Vec<Identifier> = store
        .list_columns(&name)
        .await?
        .into_iter()
        .map(Identifier::from_catalog)
        .collect();

    debug!("Table {} has {} columns", name, columns.len());
    Ok(TableDescriptor { name, columns })
}

/// Columns that aggregate as numbers, in catalog order.
pub async fn numeric_columns(
    store: &dyn AnalyticsStore,
    descriptor: &TableDescriptor,
) -> Result<Vec<Identifier>> {
    let mut numeric = Vec::new();

    for column in &descriptor.columns {
        if store.probe_numeric(&descriptor.name, column).await? {
            numeric.push(column.clone());
        } else {
            debug!("Excluding non-numeric column {}.{}", descriptor.name, column);
        }
    }

    info!(
        "Found {} numeric columns out of {} in {}",
        numeric.len(),
        descriptor.columns.len(),
        descriptor.name
    );
    Ok(numeric)
}

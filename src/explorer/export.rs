use csv::WriterBuilder;
use crate::{Result, Row};

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

pub fn export_filename(table: &str) -> String {
    format!("{}_export.csv", table)
}

/// Serializes one page as comma-separated text: a header of `columns`, then one record per
/// row. Nulls become empty fields; quoting follows RFC 4180.
pub fn export_csv(columns: &[String], rows: &[Row]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(columns)?;

    for row in rows {
        let record: Vec<String> = columns
            .iter()
            .map(|column| row.get(column).and_then(|v| v.to_text()).unwrap_or_default())
            .collect();
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| crate::Error::Csv(e.to_string()))
}

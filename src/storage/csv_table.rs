use crate::model::{PersistError, TimeSeriesTable};
use crate::utils::parse_datetime;
use chrono::SecondsFormat;
use csv::{Reader, Writer};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

const INDEX_HEADER: &str = "timestamp";

/// Destination for a finished table.
pub trait TablePersister: Send + Sync {
    fn persist(&self, table: &TimeSeriesTable, path: &Path) -> Result<(), PersistError>;
}

/// Writes tables as comma-separated spreadsheet files.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvPersister;

impl TablePersister for CsvPersister {
    fn persist(&self, table: &TimeSeriesTable, path: &Path) -> Result<(), PersistError> {
        save_table(table, path)
    }
}

/// Writes one row per timestamp, one column per metric. NaN becomes an empty cell.
pub fn save_table(table: &TimeSeriesTable, path: &Path) -> Result<(), PersistError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = Writer::from_writer(file);

    let mut header = vec![INDEX_HEADER];
    header.extend(table.column_names());
    writer.write_record(&header)?;

    let columns: Vec<&[f64]> = table.columns().map(|(_, values)| values).collect();
    for (row, ts) in table.timestamps().iter().enumerate() {
        let mut record = Vec::with_capacity(columns.len() + 1);
        record.push(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true));
        record.extend(columns.iter().map(|values| format_cell(values[row])));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    info!(
        "Saved table ({} rows, {} columns) to {}",
        table.len(),
        columns.len(),
        path.display()
    );
    Ok(())
}

/// Reads back a file produced by [`save_table`].
pub fn load_table(path: &Path) -> Result<TimeSeriesTable, PersistError> {
    let file = File::open(path)?;
    let mut reader = Reader::from_reader(file);

    let headers = reader.headers()?.clone();
    if headers.get(0) != Some(INDEX_HEADER) {
        return Err(PersistError::Malformed(format!(
            "first column must be '{}'",
            INDEX_HEADER
        )));
    }
    let names: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut timestamps = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let raw_ts = record.get(0).unwrap_or_default();
        let ts = parse_datetime(raw_ts)
            .ok_or_else(|| PersistError::Malformed(format!("row {}: bad timestamp '{}'", line, raw_ts)))?;
        timestamps.push(ts);

        for (i, column) in values.iter_mut().enumerate() {
            let cell = record.get(i + 1).unwrap_or_default();
            column.push(parse_cell(cell).ok_or_else(|| {
                PersistError::Malformed(format!("row {}: bad value '{}' in '{}'", line, cell, names[i]))
            })?);
        }
    }

    debug!("Loaded {} rows from {}", timestamps.len(), path.display());
    Ok(TimeSeriesTable::from_columns(timestamps, names.into_iter().zip(values))?)
}

fn format_cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

fn parse_cell(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Some(f64::NAN);
    }
    cell.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Analyzer;
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::tempdir;

    fn sample_table() -> TimeSeriesTable {
        let start = Utc.with_ymd_and_hms(2024, 10, 15, 0, 0, 0).unwrap();
        let ts = (0..7).map(|i| start + Duration::days(i)).collect();
        TimeSeriesTable::new(ts)
            .unwrap()
            .with_column("BTC", vec![1.0, -1.0, 1.0, 2.0, 1.0, 2.0, 1.0])
            .unwrap()
    }

    #[test]
    fn round_trip_keeps_rows_and_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut analyzer = Analyzer::new(sample_table());
        analyzer.sma("BTC", 1).unwrap();
        analyzer.diff("BTC", 1).unwrap();
        analyzer.extreme_points("BTC", 1).unwrap();
        analyzer.acf("BTC", 1).unwrap();
        analyzer.save(&path).unwrap();

        let loaded = load_table(&path).unwrap();
        assert_eq!(loaded.len(), analyzer.size());
        assert_eq!(loaded.column_names(), analyzer.table().column_names());
        assert_eq!(loaded.timestamps(), analyzer.table().timestamps());
    }

    #[test]
    fn nan_cells_are_written_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("nan.csv");

        let mut analyzer = Analyzer::new(sample_table());
        analyzer.max_points("BTC", 0).unwrap();
        CsvPersister.persist(analyzer.table(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let first = text.lines().nth(1).unwrap();
        assert!(first.ends_with(",1,")); // SMA 1, MAX empty

        let loaded = load_table(&path).unwrap();
        let max = loaded.column("MAX BTC").unwrap();
        assert!(max[0].is_nan());
        assert_eq!(max[3], 2.0);
    }

    #[test]
    fn rejects_file_without_index_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "BTC\n1\n").unwrap();
        assert!(matches!(load_table(&path), Err(PersistError::Malformed(_))));
    }
}

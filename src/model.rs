// Core structs: TimeSeriesTable, Extrema and the error types
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Ordered rows indexed by strictly increasing timestamps, one `f64` per named column.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesTable {
    timestamps: Vec<DateTime<Utc>>,
    columns: Vec<(String, Vec<f64>)>,
}

impl TimeSeriesTable {
    /// Creates a table with the given index and no columns.
    pub fn new(timestamps: Vec<DateTime<Utc>>) -> Result<Self, TableError> {
        if let Some(index) = timestamps.windows(2).position(|w| w[1] <= w[0]) {
            return Err(TableError::UnorderedTimestamps { index: index + 1 });
        }
        Ok(Self {
            timestamps,
            columns: Vec::new(),
        })
    }

    /// Builds a table from an index and a list of named columns.
    pub fn from_columns<I, S>(timestamps: Vec<DateTime<Utc>>, columns: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut table = Self::new(timestamps)?;
        for (name, values) in columns {
            table.set_column(name, values)?;
        }
        Ok(table)
    }

    /// Builder-style variant of [`set_column`](Self::set_column).
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self, TableError> {
        self.set_column(name, values)?;
        Ok(self)
    }

    /// Inserts a column, or replaces it in place if the name already exists.
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), TableError> {
        let name = name.into();
        if values.len() != self.timestamps.len() {
            return Err(TableError::LengthMismatch {
                column: name,
                expected: self.timestamps.len(),
                actual: values.len(),
            });
        }

        match self.columns.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = values,
            None => self.columns.push((name, values)),
        }
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Indices of strict local extrema, one list per requested column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extrema {
    pub max: Vec<Vec<usize>>,
    pub min: Vec<Vec<usize>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("timestamps must be strictly increasing (violated at row {index})")]
    UnorderedTimestamps { index: usize },
    #[error("column '{column}' has {actual} values, table has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyzerError {
    #[error("column '{0}' is missing from the table")]
    MissingColumn(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error(transparent)]
    Table(#[from] TableError),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid response status: {0}")]
    InvalidResponse(u16),
    #[error("failed to parse payload: {0}")]
    Parse(String),
    #[error(transparent)]
    Table(#[from] TableError),
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed table file: {0}")]
    Malformed(String),
    #[error(transparent)]
    Table(#[from] TableError),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("service is already running")]
    AlreadyRunning,
    #[error("service is not running")]
    NotRunning,
    #[error("failed to start worker thread: {0}")]
    StartFailure(#[source] std::io::Error),
    #[error("data fetch failed: {0}")]
    DataFetchFailure(#[from] SourceError),
    #[error("persisting table failed: {0}")]
    PersistenceFailure(#[from] PersistError),
    #[error("analysis failed: {0}")]
    Analysis(#[from] AnalyzerError),
    #[error("worker thread panicked: {0}")]
    WorkerPanicked(String),
}

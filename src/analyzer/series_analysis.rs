use crate::analyzer::indicators::SeriesIndicators;
use crate::model::{AnalyzerError, Extrema, PersistError, TimeSeriesTable};
use crate::normalizer::Columns;
use crate::storage::save_table;
use std::path::Path;
use tracing::debug;

pub const SMA_TAG: &str = "SMA";
pub const DIFF_TAG: &str = "DIFF";
pub const ACF_TAG: &str = "ACF";
pub const MAX_TAG: &str = "MAX";
pub const MIN_TAG: &str = "MIN";

/// Name of the derived column an operation writes for `column`, e.g. `"SMA BTC"`.
pub fn derived_name(tag: &str, column: &str) -> String {
    format!("{} {}", tag, column)
}

/// Stateful engine over one table.
///
/// Every operation appends (or overwrites) its derived columns in the table,
/// so after a full pass the table holds raw and derived metrics side by side.
/// `size` is fixed until the next [`rebind`](Analyzer::rebind).
pub struct Analyzer {
    data: TimeSeriesTable,
    size: usize,
}

impl Analyzer {
    pub fn new(data: TimeSeriesTable) -> Self {
        let size = data.len();
        Self { data, size }
    }

    /// Replaces the analysed table with a fresh snapshot.
    pub fn rebind(&mut self, data: TimeSeriesTable) {
        debug!("Rebinding analyzer: {} -> {} rows", self.size, data.len());
        self.size = data.len();
        self.data = data;
    }

    pub fn table(&self) -> &TimeSeriesTable {
        &self.data
    }

    pub fn into_table(self) -> TimeSeriesTable {
        self.data
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Simple moving average with window `n`, written as `"SMA <column>"`.
    pub fn sma(&mut self, columns: impl Into<Columns>, n: i64) -> Result<Vec<Vec<f64>>, AnalyzerError> {
        let columns = columns.into();
        self.smoothed(&columns, n)
    }

    /// Derivative of the SMA per second of elapsed time, written as `"DIFF <column>"`.
    pub fn diff(&mut self, columns: impl Into<Columns>, n: i64) -> Result<Vec<Vec<f64>>, AnalyzerError> {
        let columns = columns.into();
        let smoothed = self.smoothed(&columns, n)?;

        let diffs: Vec<Vec<f64>> = smoothed
            .iter()
            .map(|series| SeriesIndicators::diff(series, self.data.timestamps()))
            .collect();

        self.add_result(DIFF_TAG, &columns, &diffs)?;
        Ok(diffs)
    }

    /// Autocorrelation of the SMA for lags `0..size - 1`, written as `"ACF <column>"`.
    pub fn acf(&mut self, columns: impl Into<Columns>, n: i64) -> Result<Vec<Vec<f64>>, AnalyzerError> {
        let columns = columns.into();
        let smoothed = self.smoothed(&columns, n)?;

        let acf: Vec<Vec<f64>> = smoothed.iter().map(|series| SeriesIndicators::acf(series)).collect();

        self.add_result(ACF_TAG, &columns, &acf)?;
        Ok(acf)
    }

    /// Local maxima and minima of the SMA, see [`max_points`](Self::max_points).
    pub fn extreme_points(&mut self, columns: impl Into<Columns>, n: i64) -> Result<Extrema, AnalyzerError> {
        let columns = columns.into();
        Ok(Extrema {
            max: self.max_points(&columns, n)?,
            min: self.min_points(&columns, n)?,
        })
    }

    /// Indices of strict local maxima of the SMA. Writes `"MAX <column>"` with
    /// the SMA value at those rows and NaN elsewhere.
    pub fn max_points(&mut self, columns: impl Into<Columns>, n: i64) -> Result<Vec<Vec<usize>>, AnalyzerError> {
        let columns = columns.into();
        self.extrema_of(&columns, n, MAX_TAG, SeriesIndicators::local_maxima)
    }

    /// Indices of strict local minima of the SMA. Writes `"MIN <column>"`.
    pub fn min_points(&mut self, columns: impl Into<Columns>, n: i64) -> Result<Vec<Vec<usize>>, AnalyzerError> {
        let columns = columns.into();
        self.extrema_of(&columns, n, MIN_TAG, SeriesIndicators::local_minima)
    }

    /// Writes the whole table (raw and derived columns) to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        save_table(&self.data, path.as_ref())
    }

    fn extrema_of(
        &mut self,
        columns: &Columns,
        n: i64,
        tag: &str,
        find: fn(&[f64]) -> Vec<usize>,
    ) -> Result<Vec<Vec<usize>>, AnalyzerError> {
        let smoothed = self.smoothed(columns, n)?;

        let indices: Vec<Vec<usize>> = smoothed.iter().map(|series| find(series)).collect();
        let marked: Vec<Vec<f64>> = smoothed
            .iter()
            .zip(&indices)
            .map(|(series, idx)| SeriesIndicators::mark(series, idx))
            .collect();

        self.add_result(tag, columns, &marked)?;
        Ok(indices)
    }

    fn smoothed(&mut self, columns: &Columns, n: i64) -> Result<Vec<Vec<f64>>, AnalyzerError> {
        let window = usize::try_from(n)
            .map_err(|_| AnalyzerError::InvalidParameter(format!("window must be non-negative, got {}", n)))?;
        if columns.is_empty() {
            return Err(AnalyzerError::InvalidParameter("no columns selected".into()));
        }

        let sma = columns
            .iter()
            .map(|name| {
                self.data
                    .column(name)
                    .map(|values| SeriesIndicators::sma(values, window))
                    .ok_or_else(|| AnalyzerError::MissingColumn(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.add_result(SMA_TAG, columns, &sma)?;
        Ok(sma)
    }

    fn add_result(&mut self, tag: &str, columns: &Columns, results: &[Vec<f64>]) -> Result<(), AnalyzerError> {
        for (name, values) in columns.iter().zip(results) {
            self.data.set_column(derived_name(tag, name), values.clone())?;
        }
        Ok(())
    }
}

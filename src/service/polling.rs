use crate::analyzer::Analyzer;
use crate::model::{AnalyzerError, ServiceError, SourceError, TimeSeriesTable};
use crate::normalizer::Columns;
use crate::service::backoff::retry_delay;
use crate::service::cancellation::CancellationToken;
use crate::source::SeriesSource;
use crate::storage::TablePersister;
use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{error, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Idle,
    Running,
    /// Held only while `stop()` joins the worker.
    Stopping,
    /// The worker exited on its own (error or panic); `stop()` collects it.
    Finished,
}

/// Cadence and retry policy of the worker.
#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Sleep between cycles. Not interruptible.
    pub interval: Duration,
    /// Extra attempts per fetch. 0 means a failed fetch ends the worker.
    pub fetch_retries: u32,
    pub retry_base_delay: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            fetch_retries: 0,
            retry_base_delay: Duration::from_secs(1),
        }
    }
}

/// Everything the worker thread owns for one run.
struct WorkerContext {
    source: Arc<dyn SeriesSource>,
    persister: Arc<dyn TablePersister>,
    keywords: Vec<String>,
    columns: Columns,
    window: i64,
    output_path: PathBuf,
    settings: PollSettings,
    token: Arc<CancellationToken>,
}

/// Runs fetch → analyze → persist → sleep cycles on a background thread.
pub struct PollingService {
    source: Arc<dyn SeriesSource>,
    persister: Arc<dyn TablePersister>,
    keywords: Vec<String>,
    timeframe: String,
    settings: PollSettings,
    state: ServiceState,
    token: Option<Arc<CancellationToken>>,
    worker: Option<JoinHandle<Result<(), ServiceError>>>,
    last_error: Option<ServiceError>,
}

impl PollingService {
    pub fn new(
        source: Arc<dyn SeriesSource>,
        persister: Arc<dyn TablePersister>,
        keywords: Vec<String>,
        timeframe: impl Into<String>,
        settings: PollSettings,
    ) -> Self {
        Self {
            source,
            persister,
            keywords,
            timeframe: timeframe.into(),
            settings,
            state: ServiceState::Idle,
            token: None,
            worker: None,
            last_error: None,
        }
    }

    /// `Stopping` lives inside `stop()`, which holds `&mut self`, so callers
    /// see it only through the logs. A worker that ended early reports `Finished`.
    pub fn state(&self) -> ServiceState {
        match &self.worker {
            Some(handle) if handle.is_finished() => ServiceState::Finished,
            _ => self.state,
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Error that ended the previous run's worker, if any.
    pub fn last_error(&self) -> Option<&ServiceError> {
        self.last_error.as_ref()
    }

    /// Spawns the worker and returns as soon as the thread is launched.
    pub fn start(
        &mut self,
        columns: impl Into<Columns>,
        n: i64,
        output_path: impl Into<PathBuf>,
    ) -> Result<(), ServiceError> {
        if self.worker.is_some() {
            warn!("Attempt to start running service");
            return Err(ServiceError::AlreadyRunning);
        }

        let token = Arc::new(CancellationToken::new());
        let ctx = WorkerContext {
            source: Arc::clone(&self.source),
            persister: Arc::clone(&self.persister),
            keywords: self.keywords.clone(),
            columns: columns.into(),
            window: n,
            output_path: output_path.into(),
            settings: self.settings.clone(),
            token: Arc::clone(&token),
        };

        let handle = thread::Builder::new()
            .name("trend-watch-worker".into())
            .spawn(move || {
                let result = run_worker(&ctx);
                if let Err(e) = &result {
                    error!("Worker terminated: {}", e);
                }
                result
            })
            .map_err(|e| {
                error!("Error of start service: {}", e);
                ServiceError::StartFailure(e)
            })?;

        self.token = Some(token);
        self.worker = Some(handle);
        self.last_error = None;
        self.state = ServiceState::Running;
        info!("Service started");
        Ok(())
    }

    /// Cancels the run and blocks until the worker has exited.
    ///
    /// Returns only after the worker's last cycle (including its file write)
    /// has finished, which can take up to one analysis pass plus a full interval.
    pub fn stop(&mut self) -> Result<(), ServiceError> {
        let Some(handle) = self.worker.take() else {
            warn!("Attempt to stop service before start");
            return Err(ServiceError::NotRunning);
        };

        self.state = ServiceState::Stopping;
        if let Some(token) = self.token.take() {
            token.cancel();
        }

        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => self.last_error = Some(e),
            Err(payload) => {
                let message = panic_message(&*payload);
                error!("Worker thread panicked: {}", message);
                self.last_error = Some(ServiceError::WorkerPanicked(message));
            }
        }

        self.state = ServiceState::Idle;
        info!("Service stopped");
        Ok(())
    }

    /// One-shot analysis over the configured full historical timeframe.
    pub fn analyze_history(
        &self,
        columns: impl Into<Columns>,
        n: i64,
        output_path: &Path,
    ) -> Result<TimeSeriesTable, ServiceError> {
        let columns = columns.into();
        let history = self.source.fetch_series(&self.keywords, &self.timeframe)?;
        let mut analyzer = Analyzer::new(history);
        run_analysis(&mut analyzer, &columns, n)?;
        self.persister.persist(analyzer.table(), output_path)?;
        info!("Historical analysis ({}) saved to {}", self.timeframe, output_path.display());
        Ok(analyzer.into_table())
    }
}

impl Drop for PollingService {
    fn drop(&mut self) {
        if self.worker.is_some() {
            let _ = self.stop();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text.to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// The four operations of one cycle, in their fixed order.
pub fn run_analysis(analyzer: &mut Analyzer, columns: &Columns, n: i64) -> Result<(), AnalyzerError> {
    analyzer.sma(columns, n)?;
    analyzer.diff(columns, n)?;
    analyzer.extreme_points(columns, n)?;
    analyzer.acf(columns, n)?;
    Ok(())
}

fn run_worker(ctx: &WorkerContext) -> Result<(), ServiceError> {
    let snapshot = fetch_recent(ctx)?;
    let mut analyzer = Analyzer::new(snapshot);

    while !ctx.token.is_canceled() {
        let fresh = fetch_recent(ctx)?;
        analyzer.rebind(fresh);

        run_analysis(&mut analyzer, &ctx.columns, ctx.window)?;
        ctx.persister.persist(analyzer.table(), &ctx.output_path)?;
        info!(
            "Successful calculation of data. Saved to the file {}",
            ctx.output_path.display()
        );

        thread::sleep(ctx.settings.interval);
    }

    info!("Worker observed cancellation, exiting");
    Ok(())
}

fn fetch_recent(ctx: &WorkerContext) -> Result<TimeSeriesTable, SourceError> {
    let mut attempt = 0;
    loop {
        match ctx.source.fetch_recent_series(&ctx.keywords) {
            Ok(table) => return Ok(table),
            Err(e) if attempt < ctx.settings.fetch_retries && !ctx.token.is_canceled() => {
                attempt += 1;
                let delay = retry_delay(ctx.settings.retry_base_delay, attempt);
                warn!(
                    "Fetch failed ({}), retry {}/{} in {:?}",
                    e, attempt, ctx.settings.fetch_retries, delay
                );
                thread::sleep(delay);
            }
            Err(e) => return Err(e),
        }
    }
}

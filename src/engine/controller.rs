//! Engine controller implementation.

use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error};

use crate::board::Position;
use crate::config::EngineConfig;
use crate::search::{self, Score, SearchLimits, SearchResult};
use crate::sync::StopFlag;

/// Poll interval while an infinite or ponder search waits for `stop`
const PONDER_POLL_MS: u64 = 5;

/// Receives the result of every search, on the search thread.
pub type ResultCallback = Arc<dyn Fn(SearchResult) + Send + Sync>;

type SearchFn = fn(&Position, &SearchLimits, &EngineConfig, &StopFlag) -> SearchResult;

/// Error type for search start failures
#[derive(Debug)]
pub enum EngineError {
    /// A search is already running
    Busy,
    /// The search thread could not be created
    Spawn(io::Error),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Busy => write!(f, "engine busy"),
            EngineError::Spawn(e) => write!(f, "failed to spawn search thread: {e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Spawn(e) => Some(e),
            EngineError::Busy => None,
        }
    }
}

/// Active search job state
struct SearchJob {
    /// Stop flag for the search
    stop: StopFlag,
    /// Set right before the result callback runs
    delivered: Arc<AtomicBool>,
    /// Handle to the search thread
    handle: JoinHandle<()>,
}

impl SearchJob {
    fn is_delivered(&self) -> bool {
        self.delivered.load(Ordering::Acquire)
    }

    /// Stop the search and wait for the thread to finish
    fn stop_and_wait(self) {
        self.stop.stop();
        if self.handle.join().is_err() {
            error!("search thread panicked");
        }
    }
}

/// Asynchronous search controller.
///
/// Runs at most one search at a time on its own thread. The callback given
/// at construction is invoked exactly once per started search, whether the
/// search ends naturally or through [`Engine::stop`].
pub struct Engine {
    config: EngineConfig,
    on_result: ResultCallback,
    run_search: SearchFn,
    /// Active search job (if any)
    current_job: Option<SearchJob>,
}

impl Engine {
    /// Create an engine whose searches report through `on_result`.
    pub fn new<F>(config: EngineConfig, on_result: F) -> Self
    where
        F: Fn(SearchResult) + Send + Sync + 'static,
    {
        Engine {
            config,
            on_result: Arc::new(on_result),
            run_search: search::search,
            current_job: None,
        }
    }

    #[cfg(test)]
    fn with_search_fn<F>(config: EngineConfig, on_result: F, run_search: SearchFn) -> Self
    where
        F: Fn(SearchResult) + Send + Sync + 'static,
    {
        let mut engine = Engine::new(config, on_result);
        engine.run_search = run_search;
        engine
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start searching `position` under `limits` and return immediately.
    ///
    /// Fails with [`EngineError::Busy`] while an earlier search has not yet
    /// delivered its result.
    pub fn search(&mut self, position: Position, limits: SearchLimits) -> Result<(), EngineError> {
        if let Some(job) = self.current_job.take() {
            if !job.is_delivered() {
                self.current_job = Some(job);
                return Err(EngineError::Busy);
            }
            // Result already handed over; the thread is exiting.
            job.stop_and_wait();
        }

        let stop = StopFlag::new();
        let delivered = Arc::new(AtomicBool::new(false));

        let thread_stop = stop.clone();
        let thread_delivered = Arc::clone(&delivered);
        let on_result = Arc::clone(&self.on_result);
        let config = self.config.clone();
        let run_search = self.run_search;

        let handle = thread::Builder::new()
            .name("search".to_string())
            .stack_size(self.config.search_stack_size)
            .spawn(move || {
                let started = Instant::now();
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    run_search(&position, &limits, &config, &thread_stop)
                }));
                // A panicking search still reports exactly once.
                let result = outcome.unwrap_or_else(|_| {
                    error!("search panicked; reporting a null move");
                    aborted_result(started)
                });

                // Infinite and ponder searches report only once stopped
                if limits.infinite || limits.ponder {
                    while !thread_stop.is_stopped() {
                        thread::sleep(Duration::from_millis(PONDER_POLL_MS));
                    }
                }

                debug!(
                    "search finished: depth {} nodes {} stopped {}",
                    result.depth, result.nodes, result.stopped
                );
                thread_delivered.store(true, Ordering::Release);
                on_result(result);
            })
            .map_err(EngineError::Spawn)?;

        self.current_job = Some(SearchJob {
            stop,
            delivered,
            handle,
        });
        Ok(())
    }

    /// Request early termination of the running search. Idempotent; a no-op
    /// when nothing is running.
    pub fn stop(&self) {
        if let Some(job) = &self.current_job {
            job.stop.stop();
        }
    }

    /// Whether a search is running and has not yet delivered its result.
    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.current_job
            .as_ref()
            .map_or(false, |job| !job.is_delivered())
    }

    /// Stop any running search and join its thread. After this returns the
    /// callback will not be invoked again until the next [`Engine::search`].
    pub fn shutdown(&mut self) {
        if let Some(job) = self.current_job.take() {
            job.stop_and_wait();
        }
    }
}

fn aborted_result(started: Instant) -> SearchResult {
    SearchResult {
        best_move: None,
        ponder_move: None,
        score: Score::Centipawns(0),
        depth: 0,
        nodes: 0,
        elapsed: started.elapsed(),
        pv: Vec::new(),
        stopped: true,
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

//! Fetch/retry state for the movie list.
//!
//! The controller is owned by a single event loop. Network calls run on worker
//! threads and report back over a channel; [`MovieController::pump`] applies
//! whatever has finished and fires the retry timer when it is due. All loading,
//! error and retry bookkeeping lives in one [`FetchState`] value.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::http::FetchError;
use crate::movies::{MovieRecord, NewMovie};
use crate::store::MovieStore;

/// Fixed delay between a failed fetch and the next automatic attempt.
pub(crate) const RETRY_DELAY: Duration = Duration::from_millis(5000);

/// Handle to the one pending retry. Only reachable through [`RetryState::Pending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryTimer {
    due: Instant,
    token: u64,
}

impl RetryTimer {
    pub(crate) fn due(&self) -> Instant {
        self.due
    }

    pub(crate) fn remaining(&self, now: Instant) -> Duration {
        self.due.saturating_duration_since(now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RetryState {
    Pending(RetryTimer),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FetchState {
    Idle,
    Loading {
        attempt: u32,
        auto_retry: bool,
    },
    Success {
        count: usize,
        fetched_at: DateTime<Local>,
    },
    Failed {
        message: String,
        attempt: u32,
        retry: RetryState,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NoticeLevel {
    Info,
    Error,
}

/// Something the user should be told about after a call finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Notice {
    pub(crate) level: NoticeLevel,
    pub(crate) message: String,
}

impl Notice {
    fn info(message: String) -> Self {
        Self {
            level: NoticeLevel::Info,
            message,
        }
    }

    fn error(message: String) -> Self {
        Self {
            level: NoticeLevel::Error,
            message,
        }
    }
}

#[derive(Debug)]
enum Outcome {
    Fetched {
        request: u64,
        result: Result<Vec<MovieRecord>, FetchError>,
    },
    Added {
        title: String,
        result: Result<String, FetchError>,
    },
    Deleted {
        id: String,
        result: Result<(), FetchError>,
    },
}

pub(crate) struct MovieController {
    store: Arc<dyn MovieStore>,
    movies: Vec<MovieRecord>,
    state: FetchState,
    latest_request: u64,
    next_timer_token: u64,
    in_flight: usize,
    outcome_tx: Sender<Outcome>,
    outcome_rx: Receiver<Outcome>,
}

impl MovieController {
    pub(crate) fn new(store: Arc<dyn MovieStore>) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel();
        Self {
            store,
            movies: Vec::new(),
            state: FetchState::Idle,
            latest_request: 0,
            next_timer_token: 0,
            in_flight: 0,
            outcome_tx,
            outcome_rx,
        }
    }

    pub(crate) fn movies(&self) -> &[MovieRecord] {
        &self.movies
    }

    pub(crate) fn state(&self) -> &FetchState {
        &self.state
    }

    pub(crate) fn is_loading(&self) -> bool {
        matches!(self.state, FetchState::Loading { .. })
    }

    pub(crate) fn error(&self) -> Option<&str> {
        match &self.state {
            FetchState::Failed { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }

    /// True while a retry is pending or a retry attempt is in flight.
    pub(crate) fn is_retrying(&self) -> bool {
        match &self.state {
            FetchState::Failed {
                retry: RetryState::Pending(_),
                ..
            } => true,
            FetchState::Loading {
                attempt,
                auto_retry,
            } => *attempt > 1 && *auto_retry,
            _ => false,
        }
    }

    pub(crate) fn retry_timer(&self) -> Option<RetryTimer> {
        match &self.state {
            FetchState::Failed {
                retry: RetryState::Pending(timer),
                ..
            } => Some(*timer),
            _ => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn has_work_in_flight(&self) -> bool {
        self.in_flight > 0
    }

    /// Starts a manual fetch. A newer fetch always supersedes an older one.
    pub(crate) fn fetch_movies(&mut self) {
        self.start_fetch(1);
    }

    /// Stops the current retry cycle. Returns whether anything was cancelled.
    pub(crate) fn cancel_retry(&mut self) -> bool {
        if let Some(timer) = self.retry_timer() {
            self.invalidate_timer();
            info!(token = timer.token, "retry cancelled");
            return true;
        }
        if let FetchState::Loading {
            attempt,
            auto_retry,
        } = &mut self.state
            && *attempt > 1
            && *auto_retry
        {
            info!(attempt = *attempt, "retry cycle cancelled while attempt in flight");
            *auto_retry = false;
            return true;
        }
        false
    }

    /// Sends a create request; a successful add is followed by a re-fetch.
    pub(crate) fn add_movie(&mut self, movie: NewMovie) {
        let store = Arc::clone(&self.store);
        let tx = self.outcome_tx.clone();
        self.in_flight += 1;
        debug!(title = %movie.title, "adding movie");
        std::thread::spawn(move || {
            let result = store.add_movie(&movie);
            let _ = tx.send(Outcome::Added {
                title: movie.title,
                result,
            });
        });
    }

    /// Sends a delete request; a successful delete is followed by a re-fetch.
    pub(crate) fn delete_movie(&mut self, id: &str) {
        let store = Arc::clone(&self.store);
        let tx = self.outcome_tx.clone();
        let id = id.to_string();
        self.in_flight += 1;
        debug!(%id, "deleting movie");
        std::thread::spawn(move || {
            let result = store.delete_movie(&id);
            let _ = tx.send(Outcome::Deleted { id, result });
        });
    }

    /// Applies finished calls and fires the retry timer if it is due at `now`.
    pub(crate) fn pump(&mut self, now: Instant) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply(outcome, now, &mut notices);
        }
        self.fire_due_retry(now);
        notices
    }

    /// Blocks until a call finishes, the retry timer is due, or `max_wait` passes.
    pub(crate) fn wait(&mut self, max_wait: Duration) -> Vec<Notice> {
        let started = Instant::now();
        let wait_for = self
            .retry_timer()
            .map(|timer| timer.due().saturating_duration_since(started).min(max_wait))
            .unwrap_or(max_wait);

        let mut notices = Vec::new();
        if self.in_flight > 0 {
            match self.outcome_rx.recv_timeout(wait_for) {
                Ok(outcome) => self.apply(outcome, Instant::now(), &mut notices),
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {}
            }
        } else {
            std::thread::sleep(wait_for);
        }
        notices.extend(self.pump(Instant::now()));
        notices
    }

    /// Drops the pending retry and ignores calls that finish afterwards.
    pub(crate) fn shutdown(&mut self) {
        self.invalidate_timer();
        if let FetchState::Loading { auto_retry, .. } = &mut self.state {
            *auto_retry = false;
        }
        self.latest_request += 1;
    }

    fn start_fetch(&mut self, attempt: u32) {
        self.invalidate_timer();
        self.latest_request += 1;
        let request = self.latest_request;
        self.state = FetchState::Loading {
            attempt,
            auto_retry: true,
        };
        self.in_flight += 1;
        debug!(request, attempt, "fetching movies");

        let store = Arc::clone(&self.store);
        let tx = self.outcome_tx.clone();
        std::thread::spawn(move || {
            let result = store.fetch_movies();
            let _ = tx.send(Outcome::Fetched { request, result });
        });
    }

    fn apply(&mut self, outcome: Outcome, now: Instant, notices: &mut Vec<Notice>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match outcome {
            Outcome::Fetched { request, result } => {
                if request != self.latest_request {
                    debug!(request, latest = self.latest_request, "discarding stale fetch result");
                    return;
                }
                self.finish_fetch(result, now, notices);
            }
            Outcome::Added { title, result } => match result {
                Ok(id) => {
                    info!(%id, %title, "movie added");
                    notices.push(Notice::info(format!("Added movie: {title}")));
                    self.start_fetch(1);
                }
                Err(err) => {
                    warn!(%title, error = %err, "add failed");
                    notices.push(Notice::error(format!("Add failed: {err}")));
                }
            },
            Outcome::Deleted { id, result } => match result {
                Ok(()) => {
                    info!(%id, "movie deleted");
                    notices.push(Notice::info(format!("Deleted movie {id}")));
                    self.start_fetch(1);
                }
                Err(err) => {
                    warn!(%id, error = %err, "delete failed");
                    notices.push(Notice::error(format!("Delete failed: {err}")));
                }
            },
        }
    }

    fn finish_fetch(
        &mut self,
        result: Result<Vec<MovieRecord>, FetchError>,
        now: Instant,
        notices: &mut Vec<Notice>,
    ) {
        let (attempt, auto_retry) = match self.state {
            FetchState::Loading {
                attempt,
                auto_retry,
            } => (attempt, auto_retry),
            _ => (1, false),
        };

        match result {
            Ok(movies) => {
                let count = movies.len();
                self.movies = movies;
                self.state = FetchState::Success {
                    count,
                    fetched_at: Local::now(),
                };
                info!(count, attempt, "movies fetched");
                notices.push(Notice::info(format!("Loaded {count} movies.")));
            }
            Err(err) => {
                let message = err.user_message();
                warn!(attempt, error = %err, "fetch failed");
                let retry = if auto_retry && err.is_retryable() {
                    RetryState::Pending(self.schedule_retry(now))
                } else {
                    RetryState::Cancelled
                };
                notices.push(Notice::error(message.clone()));
                self.state = FetchState::Failed {
                    message,
                    attempt,
                    retry,
                };
            }
        }
    }

    fn schedule_retry(&mut self, now: Instant) -> RetryTimer {
        self.invalidate_timer();
        self.next_timer_token += 1;
        let timer = RetryTimer {
            due: now + RETRY_DELAY,
            token: self.next_timer_token,
        };
        debug!(token = timer.token, delay_ms = RETRY_DELAY.as_millis() as u64, "retry scheduled");
        timer
    }

    fn invalidate_timer(&mut self) {
        if let FetchState::Failed { retry, .. } = &mut self.state
            && let RetryState::Pending(timer) = *retry
        {
            debug!(token = timer.token, "retry timer invalidated");
            *retry = RetryState::Cancelled;
        }
    }

    fn fire_due_retry(&mut self, now: Instant) {
        let FetchState::Failed {
            attempt,
            retry: RetryState::Pending(timer),
            ..
        } = &self.state
        else {
            return;
        };
        if now < timer.due {
            return;
        }
        let next_attempt = attempt + 1;
        info!(attempt = next_attempt, "retrying fetch");
        self.start_fetch(next_attempt);
    }

    /// Applies every outstanding call at `now`, blocking until each reports.
    #[cfg(test)]
    pub(crate) fn settle(&mut self, now: Instant) -> Vec<Notice> {
        let mut notices = Vec::new();
        while self.in_flight > 0 {
            match self.outcome_rx.recv_timeout(Duration::from_secs(5)) {
                Ok(outcome) => self.apply(outcome, now, &mut notices),
                Err(_) => panic!("worker call did not report back"),
            }
        }
        self.fire_due_retry(now);
        notices
    }
}

impl Drop for MovieController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

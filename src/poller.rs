//! The poll → validate → parse → notify loop.
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use crate::error::Result;
use crate::homework;
use crate::notifier::Notifier;
use crate::review_api::ReviewApi;

/// Loop-owned state threaded through every iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollState {
    /// Lower bound for the next fetch, as last confirmed by the server.
    pub cursor: i64,
    pub last_notified: Option<String>,
    pub last_error: Option<String>,
}

impl PollState {
    pub fn new(cursor: i64) -> Self {
        Self {
            cursor,
            ..Default::default()
        }
    }
}

/// What a single iteration ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Notified(String),
    Unchanged,
    NoUpdates,
    Failed(String),
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, period: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, period: Duration) {
        tokio::time::sleep(period).await;
    }
}

pub struct Poller {
    api: Box<dyn ReviewApi>,
    notifier: Box<dyn Notifier>,
    sleeper: Box<dyn Sleeper>,
    retry_period: Duration,
}

impl Poller {
    pub fn new(
        api: Box<dyn ReviewApi>,
        notifier: Box<dyn Notifier>,
        sleeper: Box<dyn Sleeper>,
        retry_period: Duration,
    ) -> Self {
        Self {
            api,
            notifier,
            sleeper,
            retry_period,
        }
    }

    /// Iterate forever.
    #[instrument(skip_all)]
    pub async fn run(&self, mut state: PollState) {
        info!(cursor = state.cursor, "starting homework status polling");
        loop {
            self.iterate(&mut state).await;
        }
    }

    /// One tick followed by the fixed sleep, whatever the tick returned.
    pub async fn iterate(&self, state: &mut PollState) -> Outcome {
        let outcome = self.tick(state).await;
        self.sleeper.sleep(self.retry_period).await;
        outcome
    }

    #[instrument(skip_all, fields(cursor = state.cursor))]
    pub async fn tick(&self, state: &mut PollState) -> Outcome {
        match self.check_for_updates(state).await {
            Ok(outcome) => {
                state.last_error = None;
                outcome
            }
            Err(err) => {
                error!(kind = ?err.kind(), "{}", err);
                let message = format!("Program failure: {}", err);
                if state.last_error.as_deref() != Some(message.as_str()) {
                    if let Err(send_err) = self.notifier.send(&message).await {
                        error!(%send_err, "failed to deliver error notification");
                    }
                    state.last_error = Some(message.clone());
                } else {
                    debug!("error already reported");
                }
                Outcome::Failed(message)
            }
        }
    }

    /// The cursor and the remembered message change only when every stage
    /// succeeded.
    async fn check_for_updates(&self, state: &mut PollState) -> Result<Outcome> {
        let payload = self.api.homework_statuses(state.cursor).await?;
        let (homeworks, current_date) = homework::check_response(&payload)?;

        let outcome = match homeworks.first() {
            None => {
                debug!("no status changes");
                Outcome::NoUpdates
            }
            Some(latest) => {
                let message = homework::parse_status(latest)?;
                if state.last_notified.as_deref() == Some(message.as_str()) {
                    debug!("status unchanged; not notifying");
                    Outcome::Unchanged
                } else {
                    self.notifier.send(&message).await?;
                    state.last_notified = Some(message.clone());
                    Outcome::Notified(message)
                }
            }
        };

        state.cursor = current_date;
        Ok(outcome)
    }
}

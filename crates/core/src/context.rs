//! Caller cancellation scope
//!
//! A [`Context`] travels with every proposal and query. It only matters while
//! the call waits for a partition's guard: once the guard is held the
//! operation runs to completion regardless of the context.

use std::future::pending;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Why a context is done
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoneCause {
    /// The caller cancelled explicitly
    Cancelled,
    /// The context's deadline passed
    DeadlineExceeded,
}

/// Cancellation scope for one or more calls
///
/// Cheap to clone; clones observe the same cancel signal and deadline.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancel: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

/// Cancels the contexts created alongside it
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancel every context derived from this handle
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Context {
    /// A context that is never done
    pub fn background() -> Self {
        Context::default()
    }

    /// A context plus the handle that cancels it
    pub fn with_cancel() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (
            Context {
                cancel: Some(rx),
                deadline: None,
            },
            CancelHandle { tx },
        )
    }

    /// A context that expires after `timeout`
    pub fn with_timeout(timeout: Duration) -> Self {
        Context::background().timeout(timeout)
    }

    /// A context that expires at `deadline`
    pub fn with_deadline(deadline: Instant) -> Self {
        Context::background().deadline(deadline)
    }

    /// Derive a context that also expires after `timeout`
    ///
    /// The earlier of the existing and new deadline wins.
    pub fn timeout(self, timeout: Duration) -> Self {
        self.deadline(Instant::now() + timeout)
    }

    /// Derive a context that also expires at `deadline`
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// The deadline, if any
    pub fn get_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Check without waiting
    pub fn err(&self) -> Option<DoneCause> {
        if let Some(rx) = &self.cancel {
            if *rx.borrow() {
                return Some(DoneCause::Cancelled);
            }
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(DoneCause::DeadlineExceeded),
            _ => None,
        }
    }

    /// Wait until the context is done
    ///
    /// Never resolves for a background context. A dropped [`CancelHandle`]
    /// does not cancel.
    pub async fn done(&self) -> DoneCause {
        let cancelled = async {
            match &self.cancel {
                Some(rx) => {
                    let mut rx = rx.clone();
                    loop {
                        if *rx.borrow_and_update() {
                            return;
                        }
                        if rx.changed().await.is_err() {
                            pending::<()>().await;
                        }
                    }
                }
                None => pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => DoneCause::Cancelled,
            _ = expired => DoneCause::DeadlineExceeded,
        }
    }
}

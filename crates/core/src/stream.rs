//! Output streams
//!
//! Every proposal or query call writes its outcome to an [`OutputStream`]:
//! zero or more values followed by exactly one terminal event.
//!
//! # Exactly-once completion
//!
//! The terminal operations (`complete`, `fail`, `result`) consume the stream,
//! so a second terminal write does not compile. A stream dropped before any
//! terminal write emits `Failed(Aborted)` from its `Drop` impl. Together these
//! give every call exactly one terminal event on every path, including calls
//! rejected before they reached the state machine.
//!
//! # Non-blocking writes
//!
//! The channel is unbounded. Writes happen while the partition guard is held
//! and must never suspend.

use crate::error::DomainError;
use tokio::sync::mpsc;

/// One event observed on an output stream
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent<T> {
    /// A response message
    Value(T),
    /// Terminal: the call succeeded
    Completed,
    /// Terminal: the call ended with a domain error
    Failed(DomainError),
}

impl<T> StreamEvent<T> {
    /// True for `Completed` and `Failed`
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Value(_))
    }
}

/// Create a connected stream/receiver pair
pub fn channel<T>() -> (OutputStream<T>, OutputReceiver<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        OutputStream {
            tx,
            finished: false,
        },
        OutputReceiver { rx, done: false },
    )
}

/// Write half of an output stream
#[derive(Debug)]
pub struct OutputStream<T> {
    tx: mpsc::UnboundedSender<StreamEvent<T>>,
    finished: bool,
}

impl<T> OutputStream<T> {
    /// Write one response message
    ///
    /// Messages sent after the receiver is gone are discarded.
    pub fn value(&mut self, value: T) {
        let _ = self.tx.send(StreamEvent::Value(value));
    }

    /// Finish successfully
    pub fn complete(mut self) {
        self.finish(StreamEvent::Completed);
    }

    /// Finish with a domain error
    pub fn fail(mut self, error: DomainError) {
        self.finish(StreamEvent::Failed(error));
    }

    /// Write a single result and finish
    pub fn result(mut self, result: Result<T, DomainError>) {
        match result {
            Ok(value) => {
                self.value(value);
                self.complete();
            }
            Err(error) => self.fail(error),
        }
    }

    /// True once the receiver has been dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn finish(&mut self, event: StreamEvent<T>) {
        debug_assert!(event.is_terminal());
        self.finished = true;
        let _ = self.tx.send(event);
    }
}

impl<T> Drop for OutputStream<T> {
    fn drop(&mut self) {
        if !self.finished {
            self.finish(StreamEvent::Failed(DomainError::aborted(
                "stream dropped before completion",
            )));
        }
    }
}

/// Read half of an output stream
#[derive(Debug)]
pub struct OutputReceiver<T> {
    rx: mpsc::UnboundedReceiver<StreamEvent<T>>,
    done: bool,
}

impl<T> OutputReceiver<T> {
    /// Receive the next event
    ///
    /// Returns `None` once the terminal event has been received.
    pub async fn recv(&mut self) -> Option<StreamEvent<T>> {
        if self.done {
            return None;
        }
        let event = self.rx.recv().await;
        match &event {
            Some(e) if !e.is_terminal() => {}
            _ => self.done = true,
        }
        event
    }

    /// Collect every value until the terminal event
    ///
    /// Returns the values on `Completed`, or the error on `Failed`.
    pub async fn collect(mut self) -> Result<Vec<T>, DomainError> {
        let mut values = Vec::new();
        while let Some(event) = self.recv().await {
            match event {
                StreamEvent::Value(v) => values.push(v),
                StreamEvent::Completed => return Ok(values),
                StreamEvent::Failed(e) => return Err(e),
            }
        }
        Err(DomainError::aborted("stream closed without a terminal event"))
    }

    /// Collect exactly one value
    pub async fn single(self) -> Result<T, DomainError> {
        let mut values = self.collect().await?;
        match values.len() {
            1 => Ok(values.remove(0)),
            n => Err(DomainError::aborted(format!(
                "expected exactly one value, got {}",
                n
            ))),
        }
    }
}

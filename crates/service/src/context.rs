//! Cancellation and deadline capability.
//!
//! Every server handler and every client exchange receives a `Context`.
//! Cancelling it makes the pending socket operations on its behalf
//! return promptly, and the two ways a context can end stay
//! distinguishable: a deadline surfaces as a timeout-kind error, an
//! explicit cancel as a cancel-kind error.

use tokio::sync::watch;
use tokio::time::{sleep_until, Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    DeadlineExceeded,
    Cancelled,
}

impl ContextError {
    /// Generic timeout predicate, for callers that only care whether
    /// waiting longer could have helped.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::DeadlineExceeded)
    }
}

impl std::error::Error for ContextError {}

impl std::fmt::Display for ContextError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeadlineExceeded => write!(f, "context deadline exceeded"),
            Self::Cancelled => write!(f, "context cancelled"),
        }
    }
}

/// Cancels the [`Context`] handed out beside it.  Cancelling twice is
/// harmless.
pub struct Canceller(watch::Sender<bool>);

impl Canceller {
    pub fn cancel(&self) {
        let _ = self.0.send(true);
    }
}

#[derive(Debug, Clone)]
pub struct Context {
    deadline: Option<Instant>,
    cancelled: watch::Receiver<bool>,
}

impl Context {
    /// A context that never ends.
    pub fn background() -> Self {
        let (sender, receiver) = watch::channel(false);

        // the receiver outliving its sender reads as "never cancelled",
        // so the sender can be dropped here.
        drop(sender);
        Self {
            deadline: None,
            cancelled: receiver,
        }
    }

    /// A context that ends `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
            ..Self::background()
        }
    }

    /// A context ending at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            ..Self::background()
        }
    }

    /// A context with an explicit cancel handle.
    ///
    /// # Unit Test
    ///
    /// ```
    /// #[tokio::main(flavor = "current_thread")]
    /// async fn main() {
    ///     use radius_server_service::context::{Context, ContextError};
    ///
    ///     let (ctx, canceller) = Context::with_cancel();
    ///     canceller.cancel();
    ///
    ///     let err = ctx.done().await;
    ///     assert_eq!(err, ContextError::Cancelled);
    ///     assert!(!err.is_timeout());
    /// }
    /// ```
    pub fn with_cancel() -> (Self, Canceller) {
        let (sender, receiver) = watch::channel(false);
        (
            Self {
                deadline: None,
                cancelled: receiver,
            },
            Canceller(sender),
        )
    }

    pub(crate) fn from_watch(cancelled: watch::Receiver<bool>) -> Self {
        Self {
            deadline: None,
            cancelled,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Resolves when the context ends, with the reason it ended.
    ///
    /// A context without deadline or cancel handle never resolves,
    /// which is exactly what a `select!` against it wants.
    pub async fn done(&self) -> ContextError {
        let deadline = async {
            match self.deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        let mut cancelled = self.cancelled.clone();
        let cancel = async move {
            // a dropped sender means cancel can no longer happen.
            if cancelled.wait_for(|cancelled| *cancelled).await.is_err() {
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            _ = deadline => ContextError::DeadlineExceeded,
            _ = cancel => ContextError::Cancelled,
        }
    }
}

//! Cooperative stop request for the probe loop.
//!
//! [`Cancellation`] is held by whoever may ask the loop to stop (the Ctrl-C
//! handler in the binary). The loop holds a [`CancelToken`] and can either
//! poll it or wait on it.

use std::future::Future;
use std::io;

use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct Cancellation {
    sender: watch::Sender<bool>,
}

#[derive(Debug, Clone)]
pub struct CancelToken {
    receiver: watch::Receiver<bool>,
}

impl Cancellation {
    pub fn new() -> (Self, CancelToken) {
        let (sender, receiver) = watch::channel(false);
        (Self { sender }, CancelToken { receiver })
    }

    /// Requests a stop. Calling it more than once is harmless.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Cancels on the first interrupt and resolves on the second one, so the
    /// caller can abort a probe that is still waiting on its timeout.
    pub async fn cancel_on_interrupt<F, Fut>(self, mut interrupt: F) -> io::Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = io::Result<()>>,
    {
        interrupt().await?;
        self.cancel();
        interrupt().await
    }
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once a stop was requested. Never resolves if every
    /// [`Cancellation`] is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        if self.receiver.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

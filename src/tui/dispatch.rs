//! Runs screen jobs in the background and hands results back to the UI loop.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::error::GatewayError;
use crate::gateway::TaskGateway;
use crate::screen::{perform, Completion, Job};

/// A finished job with its outcome.
pub type Finished = (Job, Result<Completion, GatewayError>);

pub struct Dispatcher {
    handle: Handle,
    gateway: Arc<dyn TaskGateway>,
    tx: UnboundedSender<Finished>,
    rx: UnboundedReceiver<Finished>,
    in_flight: usize,
}

impl Dispatcher {
    pub fn new(handle: Handle, gateway: Arc<dyn TaskGateway>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Dispatcher { handle, gateway, tx, rx, in_flight: 0 }
    }

    /// Start a job on the runtime. Its result shows up in `drain`.
    pub fn dispatch(&mut self, job: Job) {
        debug!(?job, "dispatching job");
        let gateway = Arc::clone(&self.gateway);
        let tx = self.tx.clone();
        self.in_flight += 1;
        self.handle.spawn(async move {
            let result = perform(gateway.as_ref(), &job).await;
            // The receiver only goes away when the UI has exited
            let _ = tx.send((job, result));
        });
    }

    /// Results that have arrived since the last call, without blocking.
    pub fn drain(&mut self) -> Vec<Finished> {
        let mut finished = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(done) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    finished.push(done);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        finished
    }

    /// Block the current thread until the next result arrives.
    ///
    /// Must not be called from inside the runtime.
    pub fn wait(&mut self) -> Option<Finished> {
        if self.in_flight == 0 {
            return None;
        }
        let done = self.rx.blocking_recv()?;
        self.in_flight -= 1;
        Some(done)
    }

    /// Jobs started but not yet drained.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

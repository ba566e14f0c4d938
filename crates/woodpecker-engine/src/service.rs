//! Runs a [`Controller`] on its own task.
//!
//! The task owns the controller, so operations are serialized: user commands
//! arrive over a channel and the periodic refresh fires from a timer in the
//! same loop. Shutdown cancels whatever operation is in flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::controller::Controller;
use crate::error::{ControllerError, SharedError};
use crate::view::ViewModel;

const COMMAND_QUEUE: usize = 32;

/// Settings for the controller task.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Period of the automatic checkpoint refresh.
    pub refresh_interval: Duration,
    /// Load the selected log's latest checkpoint and leaf before serving
    /// commands.
    pub load_on_start: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(5),
            load_on_start: true,
        }
    }
}

#[derive(Debug)]
enum Command {
    Refresh,
    ShowLatest,
    GetLeaf(u64),
    PrevLeaf,
    NextLeaf,
    SelectLog(String),
    IncWitnesses,
    DecWitnesses,
}

struct Request {
    command: Command,
    reply: oneshot::Sender<Result<(), SharedError>>,
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Cloneable front end to a running controller task.
///
/// Every method waits for its command to finish. Once the task has stopped
/// they fail with [`ControllerError::Stopped`].
#[derive(Clone)]
pub struct ControllerHandle {
    tx: mpsc::Sender<Request>,
    model: Arc<ViewModel>,
}

impl ControllerHandle {
    pub fn model(&self) -> &Arc<ViewModel> {
        &self.model
    }

    async fn send(&self, command: Command) -> Result<(), SharedError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request { command, reply })
            .await
            .map_err(|_| Arc::new(ControllerError::Stopped))?;
        rx.await.map_err(|_| Arc::new(ControllerError::Stopped))?
    }

    /// Refresh the selected log's checkpoint. The outcome is in the view.
    pub async fn refresh(&self) -> Result<(), SharedError> {
        self.send(Command::Refresh).await
    }

    /// Refresh and jump to the newest leaf. The outcome is in the view.
    pub async fn show_latest(&self) -> Result<(), SharedError> {
        self.send(Command::ShowLatest).await
    }

    pub async fn get_leaf(&self, index: u64) -> Result<(), SharedError> {
        self.send(Command::GetLeaf(index)).await
    }

    pub async fn prev_leaf(&self) -> Result<(), SharedError> {
        self.send(Command::PrevLeaf).await
    }

    pub async fn next_leaf(&self) -> Result<(), SharedError> {
        self.send(Command::NextLeaf).await
    }

    pub async fn select_log(&self, origin: impl Into<String>) -> Result<(), SharedError> {
        self.send(Command::SelectLog(origin.into())).await
    }

    /// Raise the witness threshold. The new value is in the view.
    pub async fn inc_witnesses(&self) -> Result<(), SharedError> {
        self.send(Command::IncWitnesses).await
    }

    /// Lower the witness threshold. The new value is in the view.
    pub async fn dec_witnesses(&self) -> Result<(), SharedError> {
        self.send(Command::DecWitnesses).await
    }
}

impl std::fmt::Debug for ControllerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerHandle")
            .field("closed", &self.tx.is_closed())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// A running controller task.
///
/// Dropping the service shuts the task down.
pub struct ControllerService {
    handle: ControllerHandle,
    shutdown_tx: watch::Sender<bool>,
    task: tokio::task::JoinHandle<()>,
}

impl ControllerService {
    pub fn handle(&self) -> ControllerHandle {
        self.handle.clone()
    }

    pub fn model(&self) -> &Arc<ViewModel> {
        &self.handle.model
    }

    /// Ask the task to stop, cancelling any operation in flight.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Stop the task and wait for it to exit.
    pub async fn stop(self) {
        self.shutdown();
        let _ = self.task.await;
    }

    /// Check whether the task is still running.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

/// Start `controller` on a new task.
pub fn spawn(controller: Controller, config: ServiceConfig) -> ControllerService {
    let (tx, rx) = mpsc::channel(COMMAND_QUEUE);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let model = controller.model().clone();

    let task = tokio::spawn(run(controller, config, rx, shutdown_rx));

    ControllerService {
        handle: ControllerHandle { tx, model },
        shutdown_tx,
        task,
    }
}

/// Run `op` unless shutdown is signalled first. Returns `None` on shutdown.
async fn until_shutdown<F: Future>(
    op: F,
    shutdown_rx: &mut watch::Receiver<bool>,
) -> Option<F::Output> {
    if *shutdown_rx.borrow() {
        return None;
    }
    tokio::select! {
        out = op => Some(out),
        _ = shutdown_rx.changed() => None,
    }
}

async fn run(
    mut controller: Controller,
    config: ServiceConfig,
    mut rx: mpsc::Receiver<Request>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    info!(
        log = %controller.current().origin(),
        interval = ?config.refresh_interval,
        "controller started"
    );

    if config.load_on_start
        && until_shutdown(controller.show_latest(), &mut shutdown_rx)
            .await
            .is_none()
    {
        info!("controller stopped during initial load");
        return;
    }

    let period = config.refresh_interval;
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.changed() => {
                info!("controller shutting down");
                break;
            }
            request = rx.recv() => {
                let Some(Request { command, reply }) = request else {
                    break;
                };
                debug!(?command, "controller command");
                match until_shutdown(execute(&mut controller, command), &mut shutdown_rx).await {
                    Some(result) => {
                        let _ = reply.send(result);
                    }
                    None => break,
                }
            }
            _ = ticker.tick() => {
                if until_shutdown(controller.refresh_checkpoint(), &mut shutdown_rx).await.is_none() {
                    break;
                }
            }
        }
    }

    info!("controller stopped");
}

async fn execute(controller: &mut Controller, command: Command) -> Result<(), SharedError> {
    match command {
        Command::Refresh => {
            controller.refresh_checkpoint().await;
            Ok(())
        }
        Command::ShowLatest => {
            controller.show_latest().await;
            Ok(())
        }
        Command::GetLeaf(index) => controller.get_leaf(index).await,
        Command::PrevLeaf => controller.prev_leaf().await,
        Command::NextLeaf => controller.next_leaf().await,
        Command::SelectLog(origin) => controller.select_log(&origin).await,
        Command::IncWitnesses => {
            controller.inc_witnesses();
            Ok(())
        }
        Command::DecWitnesses => {
            controller.dec_witnesses();
            Ok(())
        }
    }
}

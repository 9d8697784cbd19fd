//! Async driver for a [`StreamCore`].
//!
//! A single task owns the core. It multiplexes the tick timer, control
//! commands, cancellation, and annotation completions, and publishes a
//! snapshot after each mutation. Annotations run as separate tasks so a slow
//! backend never delays the next tick.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::item::GalleryItem;
use super::scheduler::{StreamCore, StreamSnapshot};
use crate::backend::BackendError;
use crate::contract::ContractLayer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamCommand {
    Pause,
    Resume,
    Toggle,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("stream task has stopped")]
pub struct StreamClosed;

/// Handle to a running live stream. Dropping it tears the stream down.
pub struct LiveStream {
    commands: mpsc::Sender<StreamCommand>,
    snapshots: watch::Receiver<StreamSnapshot>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl LiveStream {
    /// Spawn the driver task. Must be called inside a tokio runtime.
    pub fn spawn(core: StreamCore, contract: ContractLayer) -> Self {
        let (commands, command_rx) = mpsc::channel(16);
        let (snapshot_tx, snapshots) = watch::channel(core.snapshot());
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run(core, contract, command_rx, snapshot_tx, cancel.clone()));

        Self {
            commands,
            snapshots,
            cancel,
            task: Some(task),
        }
    }

    pub async fn pause(&self) -> Result<(), StreamClosed> {
        self.send(StreamCommand::Pause).await
    }

    pub async fn resume(&self) -> Result<(), StreamClosed> {
        self.send(StreamCommand::Resume).await
    }

    pub async fn toggle(&self) -> Result<(), StreamClosed> {
        self.send(StreamCommand::Toggle).await
    }

    async fn send(&self, command: StreamCommand) -> Result<(), StreamClosed> {
        self.commands.send(command).await.map_err(|_| StreamClosed)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> StreamSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<StreamSnapshot> {
        self.snapshots.clone()
    }

    /// Cancel the timer and wait for the driver to exit. In-flight annotations
    /// are abandoned.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Stream task ended abnormally");
            }
        }
    }
}

impl Drop for LiveStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

type Annotation = (GalleryItem, Result<String, BackendError>);

async fn run(
    mut core: StreamCore,
    contract: ContractLayer,
    mut commands: mpsc::Receiver<StreamCommand>,
    snapshots: watch::Sender<StreamSnapshot>,
    cancel: CancellationToken,
) {
    let period = Duration::from_millis(core.config().tick_interval_ms);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut annotations: JoinSet<Annotation> = JoinSet::new();

    tracing::info!(
        tick_ms = period.as_millis() as u64,
        gallery = core.gallery_len(),
        "Live stream started"
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Live stream shutting down");
                break;
            }
            command = commands.recv() => {
                let Some(command) = command else {
                    tracing::debug!("Command channel closed, stopping stream");
                    break;
                };
                let resumed = match command {
                    StreamCommand::Pause => {
                        core.pause();
                        false
                    }
                    StreamCommand::Resume => core.resume(),
                    StreamCommand::Toggle => {
                        if core.is_paused() {
                            core.resume()
                        } else {
                            core.pause();
                            false
                        }
                    }
                };
                if resumed {
                    ticker.reset();
                }
                tracing::debug!(?command, paused = core.is_paused(), "Stream command applied");
                snapshots.send_replace(core.snapshot());
            }
            _ = ticker.tick() => {
                let Some(item) = core.tick() else {
                    continue;
                };
                tracing::debug!(
                    item.id = %item.id,
                    counter = core.state().synthetic_counter,
                    "Gallery item synthesized"
                );
                snapshots.send_replace(core.snapshot());

                let contract = contract.clone();
                annotations.spawn(async move {
                    let annotation = contract.live_thinking(&item.agent).await;
                    (item, annotation)
                });
            }
            Some(joined) = annotations.join_next(), if !annotations.is_empty() => {
                match joined {
                    Ok((item, Ok(annotation))) => {
                        core.record_annotation(&item, annotation.trim());
                        snapshots.send_replace(core.snapshot());
                    }
                    Ok((item, Err(e))) => {
                        tracing::debug!(item.id = %item.id, error = %e, "Annotation dropped");
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "Annotation task failed");
                    }
                }
            }
        }
    }

    annotations.abort_all();
}

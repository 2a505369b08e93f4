//! Spawning and controlling a worker task.

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use vinery_sheets::TableStore;

use crate::gate::ManualGate;
use crate::session::SessionFactory;
use crate::status::StatusSender;
use crate::worker::{Worker, WorkerOptions};

/// Control handle for a spawned worker task.
pub struct WorkerHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    /// Whether the worker task has terminated on its own.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Request a cooperative stop and wait for the worker to wind down.
    /// Any in-flight row finishes its relocation first.
    pub async fn stop(self) {
        self.cancel.cancel();
        let _ = self.join.await;
    }

    /// Wait for the worker to terminate without requesting a stop.
    pub async fn join(self) {
        let _ = self.join.await;
    }
}

/// Spawn a worker onto the current runtime.
///
/// Returns the control handle and the receiving end of the status channel.
pub fn spawn_worker<S, F, G>(
    store: S,
    factory: F,
    gate: G,
    options: WorkerOptions,
) -> (WorkerHandle, UnboundedReceiver<String>)
where
    S: TableStore + 'static,
    F: SessionFactory + 'static,
    F::Session: 'static,
    G: ManualGate + 'static,
{
    let (status, rx) = StatusSender::channel();
    let cancel = CancellationToken::new();
    let worker = Worker::new(store, factory, gate, options, status, cancel.clone());
    let join = tokio::spawn(worker.run());

    (WorkerHandle { cancel, join }, rx)
}

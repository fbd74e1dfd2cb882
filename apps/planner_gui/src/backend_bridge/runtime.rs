//! Backend worker: owns the tokio runtime and turns queued commands into UI events.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    thread,
};

use client_core::ItineraryService;
use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, error, info};

use crate::backend_bridge::{
    commands::BackendCommand, export::run_export, generation::run_generation, health,
};
use crate::controller::events::{UiError, UiErrorCategory, UiErrorContext, UiEvent};

pub fn launch(
    service: Arc<dyn ItineraryService>,
    export_dir: PathBuf,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::new(
                    UiErrorCategory::Io,
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            health::spawn_reachability_check(Arc::clone(&service));
            let _ = ui_tx.try_send(UiEvent::Info(format!(
                "Ready. Itinerary service: {}",
                service.base_url()
            )));

            while let Ok(cmd) = cmd_rx.recv() {
                process_command(service.as_ref(), &export_dir, cmd, &ui_tx).await;
            }
            info!("ui command queue closed; backend worker exiting");
        });
    })
}

async fn process_command(
    service: &dyn ItineraryService,
    export_dir: &Path,
    cmd: BackendCommand,
    ui_tx: &Sender<UiEvent>,
) {
    match cmd {
        BackendCommand::GenerateItinerary { trip } => {
            debug!("backend: generate_itinerary");
            let guard = CompletionGuard::new(ui_tx, PendingKind::Generation);
            guard.complete(run_generation(service, &trip).await);
        }
        BackendCommand::ExportDocument { request } => {
            debug!("backend: export_document");
            let guard = CompletionGuard::new(ui_tx, PendingKind::Export);
            guard.complete(run_export(service, &request, export_dir).await);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum PendingKind {
    Generation,
    Export,
}

/// Guarantees the UI sees exactly one completion event per dispatched command,
/// even if the orchestrator unwinds before producing one.
struct CompletionGuard<'a> {
    ui_tx: &'a Sender<UiEvent>,
    kind: PendingKind,
    completed: bool,
}

impl<'a> CompletionGuard<'a> {
    fn new(ui_tx: &'a Sender<UiEvent>, kind: PendingKind) -> Self {
        Self {
            ui_tx,
            kind,
            completed: false,
        }
    }

    fn complete(mut self, event: UiEvent) {
        self.completed = true;
        deliver(self.ui_tx, event);
    }
}

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        error!(kind = ?self.kind, "backend request ended without a result");
        deliver(self.ui_tx, fallback_event(self.kind));
    }
}

fn fallback_event(kind: PendingKind) -> UiEvent {
    let message = "Backend request ended unexpectedly; please try again";
    match kind {
        PendingKind::Generation => UiEvent::GenerationFinished(Err(UiError::new(
            UiErrorCategory::Transport,
            UiErrorContext::Generation,
            message,
        ))),
        PendingKind::Export => UiEvent::ExportFinished(Err(UiError::new(
            UiErrorCategory::Transport,
            UiErrorContext::Export,
            message,
        ))),
    }
}

// Completion events block on a full queue; dropping one would leave the UI busy forever.
fn deliver(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    if ui_tx.send(event).is_err() {
        debug!("ui event receiver dropped; discarding backend event");
    }
}

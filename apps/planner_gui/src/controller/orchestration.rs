//! Command orchestration from UI actions to the backend command queue.

use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use client_core::{render, RenderedItinerary, RenderedLine};
use crossbeam_channel::{Sender, TrySendError};
use shared::domain::TripForm;
use tracing::{debug, warn};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{ErrorBanner, UiError, UiErrorCategory, UiErrorContext, UiEvent};
use crate::controller::reducer::{transition, Affordances, Effect, Event, Phase, Session};

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
) -> Result<(), UiError> {
    let (cmd_name, context) = match &cmd {
        BackendCommand::GenerateItinerary { .. } => {
            ("generate_itinerary", UiErrorContext::Generation)
        }
        BackendCommand::ExportDocument { .. } => ("export_document", UiErrorContext::Export),
    };

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            debug!(command = cmd_name, "queued ui->backend command");
            Ok(())
        }
        Err(TrySendError::Full(_)) => Err(UiError::new(
            UiErrorCategory::Transport,
            context,
            "UI command queue is full; please retry",
        )),
        Err(TrySendError::Disconnected(_)) => Err(UiError::new(
            UiErrorCategory::Transport,
            context,
            "Backend worker disconnected (possible startup/runtime failure); restart the app",
        )),
    }
}

pub struct DisplayedItinerary {
    pub rendered: RenderedItinerary,
    pub lines: Vec<RenderedLine>,
}

/// Owns the [`Session`] and is the only place it is mutated.
pub struct SessionController {
    session: Session,
    cmd_tx: Sender<BackendCommand>,
    banner: Option<ErrorBanner>,
    displayed: Option<DisplayedItinerary>,
    last_saved: Option<PathBuf>,
    status: String,
    error_display: Duration,
}

impl SessionController {
    pub fn new(cmd_tx: Sender<BackendCommand>, error_display: Duration) -> Self {
        Self {
            session: Session::default(),
            cmd_tx,
            banner: None,
            displayed: None,
            last_saved: None,
            status: String::new(),
            error_display,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    pub fn affordances(&self) -> Affordances {
        self.session.affordances()
    }

    pub fn banner(&self) -> Option<&ErrorBanner> {
        self.banner.as_ref()
    }

    pub fn displayed(&self) -> Option<&DisplayedItinerary> {
        self.displayed.as_ref()
    }

    pub fn last_saved(&self) -> Option<&Path> {
        self.last_saved.as_deref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn submit(&mut self, form: TripForm) {
        self.apply(Event::Submit(form));
        if self.session.phase == Phase::Submitting {
            self.apply(Event::BeginAwait);
        }
    }

    pub fn request_export(&mut self) {
        self.apply(Event::ExportRequested);
    }

    pub fn handle_ui_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Info(message) => self.status = message,
            UiEvent::Error(err) => self.show_error(err),
            UiEvent::GenerationFinished(Ok(result)) => {
                self.apply(Event::GenerationSucceeded(result))
            }
            UiEvent::GenerationFinished(Err(err)) => self.apply(Event::GenerationFailed(err)),
            UiEvent::ExportFinished(outcome) => self.apply(Event::ExportFinished(outcome)),
        }
    }

    pub fn expire_banner(&mut self, now: Instant) {
        if self
            .banner
            .as_ref()
            .is_some_and(|banner| banner.is_expired(now, self.error_display))
        {
            self.banner = None;
        }
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    fn apply(&mut self, event: Event) {
        let from = self.session.phase;
        let (next, effects) = transition(std::mem::take(&mut self.session), event);
        if next.phase != from {
            debug!(?from, to = ?next.phase, "session phase changed");
        }
        self.session = next;

        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::ClearError => self.banner = None,
            Effect::ShowError(err) => self.show_error(err),
            Effect::ClearDisplay => self.displayed = None,
            Effect::Display(result) => {
                let rendered = render(&result);
                let lines = rendered.lines();
                self.displayed = Some(DisplayedItinerary { rendered, lines });
            }
            Effect::DispatchGeneration(trip) => {
                let cmd = BackendCommand::GenerateItinerary { trip };
                if let Err(err) = dispatch_backend_command(&self.cmd_tx, cmd) {
                    self.apply(Event::GenerationFailed(err));
                }
            }
            Effect::DispatchExport(request) => {
                let cmd = BackendCommand::ExportDocument { request };
                if let Err(err) = dispatch_backend_command(&self.cmd_tx, cmd) {
                    self.apply(Event::ExportFinished(Err(err)));
                }
            }
            Effect::Saved(path) => {
                self.status = format!("Saved itinerary to {}", path.display());
                self.last_saved = Some(path);
            }
            Effect::Ignored(reason) => {
                debug!(reason, phase = ?self.session.phase, "ignored ui action");
            }
        }
    }

    fn show_error(&mut self, err: UiError) {
        warn!(
            category = ?err.category(),
            context = ?err.context(),
            "{}",
            err.message()
        );
        self.banner = Some(ErrorBanner::new(err, Instant::now()));
    }
}

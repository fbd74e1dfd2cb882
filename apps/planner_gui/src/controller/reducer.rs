//! Session state machine as a pure function: `(Session, Event) -> (Session, Vec<Effect>)`.
//!
//! Only the phase guard in here serializes generation and export; the
//! orchestrators never check whether another request is outstanding.

use std::path::PathBuf;

use shared::{
    domain::{validate_trip, ItineraryResult, TripForm, TripRequest},
    protocol::ExportRequest,
};

use crate::controller::events::UiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    AwaitingGeneration,
    GenerationSucceeded,
    GenerationFailed,
    Exporting,
}

impl Phase {
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            Phase::Submitting | Phase::AwaitingGeneration | Phase::Exporting
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub current_trip: Option<TripRequest>,
    /// Only `Some` when the last generation attempt for `current_trip` succeeded.
    pub current_result: Option<ItineraryResult>,
    pub phase: Phase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affordances {
    pub busy: bool,
    pub submit_enabled: bool,
    pub export_visible: bool,
    pub export_enabled: bool,
    pub exporting: bool,
}

impl Session {
    pub fn can_export(&self) -> bool {
        self.phase == Phase::GenerationSucceeded
            && self.current_trip.is_some()
            && self.current_result.is_some()
    }

    pub fn affordances(&self) -> Affordances {
        let has_result = self.current_trip.is_some() && self.current_result.is_some();
        match self.phase {
            Phase::Idle | Phase::GenerationFailed => Affordances {
                busy: false,
                submit_enabled: true,
                export_visible: false,
                export_enabled: false,
                exporting: false,
            },
            Phase::Submitting | Phase::AwaitingGeneration => Affordances {
                busy: true,
                submit_enabled: false,
                export_visible: false,
                export_enabled: false,
                exporting: false,
            },
            Phase::GenerationSucceeded => Affordances {
                busy: false,
                submit_enabled: true,
                export_visible: has_result,
                export_enabled: self.can_export(),
                exporting: false,
            },
            Phase::Exporting => Affordances {
                busy: false,
                submit_enabled: false,
                export_visible: true,
                export_enabled: false,
                exporting: true,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    Submit(TripForm),
    BeginAwait,
    GenerationSucceeded(ItineraryResult),
    GenerationFailed(UiError),
    ExportRequested,
    ExportFinished(Result<PathBuf, UiError>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ClearError,
    ShowError(UiError),
    ClearDisplay,
    Display(ItineraryResult),
    DispatchGeneration(TripRequest),
    DispatchExport(ExportRequest),
    Saved(PathBuf),
    Ignored(&'static str),
}

pub fn transition(session: Session, event: Event) -> (Session, Vec<Effect>) {
    match event {
        Event::Submit(form) => submit(session, &form),
        Event::BeginAwait => begin_await(session),
        Event::GenerationSucceeded(result) => generation_succeeded(session, result),
        Event::GenerationFailed(err) => generation_failed(session, err),
        Event::ExportRequested => export_requested(session),
        Event::ExportFinished(outcome) => export_finished(session, outcome),
    }
}

fn submit(mut session: Session, form: &TripForm) -> (Session, Vec<Effect>) {
    if session.phase.is_in_flight() {
        return (session, vec![Effect::Ignored("request already in flight")]);
    }

    match validate_trip(form) {
        Ok(trip) => {
            session.current_trip = Some(trip);
            session.current_result = None;
            session.phase = Phase::Submitting;
            (session, Vec::new())
        }
        Err(err) => (session, vec![Effect::ShowError(UiError::invalid_form(&err))]),
    }
}

fn begin_await(mut session: Session) -> (Session, Vec<Effect>) {
    if session.phase != Phase::Submitting {
        return (session, vec![Effect::Ignored("no submission to send")]);
    }
    let Some(trip) = session.current_trip.clone() else {
        session.phase = Phase::Idle;
        return (session, vec![Effect::Ignored("submission lost its trip")]);
    };

    session.phase = Phase::AwaitingGeneration;
    (
        session,
        vec![
            Effect::ClearError,
            Effect::ClearDisplay,
            Effect::DispatchGeneration(trip),
        ],
    )
}

fn generation_succeeded(mut session: Session, result: ItineraryResult) -> (Session, Vec<Effect>) {
    if session.phase != Phase::AwaitingGeneration {
        return (session, vec![Effect::Ignored("stale generation result")]);
    }

    session.current_result = Some(result.clone());
    session.phase = Phase::GenerationSucceeded;
    (session, vec![Effect::Display(result)])
}

fn generation_failed(mut session: Session, err: UiError) -> (Session, Vec<Effect>) {
    if session.phase != Phase::AwaitingGeneration {
        return (session, vec![Effect::Ignored("stale generation failure")]);
    }

    session.current_result = None;
    session.phase = Phase::GenerationFailed;
    (session, vec![Effect::ClearDisplay, Effect::ShowError(err)])
}

fn export_requested(mut session: Session) -> (Session, Vec<Effect>) {
    match session.phase {
        Phase::Submitting | Phase::AwaitingGeneration | Phase::Exporting => {
            (session, vec![Effect::Ignored("request already in flight")])
        }
        Phase::Idle | Phase::GenerationFailed => {
            (session, vec![Effect::ShowError(UiError::no_itinerary())])
        }
        Phase::GenerationSucceeded => {
            let request = match (&session.current_trip, &session.current_result) {
                (Some(trip), Some(result)) => ExportRequest::new(trip.clone(), result),
                _ => return (session, vec![Effect::ShowError(UiError::no_itinerary())]),
            };
            session.phase = Phase::Exporting;
            (session, vec![Effect::DispatchExport(request)])
        }
    }
}

fn export_finished(
    mut session: Session,
    outcome: Result<PathBuf, UiError>,
) -> (Session, Vec<Effect>) {
    if session.phase != Phase::Exporting {
        return (session, vec![Effect::Ignored("stale export outcome")]);
    }

    session.phase = Phase::GenerationSucceeded;
    let effect = match outcome {
        Ok(path) => Effect::Saved(path),
        Err(err) => Effect::ShowError(err),
    };
    (session, vec![effect])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::events::{UiErrorCategory, UiErrorContext};

    fn paris_form() -> TripForm {
        TripForm {
            source: "NYC".into(),
            destination: "Paris".into(),
            dates: "2024-06-01".into(),
            travelers: "2".into(),
            interests: "art".into(),
        }
    }

    fn run(session: Session, events: Vec<Event>) -> (Session, Vec<Effect>) {
        events
            .into_iter()
            .fold((session, Vec::new()), |(session, mut effects), event| {
                let (next, new_effects) = transition(session, event);
                effects.extend(new_effects);
                (next, effects)
            })
    }

    fn succeeded_session() -> Session {
        let (session, _) = run(
            Session::default(),
            vec![
                Event::Submit(paris_form()),
                Event::BeginAwait,
                Event::GenerationSucceeded(ItineraryResult::new("# Paris\nVisit art")),
            ],
        );
        assert_eq!(session.phase, Phase::GenerationSucceeded);
        session
    }

    fn transport_error() -> UiError {
        UiError::new(
            UiErrorCategory::Transport,
            UiErrorContext::Generation,
            "service unreachable",
        )
    }

    #[test]
    fn valid_submission_moves_through_submitting_to_awaiting() {
        let (session, effects) = transition(Session::default(), Event::Submit(paris_form()));
        assert_eq!(session.phase, Phase::Submitting);
        assert!(effects.is_empty());

        let (session, effects) = transition(session, Event::BeginAwait);
        assert_eq!(session.phase, Phase::AwaitingGeneration);
        let trip = session.current_trip.clone().expect("trip staged");
        assert_eq!(
            effects,
            vec![
                Effect::ClearError,
                Effect::ClearDisplay,
                Effect::DispatchGeneration(trip),
            ]
        );

        let affordances = session.affordances();
        assert!(affordances.busy);
        assert!(!affordances.submit_enabled);
        assert!(!affordances.export_visible);
    }

    #[test]
    fn invalid_submission_shows_error_without_dispatch() {
        let mut form = paris_form();
        form.travelers = "0".into();
        let (session, effects) = transition(Session::default(), Event::Submit(form));
        assert_eq!(session.phase, Phase::Idle);
        assert!(session.current_trip.is_none());
        assert!(matches!(
            effects.as_slice(),
            [Effect::ShowError(err)] if err.category() == UiErrorCategory::Validation
        ));
    }

    #[test]
    fn success_stores_result_and_displays_it_once() {
        let (session, effects) = run(
            Session::default(),
            vec![
                Event::Submit(paris_form()),
                Event::BeginAwait,
                Event::GenerationSucceeded(ItineraryResult::new("# Paris")),
            ],
        );
        assert_eq!(
            session.current_result,
            Some(ItineraryResult::new("# Paris"))
        );
        let displays = effects
            .iter()
            .filter(|effect| matches!(effect, Effect::Display(_)))
            .count();
        assert_eq!(displays, 1);
        assert!(session.can_export());
        assert!(session.affordances().export_visible);
    }

    #[test]
    fn failure_hides_export_and_reenables_submission() {
        let (session, effects) = run(
            Session::default(),
            vec![
                Event::Submit(paris_form()),
                Event::BeginAwait,
                Event::GenerationFailed(transport_error()),
            ],
        );
        assert_eq!(session.phase, Phase::GenerationFailed);
        assert!(session.current_result.is_none());
        assert!(effects.contains(&Effect::ShowError(transport_error())));

        let affordances = session.affordances();
        assert!(affordances.submit_enabled);
        assert!(!affordances.export_visible);
        assert!(!affordances.busy);
    }

    #[test]
    fn second_submission_while_awaiting_is_ignored() {
        let (session, _) = run(
            Session::default(),
            vec![Event::Submit(paris_form()), Event::BeginAwait],
        );
        let before = session.clone();

        let mut other = paris_form();
        other.destination = "Rome".into();
        let (session, effects) = run(session, vec![Event::Submit(other), Event::BeginAwait]);

        assert_eq!(session, before);
        assert!(effects
            .iter()
            .all(|effect| matches!(effect, Effect::Ignored(_))));
    }

    #[test]
    fn export_without_prior_success_is_rejected_without_dispatch() {
        let (_, effects) = transition(Session::default(), Event::ExportRequested);
        assert_eq!(effects, vec![Effect::ShowError(UiError::no_itinerary())]);

        let (failed, _) = run(
            Session::default(),
            vec![
                Event::Submit(paris_form()),
                Event::BeginAwait,
                Event::GenerationFailed(transport_error()),
            ],
        );
        let (session, effects) = transition(failed, Event::ExportRequested);
        assert_eq!(session.phase, Phase::GenerationFailed);
        assert_eq!(effects, vec![Effect::ShowError(UiError::no_itinerary())]);
    }

    #[test]
    fn export_carries_trip_and_unmodified_itinerary() {
        let (session, effects) = transition(succeeded_session(), Event::ExportRequested);
        assert_eq!(session.phase, Phase::Exporting);
        let [Effect::DispatchExport(request)] = effects.as_slice() else {
            panic!("expected a single export dispatch, got {effects:?}");
        };
        assert_eq!(request.trip.destination, "Paris");
        assert_eq!(request.itinerary, "# Paris\nVisit art");

        let affordances = session.affordances();
        assert!(affordances.export_visible);
        assert!(!affordances.export_enabled);
        assert!(affordances.exporting);
        assert!(!affordances.submit_enabled);
    }

    #[test]
    fn export_failure_keeps_itinerary_and_export_affordance() {
        let export_error = UiError::new(
            UiErrorCategory::HttpStatus,
            UiErrorContext::Export,
            "Error exporting document: HTTP error! status: 500",
        );
        let (session, effects) = run(
            succeeded_session(),
            vec![
                Event::ExportRequested,
                Event::ExportFinished(Err(export_error.clone())),
            ],
        );
        assert_eq!(session.phase, Phase::GenerationSucceeded);
        assert_eq!(
            session.current_result,
            Some(ItineraryResult::new("# Paris\nVisit art"))
        );
        assert_eq!(effects.last(), Some(&Effect::ShowError(export_error)));
        assert!(session.affordances().export_enabled);
    }

    #[test]
    fn export_success_reports_saved_path() {
        let path = PathBuf::from("/tmp/travel_plan_Paris.pdf");
        let (session, effects) = run(
            succeeded_session(),
            vec![
                Event::ExportRequested,
                Event::ExportFinished(Ok(path.clone())),
            ],
        );
        assert_eq!(session.phase, Phase::GenerationSucceeded);
        assert_eq!(effects.last(), Some(&Effect::Saved(path)));
    }

    #[test]
    fn export_and_submit_are_ignored_while_exporting() {
        let (exporting, _) = transition(succeeded_session(), Event::ExportRequested);
        let (session, effects) = run(
            exporting.clone(),
            vec![Event::ExportRequested, Event::Submit(paris_form())],
        );
        assert_eq!(session, exporting);
        assert!(effects
            .iter()
            .all(|effect| matches!(effect, Effect::Ignored(_))));
    }

    #[test]
    fn resubmission_replaces_trip_and_clears_previous_result() {
        let mut rome = paris_form();
        rome.destination = "Rome".into();
        let (session, _) = transition(succeeded_session(), Event::Submit(rome));
        assert_eq!(session.phase, Phase::Submitting);
        assert_eq!(
            session.current_trip.as_ref().map(|trip| trip.destination.as_str()),
            Some("Rome")
        );
        assert!(session.current_result.is_none());
    }

    #[test]
    fn stale_outcomes_never_mutate_the_session() {
        let session = succeeded_session();
        let (after, effects) = run(
            session.clone(),
            vec![
                Event::GenerationSucceeded(ItineraryResult::new("other")),
                Event::GenerationFailed(transport_error()),
                Event::ExportFinished(Ok(PathBuf::from("x.pdf"))),
                Event::BeginAwait,
            ],
        );
        assert_eq!(after, session);
        assert!(effects
            .iter()
            .all(|effect| matches!(effect, Effect::Ignored(_))));
    }
}

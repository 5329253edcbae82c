mod common;

use common::{ScriptedTransport, Shouting};
use core_actions::{Action, DispatchOutcome, FormatDispatcher, dispatch_action};
use core_format::FormatKind;
use core_state::{SessionState, VersionCounter};
use core_transport::{ReformatResponse, TransportError};

fn session_with(text: &str) -> SessionState {
    let mut state = SessionState::new();
    state.set_buffer(text);
    state
}

#[tokio::test]
async fn first_dispatch_bootstraps_original_and_result() {
    let transport = ScriptedTransport::new().then_ok("Hello world", FormatKind::Grammar);
    let mut state = session_with("helo wrold");
    let mut dispatcher = FormatDispatcher::new();

    let out = dispatcher
        .dispatch(&mut state, &transport, FormatKind::Grammar)
        .await;
    assert_eq!(
        out,
        DispatchOutcome::Applied {
            format: FormatKind::Grammar,
            index: 1
        }
    );

    let view = state.view();
    assert_eq!(view.buffer, "Hello world");
    assert_eq!(view.history_len, 2);
    assert_eq!(view.counter, Some(VersionCounter { position: 2, total: 2 }));
    assert_eq!(view.counter.map(|c| c.to_string()).as_deref(), Some("v2"));
    assert_eq!(view.current_format, Some(FormatKind::Grammar));
    assert!(!view.pending);

    dispatch_action(Action::PreviousVersion, &mut state, &[]);
    let view = state.view();
    assert_eq!(view.buffer, "helo wrold");
    assert_eq!(view.counter.map(|c| c.to_string()).as_deref(), Some("v1"));
    assert_eq!(view.current_format, None);
    assert!(!view.can_previous);
    assert!(view.can_next);

    let seen = transport.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].text, "helo wrold");
    assert_eq!(seen[0].requested(), FormatKind::Grammar);
}

#[tokio::test]
async fn later_dispatch_appends_result_only() {
    let mut state = session_with("hi there");
    let mut dispatcher = FormatDispatcher::new();
    dispatcher
        .dispatch(&mut state, &Shouting, FormatKind::Improve)
        .await;
    let out = dispatcher
        .dispatch(&mut state, &Shouting, FormatKind::Emoji)
        .await;
    assert_eq!(
        out,
        DispatchOutcome::Applied {
            format: FormatKind::Emoji,
            index: 2
        }
    );
    let texts: Vec<_> = state.history().versions().iter().map(|v| v.text()).collect();
    assert_eq!(texts, ["hi there", "HI THERE", "HI THERE"]);
    assert_eq!(dispatcher.telemetry().applied, 2);
}

#[tokio::test]
async fn response_format_wins_over_requested() {
    let transport = ScriptedTransport::new().then_ok("Dear Sir", FormatKind::Formality);
    let mut state = session_with("hey dude");
    let mut dispatcher = FormatDispatcher::new();
    let out = dispatcher
        .dispatch(&mut state, &transport, FormatKind::Grammar)
        .await;
    assert_eq!(
        out,
        DispatchOutcome::Applied {
            format: FormatKind::Formality,
            index: 1
        }
    );
    assert_eq!(state.current_format(), Some(FormatKind::Formality));
}

#[tokio::test]
async fn empty_payload_changes_nothing() {
    let transport = ScriptedTransport::new()
        .then_empty()
        .then_ok("", FormatKind::Grammar);
    let mut state = session_with("keep me");
    let mut dispatcher = FormatDispatcher::new();

    for _ in 0..2 {
        let out = dispatcher
            .dispatch(&mut state, &transport, FormatKind::Grammar)
            .await;
        assert_eq!(out, DispatchOutcome::Empty);
    }
    assert_eq!(state.buffer(), "keep me");
    assert!(state.history().is_empty());
    assert!(!state.is_pending());
    assert_eq!(state.status().last_error, None);
    assert_eq!(dispatcher.telemetry().empty, 2);
}

#[tokio::test]
async fn failure_is_recorded_and_slot_released() {
    let transport = ScriptedTransport::new()
        .then_err(TransportError::Rejected {
            message: "quota".into(),
            code: Some("TOO_MANY_REQUESTS".into()),
        })
        .then_ok("Fixed", FormatKind::Grammar);
    let mut state = session_with("fixd");
    let mut dispatcher = FormatDispatcher::new();

    let out = dispatcher
        .dispatch(&mut state, &transport, FormatKind::Grammar)
        .await;
    let DispatchOutcome::Failed(info) = out else {
        panic!("expected failure, got {out:?}");
    };
    assert_eq!(info.requested, FormatKind::Grammar);
    assert!(info.message.contains("quota"));
    assert_eq!(state.status().last_error.as_ref(), Some(&info));
    assert!(!state.is_pending());
    assert!(state.history().is_empty());
    assert_eq!(state.buffer(), "fixd");

    // A retry is a fresh dispatch and clears the recorded error.
    let out = dispatcher
        .dispatch(&mut state, &transport, FormatKind::Grammar)
        .await;
    assert!(matches!(out, DispatchOutcome::Applied { .. }));
    assert_eq!(state.status().last_error, None);
    assert_eq!(dispatcher.telemetry().failed, 1);
}

#[test]
fn second_trigger_while_pending_never_reaches_transport() {
    let mut state = session_with("text");
    let mut dispatcher = FormatDispatcher::new();
    let ticket = dispatcher.begin(&mut state, FormatKind::Condense).unwrap();

    assert!(dispatcher.begin(&mut state, FormatKind::Emoji).is_err());
    assert!(dispatcher.begin(&mut state, FormatKind::Condense).is_err());

    let out = dispatcher.complete(
        &mut state,
        ticket,
        Ok(ReformatResponse::formatted("txt", FormatKind::Condense)),
    );
    assert!(matches!(out, DispatchOutcome::Applied { .. }));
    assert_eq!(state.history().len(), 2);
    let t = dispatcher.telemetry();
    assert_eq!((t.issued, t.rejected, t.applied), (1, 2, 1));
}

#[tokio::test]
async fn one_shot_dispatch_reports_rejected_when_busy() {
    let transport = ScriptedTransport::new().then_ok("x", FormatKind::Grammar);
    let mut state = session_with("text");
    let mut dispatcher = FormatDispatcher::new();
    let _ticket = dispatcher.begin(&mut state, FormatKind::Grammar).unwrap();
    let out = dispatcher
        .dispatch(&mut state, &transport, FormatKind::Grammar)
        .await;
    assert_eq!(out, DispatchOutcome::Rejected);
    assert_eq!(transport.calls(), 0);
}

#[test]
fn clean_while_pending_discards_the_result() {
    let mut state = session_with("draft");
    let mut dispatcher = FormatDispatcher::new();
    let ticket = dispatcher.begin(&mut state, FormatKind::Grammar).unwrap();

    dispatch_action(Action::Clean, &mut state, &[]);
    assert!(state.is_pending(), "in-flight request keeps the slot");
    assert!(dispatcher.begin(&mut state, FormatKind::Grammar).is_err());

    let out = dispatcher.complete(
        &mut state,
        ticket,
        Ok(ReformatResponse::formatted("Draft", FormatKind::Grammar)),
    );
    assert_eq!(out, DispatchOutcome::Discarded);
    assert_eq!(state.buffer(), "");
    assert!(state.history().is_empty());
    assert!(!state.is_pending());
    assert_eq!(dispatcher.telemetry().discarded, 1);
}

#[test]
fn hand_edit_while_pending_is_overwritten_by_result() {
    let mut state = session_with("first");
    let mut dispatcher = FormatDispatcher::new();
    let ticket = dispatcher.begin(&mut state, FormatKind::Improve).unwrap();
    dispatch_action(Action::Edit("first, edited".into()), &mut state, &[]);

    dispatcher.complete(
        &mut state,
        ticket,
        Ok(ReformatResponse::formatted("First.", FormatKind::Improve)),
    );
    let texts: Vec<_> = state.history().versions().iter().map(|v| v.text()).collect();
    assert_eq!(texts, ["first", "First."]);
    assert_eq!(state.buffer(), "First.");
}

#[tokio::test]
async fn palette_and_chord_requests_are_equivalent() {
    async fn run(trigger: Action) -> (Vec<String>, Option<FormatKind>) {
        let mut state = session_with("hello");
        let mut dispatcher = FormatDispatcher::new();
        if matches!(trigger, Action::PaletteSelect(_)) {
            dispatch_action(Action::PaletteOpen, &mut state, &[]);
        }
        let res = dispatch_action(trigger, &mut state, &[]);
        let kind = res.request.expect("trigger names a format");
        dispatcher.dispatch(&mut state, &Shouting, kind).await;
        let texts = state
            .history()
            .versions()
            .iter()
            .map(|v| v.text().to_string())
            .collect();
        (texts, state.current_format())
    }

    let by_chord = run(Action::Format(FormatKind::Translate)).await;
    let by_palette = run(Action::PaletteSelect(FormatKind::Translate)).await;
    assert_eq!(by_chord, by_palette);
    assert_eq!(by_chord.1, Some(FormatKind::Translate));
}

#[tokio::test]
async fn edit_after_format_disables_navigation_until_next_success() {
    let mut state = session_with("one");
    let mut dispatcher = FormatDispatcher::new();
    dispatcher
        .dispatch(&mut state, &Shouting, FormatKind::Grammar)
        .await;
    dispatch_action(Action::Edit("ONE!".into()), &mut state, &[]);

    let res = dispatch_action(Action::PreviousVersion, &mut state, &[]);
    assert!(!res.dirty);
    assert_eq!(state.buffer(), "ONE!");
    assert_eq!(state.view().counter, None);

    dispatcher
        .dispatch(&mut state, &Shouting, FormatKind::Grammar)
        .await;
    assert_eq!(state.history().len(), 3);
    assert!(state.view().can_previous);
}

use alt_core::editor::{allowed_transitions, validate_transition, SessionState};
use proptest::prelude::*;

fn any_state() -> impl Strategy<Value = SessionState> {
    prop_oneof![
        Just(SessionState::Idle),
        Just(SessionState::Resolving),
        Just(SessionState::Editing),
        Just(SessionState::Saving),
        Just(SessionState::Succeeded),
        Just(SessionState::Failed),
    ]
}

#[test]
fn test_resolving_transitions() {
    assert!(validate_transition(SessionState::Resolving, SessionState::Editing).is_ok());
    assert!(validate_transition(SessionState::Resolving, SessionState::Failed).is_ok());
    assert!(validate_transition(SessionState::Resolving, SessionState::Idle).is_ok());

    assert!(validate_transition(SessionState::Resolving, SessionState::Succeeded).is_err());
}

#[test]
fn test_succeeded_only_closes() {
    assert_eq!(allowed_transitions(SessionState::Succeeded), &[SessionState::Idle]);
}

#[test]
fn test_every_state_can_reach_idle() {
    for state in [
        SessionState::Resolving,
        SessionState::Editing,
        SessionState::Saving,
        SessionState::Succeeded,
        SessionState::Failed,
    ] {
        assert!(validate_transition(state, SessionState::Idle).is_ok(), "{state:?}");
    }
}

proptest! {
    #[test]
    fn prop_validation_agrees_with_table(from in any_state(), to in any_state()) {
        let allowed = allowed_transitions(from);
        prop_assert_eq!(validate_transition(from, to).is_ok(), allowed.contains(&to));
    }

    #[test]
    fn prop_no_self_loops(state in any_state()) {
        prop_assert!(validate_transition(state, state).is_err());
    }
}

use super::*;

fn four_steps() -> StepSequencer {
    StepSequencer::new(["Create", "Upload", "Review", "Summary"]).expect("sequencer")
}

#[test]
fn starts_on_first_step() {
    let seq = four_steps();
    assert_eq!(seq.current(), 1);
    assert_eq!(seq.current_step().label, "Create");
    assert!(seq.is_first());
    assert!(!seq.is_last());
}

#[test]
fn rejects_empty_step_list() {
    let err = StepSequencer::new(Vec::<String>::new()).expect_err("no steps");
    assert_eq!(err, WorkflowError::NoSteps);
}

#[test]
fn retreat_at_first_step_stays_put() {
    let mut seq = four_steps();
    assert_eq!(seq.retreat(), Movement::AtBoundary);
    assert_eq!(seq.current(), 1);
}

#[test]
fn advance_at_last_step_stays_put() {
    let mut seq = four_steps();
    for _ in 0..3 {
        assert!(seq.advance().moved());
    }
    assert_eq!(seq.current(), 4);
    assert_eq!(seq.advance(), Movement::AtBoundary);
    assert_eq!(seq.current(), 4);
}

#[test]
fn gated_advance_keeps_cursor() {
    let mut seq = four_steps();
    seq.advance();
    assert_eq!(seq.advance_if(|_| false), Movement::Gated);
    assert_eq!(seq.current(), 2);
}

#[test]
fn gate_sees_current_step() {
    let mut seq = four_steps();
    let mut seen = None;
    let movement = seq.advance_if(|step| {
        seen = Some(step.ordinal);
        true
    });
    assert_eq!(movement, Movement::Moved { from: 1, to: 2 });
    assert_eq!(seen, Some(1));
}

#[test]
fn retreat_is_never_gated() {
    let mut seq = four_steps();
    seq.advance();
    seq.advance();
    assert_eq!(seq.retreat(), Movement::Moved { from: 3, to: 2 });
    assert_eq!(seq.current(), 2);
}

#[test]
fn ratios_track_cursor() {
    let mut seq = four_steps();
    assert_eq!(seq.traversed_ratio(), 0.0);
    assert_eq!(seq.reached_ratio(), 0.25);
    seq.advance();
    seq.advance();
    seq.advance();
    assert_eq!(seq.traversed_ratio(), 1.0);
    assert_eq!(seq.reached_ratio(), 1.0);
}

#[test]
fn single_step_flow_is_both_first_and_last() {
    let mut seq = StepSequencer::new(["Only"]).expect("sequencer");
    assert!(seq.is_first() && seq.is_last());
    assert_eq!(seq.advance(), Movement::AtBoundary);
    assert_eq!(seq.retreat(), Movement::AtBoundary);
    assert_eq!(seq.traversed_ratio(), 1.0);
}

#[test]
fn descriptions_are_kept() {
    let seq = StepSequencer::with_descriptions([
        ("Sample Overview", "Review sample selection and rationale"),
        ("Document Review", "Verify required documentation"),
    ])
    .expect("sequencer");
    assert_eq!(seq.len(), 2);
    assert_eq!(
        seq.steps()[1].description.as_deref(),
        Some("Verify required documentation")
    );
}

use super::*;
use chrono::NaiveDate;
use shared::{domain::RiskTier, error::ErrorCode, protocol::DocumentAdvisory};

use crate::ledger::demo_evidence;

fn wizard() -> AuditWizard {
    AuditWizard::new(
        AuditCatalog::default(),
        DocumentPolicy::default(),
        ReviewLedger::new(demo_evidence()).expect("demo evidence"),
    )
}

fn fill_draft(wizard: &mut AuditWizard) {
    for action in [
        WizardAction::SetAuditName {
            name: "NCQA Accreditation 2024".into(),
        },
        WizardAction::SetFramework {
            framework: "ncqa".into(),
        },
        WizardAction::ToggleArea {
            area: "credentialing".into(),
        },
        WizardAction::SetDueDate {
            due_date: NaiveDate::from_ymd_opt(2024, 12, 31).expect("date"),
        },
    ] {
        assert_eq!(wizard.apply(action), WizardEvent::DraftUpdated);
    }
}

fn attach(wizard: &mut AuditWizard) -> WizardEvent {
    wizard.apply(WizardAction::AttachDocument {
        name: "Credentialing_Policy.pdf".into(),
        size_bytes: 2_621_440,
        mime_type: "application/pdf".into(),
    })
}

fn at_summary_step() -> AuditWizard {
    let mut wizard = wizard();
    fill_draft(&mut wizard);
    wizard.next();
    attach(&mut wizard);
    wizard.next();
    review_all(&mut wizard);
    wizard.next();
    assert!(wizard.sequencer().is_last());
    wizard
}

fn refusal(event: WizardEvent) -> WorkflowErrorBody {
    match event {
        WizardEvent::Rejected(body) => body,
        other => panic!("expected a refusal, got {other:?}"),
    }
}

fn review_all(wizard: &mut AuditWizard) {
    for id in ["e1", "e2", "e3"] {
        wizard.apply(WizardAction::Approve {
            item_id: ItemId::new(id),
            comment: None,
        });
    }
    wizard.apply(WizardAction::Reject {
        item_id: ItemId::new("e4"),
        comment: Some("contract expires before audit period".into()),
    });
}

#[test]
fn next_is_gated_until_draft_is_complete() {
    let mut wizard = wizard();
    assert!(!wizard.can_advance());
    assert_eq!(
        wizard.apply(WizardAction::Next),
        WizardEvent::StepHeld {
            step: 1,
            hold: StepHold::Gated
        }
    );

    fill_draft(&mut wizard);
    assert!(wizard.can_advance());
    assert_eq!(
        wizard.apply(WizardAction::Next),
        WizardEvent::StepChanged { from: 1, to: 2 }
    );
}

#[test]
fn upload_step_needs_a_document() {
    let mut wizard = wizard();
    fill_draft(&mut wizard);
    wizard.next();

    assert_eq!(wizard.next(), Movement::Gated);
    match attach(&mut wizard) {
        WizardEvent::DocumentAttached {
            document,
            advisories,
        } => {
            assert_eq!(document.size, "2.5 MB");
            assert!(advisories.is_empty());
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(
        wizard.apply(WizardAction::RemoveDocument),
        WizardEvent::DocumentRemoved
    );
    assert_eq!(wizard.next(), Movement::Gated);
    attach(&mut wizard);
    assert_eq!(wizard.next(), Movement::Moved { from: 2, to: 3 });
}

#[test]
fn unsupported_document_is_attached_with_advisory() {
    let mut wizard = wizard();
    fill_draft(&mut wizard);
    wizard.next();
    let event = wizard.apply(WizardAction::AttachDocument {
        name: "export.csv".into(),
        size_bytes: 10,
        mime_type: "text/csv".into(),
    });
    match event {
        WizardEvent::DocumentAttached { advisories, .. } => {
            assert_eq!(advisories, vec![DocumentAdvisory::UnsupportedExtension]);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(wizard.document().is_some());
}

#[test]
fn review_step_needs_every_item_decided() {
    let mut wizard = wizard();
    fill_draft(&mut wizard);
    wizard.next();
    attach(&mut wizard);
    wizard.next();
    assert_eq!(wizard.current_step(), 3);

    wizard.apply(WizardAction::Approve {
        item_id: ItemId::new("e1"),
        comment: None,
    });
    assert_eq!(wizard.next(), Movement::Gated);

    review_all(&mut wizard);
    assert_eq!(
        wizard.apply(WizardAction::Reset {
            item_id: ItemId::new("e2")
        }),
        WizardEvent::ItemStatusChanged {
            item_id: ItemId::new("e2"),
            status: ReviewStatus::Pending
        }
    );
    assert_eq!(wizard.next(), Movement::Gated);
    wizard.apply(WizardAction::Approve {
        item_id: ItemId::new("e2"),
        comment: None,
    });
    assert_eq!(wizard.next(), Movement::Moved { from: 3, to: 4 });
}

#[test]
fn unknown_item_is_reported_but_harmless() {
    let mut wizard = wizard();
    fill_draft(&mut wizard);
    wizard.next();
    attach(&mut wizard);
    wizard.next();
    let event = wizard.apply(WizardAction::Approve {
        item_id: ItemId::new("nope"),
        comment: Some("x".into()),
    });
    assert_eq!(
        event,
        WizardEvent::ItemNotFound {
            item_id: ItemId::new("nope")
        }
    );
    assert_eq!(wizard.ledger().pending_count(), 4);
}

#[test]
fn back_is_never_gated_and_keeps_state() {
    let mut wizard = wizard();
    fill_draft(&mut wizard);
    wizard.next();
    assert_eq!(
        wizard.apply(WizardAction::Back),
        WizardEvent::StepChanged { from: 2, to: 1 }
    );
    assert_eq!(
        wizard.apply(WizardAction::Back),
        WizardEvent::StepHeld {
            step: 1,
            hold: StepHold::Boundary
        }
    );
    assert_eq!(wizard.draft().name, "NCQA Accreditation 2024");
}

#[test]
fn complete_before_final_step_is_rejected() {
    let mut wizard = wizard();
    match wizard.apply(WizardAction::Complete) {
        WizardEvent::Rejected(body) => assert_eq!(body.code, ErrorCode::InvalidState),
        other => panic!("unexpected event {other:?}"),
    }
    assert!(wizard.summary().is_none());
}

#[test]
fn full_walkthrough_produces_summary() {
    let mut wizard = wizard();
    fill_draft(&mut wizard);
    wizard.next();
    attach(&mut wizard);
    wizard.next();
    review_all(&mut wizard);
    wizard.next();
    assert!(wizard.sequencer().is_last());
    assert_eq!(
        wizard.apply(WizardAction::Next),
        WizardEvent::StepHeld {
            step: 4,
            hold: StepHold::Boundary
        }
    );

    wizard.apply(WizardAction::SetFinalComments {
        comments: "Follow up on ABC Clinic contract.".into(),
    });
    let summary = wizard.complete().expect("complete").clone();
    assert_eq!(summary.name, "NCQA Accreditation 2024");
    assert_eq!(summary.framework, "ncqa");
    assert_eq!(summary.total_items, 4);
    assert_eq!(summary.approved_items, 3);
    assert_eq!(summary.rejected_items, 1);
    assert_eq!(summary.compliance_percentage, 75);
    assert_eq!(summary.risk_tier, RiskTier::Medium);
    assert_eq!(summary.final_comments, "Follow up on ABC Clinic contract.");
    assert_eq!(
        summary.document.as_ref().map(|doc| doc.name.as_str()),
        Some("Credentialing_Policy.pdf")
    );

    assert_eq!(wizard.current_step(), 4);
    assert_eq!(wizard.complete(), Err(WorkflowError::AlreadyCompleted));
}

#[test]
fn edits_from_earlier_steps_are_refused_on_the_summary() {
    let mut wizard = at_summary_step();

    let body = refusal(wizard.apply(WizardAction::Reset {
        item_id: ItemId::new("e1"),
    }));
    assert_eq!(body.code, ErrorCode::InvalidState);
    assert_eq!(
        body.message,
        WorkflowError::WrongStep { step: 3, current: 4 }.to_string()
    );
    refusal(wizard.apply(WizardAction::RemoveDocument));
    refusal(wizard.apply(WizardAction::SetAuditName { name: String::new() }));

    assert!(wizard.ledger().all_reviewed());
    assert!(wizard.document().is_some());
    assert_eq!(wizard.draft().name, "NCQA Accreditation 2024");

    match wizard.apply(WizardAction::Complete) {
        WizardEvent::Completed(summary) => {
            assert_eq!(summary.approved_items, 3);
            assert!(summary.document.is_some());
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn going_back_to_undo_a_review_blocks_the_summary() {
    let mut wizard = at_summary_step();
    wizard.back();
    wizard.apply(WizardAction::Reset {
        item_id: ItemId::new("e1"),
    });
    assert!(!wizard.ledger().all_reviewed());
    assert_eq!(wizard.next(), Movement::Gated);
    assert!(matches!(
        wizard.complete(),
        Err(WorkflowError::NotAtFinalStep { current: 3, .. })
    ));
}

#[test]
fn complete_rechecks_every_earlier_gate() {
    let mut wizard = at_summary_step();
    wizard.ledger.reset_status(&ItemId::new("e2"));
    assert_eq!(
        wizard.complete(),
        Err(WorkflowError::IncompleteStep { step: 3 })
    );

    wizard.ledger.set_status(&ItemId::new("e2"), ReviewStatus::Approved, None);
    wizard.document = None;
    assert_eq!(
        wizard.complete(),
        Err(WorkflowError::IncompleteStep { step: 2 })
    );
    assert!(wizard.summary().is_none());
}

#[test]
fn edits_after_completion_are_refused() {
    let mut wizard = at_summary_step();
    wizard.complete().expect("complete");
    let body = refusal(wizard.apply(WizardAction::SetFinalComments {
        comments: "late".into(),
    }));
    assert_eq!(body.message, WorkflowError::AlreadyCompleted.to_string());
    assert_eq!(wizard.final_comments(), "");
}

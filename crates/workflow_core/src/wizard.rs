//! Four-step audit creation flow: Create Audit, Document Upload, Review
//! Document, Review Summary.

use chrono::Utc;
use shared::{
    domain::{AuditId, ItemId, ReviewStatus},
    error::{WorkflowError, WorkflowErrorBody},
    protocol::{AuditSummary, StepHold, WizardAction, WizardEvent},
};
use tracing::{debug, info};

use crate::{
    audit_setup::{AuditCatalog, AuditDraft},
    document::{AttachedDocument, DocumentPolicy},
    ledger::ReviewLedger,
    metrics::{self, DerivedMetrics},
    sequencer::{Movement, StepSequencer},
};

pub const WIZARD_STEPS: [&str; 4] = [
    "Create Audit",
    "Document Upload",
    "Review Document",
    "Review Summary",
];

pub struct AuditWizard {
    sequencer: StepSequencer,
    catalog: AuditCatalog,
    policy: DocumentPolicy,
    draft: AuditDraft,
    document: Option<AttachedDocument>,
    ledger: ReviewLedger,
    final_comments: String,
    completed: Option<AuditSummary>,
}

impl AuditWizard {
    pub fn new(catalog: AuditCatalog, policy: DocumentPolicy, ledger: ReviewLedger) -> Self {
        Self {
            sequencer: wizard_sequencer(),
            catalog,
            policy,
            draft: AuditDraft::default(),
            document: None,
            ledger,
            final_comments: String::new(),
            completed: None,
        }
    }

    pub fn current_step(&self) -> usize {
        self.sequencer.current()
    }

    pub fn sequencer(&self) -> &StepSequencer {
        &self.sequencer
    }

    pub fn catalog(&self) -> &AuditCatalog {
        &self.catalog
    }

    pub fn draft(&self) -> &AuditDraft {
        &self.draft
    }

    pub fn document(&self) -> Option<&AttachedDocument> {
        self.document.as_ref()
    }

    pub fn ledger(&self) -> &ReviewLedger {
        &self.ledger
    }

    pub fn final_comments(&self) -> &str {
        &self.final_comments
    }

    pub fn metrics(&self) -> DerivedMetrics {
        metrics::derive(&self.ledger)
    }

    pub fn summary(&self) -> Option<&AuditSummary> {
        self.completed.as_ref()
    }

    /// Completion predicate of `step`. The final step has none; leaving it
    /// is the caller's `complete` action.
    pub fn step_complete(&self, step: usize) -> bool {
        match step {
            1 => self.draft.is_complete(),
            2 => self.document.is_some(),
            3 => self.ledger.all_reviewed(),
            _ => false,
        }
    }

    pub fn can_advance(&self) -> bool {
        !self.sequencer.is_last() && self.step_complete(self.sequencer.current())
    }

    pub fn next(&mut self) -> Movement {
        let ready = self.step_complete(self.sequencer.current());
        self.sequencer.advance_if(|_| ready)
    }

    pub fn back(&mut self) -> Movement {
        self.sequencer.retreat()
    }

    pub fn complete(&mut self) -> Result<&AuditSummary, WorkflowError> {
        if self.completed.is_some() {
            return Err(WorkflowError::AlreadyCompleted);
        }
        if !self.sequencer.is_last() {
            return Err(WorkflowError::NotAtFinalStep {
                current: self.sequencer.current(),
                total: self.sequencer.len(),
            });
        }
        // Earlier steps stay editable after moving on, so re-check every gate.
        if let Some(step) = (1..self.sequencer.len()).find(|&step| !self.step_complete(step)) {
            return Err(WorkflowError::IncompleteStep { step });
        }

        let metrics = self.metrics();
        let summary = AuditSummary {
            audit_id: AuditId::generate(),
            name: self.draft.name.clone(),
            framework: self.draft.framework.clone().unwrap_or_default(),
            areas: self.draft.areas.clone(),
            due_date: self.draft.due_date,
            document: self.document.as_ref().map(|doc| doc.meta.clone()),
            total_items: self.ledger.len(),
            approved_items: self.ledger.approved_count(),
            rejected_items: self.ledger.rejected_count(),
            compliance_percentage: metrics.compliance_percentage,
            risk_tier: metrics.risk_tier,
            final_comments: self.final_comments.clone(),
            completed_at: Utc::now(),
        };
        info!(
            audit_id = %summary.audit_id,
            compliance = summary.compliance_percentage,
            risk = summary.risk_tier.label(),
            "audit review completed"
        );
        Ok(self.completed.insert(summary))
    }

    /// Applies one protocol action. Edits are accepted only on the step that
    /// owns them and never after completion.
    pub fn apply(&mut self, action: WizardAction) -> WizardEvent {
        if let Some(step) = owning_step(&action) {
            let refusal = if self.completed.is_some() {
                Some(WorkflowError::AlreadyCompleted)
            } else if step != self.sequencer.current() {
                Some(WorkflowError::WrongStep {
                    step,
                    current: self.sequencer.current(),
                })
            } else {
                None
            };
            if let Some(err) = refusal {
                debug!(error = %err, "wizard edit refused");
                return WizardEvent::Rejected(WorkflowErrorBody::from(&err));
            }
        }

        match action {
            WizardAction::SetAuditName { name } => {
                self.draft.name = name;
                WizardEvent::DraftUpdated
            }
            WizardAction::SetFramework { framework } => {
                self.draft.set_framework(&self.catalog, &framework);
                WizardEvent::DraftUpdated
            }
            WizardAction::ToggleArea { area } => {
                self.draft.toggle_area(&self.catalog, &area);
                WizardEvent::DraftUpdated
            }
            WizardAction::SetDueDate { due_date } => {
                self.draft.due_date = Some(due_date);
                WizardEvent::DraftUpdated
            }
            WizardAction::SetDescription { description } => {
                self.draft.description = description;
                WizardEvent::DraftUpdated
            }
            WizardAction::AttachDocument {
                name,
                size_bytes,
                mime_type,
            } => {
                let document = AttachedDocument::new(&self.policy, &name, size_bytes, &mime_type);
                let event = WizardEvent::DocumentAttached {
                    document: document.meta.clone(),
                    advisories: document.advisories.clone(),
                };
                self.document = Some(document);
                event
            }
            WizardAction::RemoveDocument => {
                self.document = None;
                WizardEvent::DocumentRemoved
            }
            WizardAction::Approve { item_id, comment } => {
                self.review(item_id, ReviewStatus::Approved, comment)
            }
            WizardAction::Reject { item_id, comment } => {
                self.review(item_id, ReviewStatus::Rejected, comment)
            }
            WizardAction::Reset { item_id } => self.review(item_id, ReviewStatus::Pending, None),
            WizardAction::SetFinalComments { comments } => {
                self.final_comments = comments;
                WizardEvent::DraftUpdated
            }
            WizardAction::Next => movement_event(self.next(), self.current_step()),
            WizardAction::Back => movement_event(self.back(), self.current_step()),
            WizardAction::Complete => match self.complete() {
                Ok(summary) => WizardEvent::Completed(Box::new(summary.clone())),
                Err(err) => WizardEvent::Rejected(WorkflowErrorBody::from(&err)),
            },
        }
    }

    fn review(&mut self, item_id: ItemId, status: ReviewStatus, comment: Option<String>) -> WizardEvent {
        if self.ledger.set_status(&item_id, status, comment.as_deref()) {
            WizardEvent::ItemStatusChanged { item_id, status }
        } else {
            WizardEvent::ItemNotFound { item_id }
        }
    }
}

/// Step whose screen carries the control for `action`; `None` for navigation.
fn owning_step(action: &WizardAction) -> Option<usize> {
    match action {
        WizardAction::SetAuditName { .. }
        | WizardAction::SetFramework { .. }
        | WizardAction::ToggleArea { .. }
        | WizardAction::SetDueDate { .. }
        | WizardAction::SetDescription { .. } => Some(1),
        WizardAction::AttachDocument { .. } | WizardAction::RemoveDocument => Some(2),
        WizardAction::Approve { .. } | WizardAction::Reject { .. } | WizardAction::Reset { .. } => {
            Some(3)
        }
        WizardAction::SetFinalComments { .. } => Some(4),
        WizardAction::Next | WizardAction::Back | WizardAction::Complete => None,
    }
}

fn wizard_sequencer() -> StepSequencer {
    match StepSequencer::new(WIZARD_STEPS) {
        Ok(sequencer) => sequencer,
        Err(_) => unreachable!("wizard step list is non-empty"),
    }
}

fn movement_event(movement: Movement, current: usize) -> WizardEvent {
    match movement {
        Movement::Moved { from, to } => WizardEvent::StepChanged { from, to },
        Movement::AtBoundary => WizardEvent::StepHeld {
            step: current,
            hold: StepHold::Boundary,
        },
        Movement::Gated => WizardEvent::StepHeld {
            step: current,
            hold: StepHold::Gated,
        },
    }
}

#[cfg(test)]
#[path = "tests/wizard_tests.rs"]
mod tests;

//! Sample testing workflow: a four-step walk through one audit sample with a
//! compliance checklist the reviewer ticks off.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use shared::domain::{ChecklistItemId, ChecklistStatus};

use crate::sequencer::{Movement, StepSequencer};

pub const SAMPLE_TESTING_STEPS: [(&str, &str); 4] = [
    ("Sample Overview", "Review sample selection and rationale"),
    ("Document Review", "Verify required documentation"),
    ("Compliance Testing", "Test against NCQA requirements"),
    ("Findings & Notes", "Document findings and recommendations"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: ChecklistItemId,
    pub label: String,
    pub required: bool,
    pub status: ChecklistStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSample {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub risk_level: String,
    pub selection_reason: String,
    pub testing_areas: Vec<String>,
    pub checklist: Vec<ChecklistItem>,
}

impl AuditSample {
    pub fn demo() -> Self {
        let checklist = [
            ("license", "Current medical license on file", true, ChecklistStatus::Complete),
            ("board", "Board certification verification", true, ChecklistStatus::Complete),
            ("malpractice", "Current malpractice insurance", true, ChecklistStatus::Issue),
            ("background", "Background check completed", true, ChecklistStatus::Complete),
            ("privileges", "Hospital privileges verification", false, ChecklistStatus::Complete),
            ("education", "Continuing education credits", true, ChecklistStatus::Pending),
        ]
        .into_iter()
        .map(|(id, label, required, status)| ChecklistItem {
            id: ChecklistItemId::new(id),
            label: label.into(),
            required,
            status,
        })
        .collect();

        Self {
            id: "PRV-2024-0156".into(),
            name: "Dr. Sarah Martinez, MD".into(),
            specialty: "Cardiology".into(),
            risk_level: "High".into(),
            selection_reason: "New provider with specialty credentials, high claim volume ($2.3M), recent license renewal".into(),
            testing_areas: [
                "License Verification",
                "Board Certification",
                "Malpractice Insurance",
                "Background Check",
                "Hospital Privileges",
                "Continuing Education",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            checklist,
        }
    }
}

pub struct SampleTestingWorkflow {
    sequencer: StepSequencer,
    sample: AuditSample,
    checked: HashSet<ChecklistItemId>,
    notes: String,
}

impl SampleTestingWorkflow {
    pub fn new(sample: AuditSample) -> Self {
        let sequencer = match StepSequencer::with_descriptions(SAMPLE_TESTING_STEPS) {
            Ok(sequencer) => sequencer,
            Err(_) => unreachable!("sample testing step list is non-empty"),
        };
        Self {
            sequencer,
            sample,
            checked: HashSet::new(),
            notes: String::new(),
        }
    }

    pub fn sample(&self) -> &AuditSample {
        &self.sample
    }

    pub fn sequencer(&self) -> &StepSequencer {
        &self.sequencer
    }

    /// Forward movement is never gated in this flow.
    pub fn next(&mut self) -> Movement {
        self.sequencer.advance()
    }

    pub fn back(&mut self) -> Movement {
        self.sequencer.retreat()
    }

    /// Records the reviewer's tick for a checklist row. Unknown ids are
    /// ignored.
    pub fn set_checked(&mut self, id: &ChecklistItemId, checked: bool) -> bool {
        if !self.sample.checklist.iter().any(|item| &item.id == id) {
            return false;
        }
        if checked {
            self.checked.insert(id.clone());
        } else {
            self.checked.remove(id);
        }
        true
    }

    pub fn is_checked(&self, id: &ChecklistItemId) -> bool {
        self.checked.contains(id)
    }

    pub fn checked_count(&self) -> usize {
        self.checked.len()
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Required rows whose verification is not complete.
    pub fn outstanding_required(&self) -> impl Iterator<Item = &ChecklistItem> {
        self.sample
            .checklist
            .iter()
            .filter(|item| item.required && item.status != ChecklistStatus::Complete)
    }

    pub fn issues(&self) -> impl Iterator<Item = &ChecklistItem> {
        self.sample
            .checklist
            .iter()
            .filter(|item| item.status == ChecklistStatus::Issue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow() -> SampleTestingWorkflow {
        SampleTestingWorkflow::new(AuditSample::demo())
    }

    #[test]
    fn next_is_free_but_clamped() {
        let mut flow = workflow();
        assert_eq!(flow.back(), Movement::AtBoundary);
        for expected in 2..=4 {
            assert_eq!(
                flow.next(),
                Movement::Moved {
                    from: expected - 1,
                    to: expected
                }
            );
        }
        assert_eq!(flow.next(), Movement::AtBoundary);
        assert_eq!(flow.sequencer().current_step().label, "Findings & Notes");
        assert_eq!(flow.sequencer().reached_ratio(), 1.0);
    }

    #[test]
    fn checklist_ticks_toggle() {
        let mut flow = workflow();
        let license = ChecklistItemId::new("license");
        assert!(flow.set_checked(&license, true));
        assert!(flow.is_checked(&license));
        assert_eq!(flow.checked_count(), 1);
        assert!(flow.set_checked(&license, false));
        assert!(!flow.is_checked(&license));
        assert!(!flow.set_checked(&ChecklistItemId::new("dea"), true));
        assert_eq!(flow.checked_count(), 0);
    }

    #[test]
    fn outstanding_required_skips_optional_and_complete_rows() {
        let flow = workflow();
        let outstanding: Vec<_> = flow
            .outstanding_required()
            .map(|item| item.id.as_str())
            .collect();
        assert_eq!(outstanding, vec!["malpractice", "education"]);
        assert_eq!(flow.issues().count(), 1);
    }

    #[test]
    fn notes_are_kept_across_steps() {
        let mut flow = workflow();
        flow.set_notes("Malpractice certificate expired 2024-03-01.");
        flow.next();
        flow.back();
        assert_eq!(flow.notes(), "Malpractice certificate expired 2024-03-01.");
    }
}

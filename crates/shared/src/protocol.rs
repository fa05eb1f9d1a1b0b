use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{AuditId, ItemId, ReviewStatus, RiskTier},
    error::WorkflowErrorBody,
};

/// User actions against the audit-creation wizard. Scripts are stored as a
/// JSON array of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum WizardAction {
    SetAuditName {
        name: String,
    },
    SetFramework {
        framework: String,
    },
    ToggleArea {
        area: String,
    },
    SetDueDate {
        due_date: NaiveDate,
    },
    SetDescription {
        description: String,
    },
    AttachDocument {
        name: String,
        size_bytes: u64,
        #[serde(default)]
        mime_type: String,
    },
    RemoveDocument,
    Approve {
        item_id: ItemId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        comment: Option<String>,
    },
    Reject {
        item_id: ItemId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        comment: Option<String>,
    },
    Reset {
        item_id: ItemId,
    },
    SetFinalComments {
        comments: String,
    },
    Next,
    Back,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepHold {
    /// The step's completion predicate is not satisfied.
    Gated,
    /// Already at the first or last step.
    Boundary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentAdvisory {
    UnsupportedExtension,
    ExceedsSizeLimit { limit_bytes: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub name: String,
    pub size: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub audit_id: AuditId,
    pub name: String,
    pub framework: String,
    pub areas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentMeta>,
    pub total_items: usize,
    pub approved_items: usize,
    pub rejected_items: usize,
    pub compliance_percentage: u8,
    pub risk_tier: RiskTier,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub final_comments: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum WizardEvent {
    DraftUpdated,
    StepChanged {
        from: usize,
        to: usize,
    },
    StepHeld {
        step: usize,
        hold: StepHold,
    },
    DocumentAttached {
        document: DocumentMeta,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        advisories: Vec<DocumentAdvisory>,
    },
    DocumentRemoved,
    ItemStatusChanged {
        item_id: ItemId,
        status: ReviewStatus,
    },
    ItemNotFound {
        item_id: ItemId,
    },
    Completed(Box<AuditSummary>),
    Rejected(WorkflowErrorBody),
}

//! Keyed collection of reviewable evidence items.

use std::{collections::HashSet, path::Path};

use anyhow::{Context, Result};
use shared::{
    domain::{ItemId, ReviewItem, ReviewStatus},
    error::WorkflowError,
};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct ReviewLedger {
    items: Vec<ReviewItem>,
}

impl ReviewLedger {
    /// Item ids must be unique and confidence scores within 0..=100.
    pub fn new(items: impl IntoIterator<Item = ReviewItem>) -> Result<Self, WorkflowError> {
        let items: Vec<ReviewItem> = items.into_iter().collect();
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.confidence > 100 {
                return Err(WorkflowError::ConfidenceOutOfRange {
                    item: item.id.to_string(),
                    confidence: item.confidence,
                });
            }
            if !seen.insert(&item.id) {
                return Err(WorkflowError::DuplicateItem(item.id.to_string()));
            }
        }
        Ok(Self { items })
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let items: Vec<ReviewItem> =
            serde_json::from_str(raw).context("evidence fixture must be a JSON array of items")?;
        Self::new(items).context("evidence fixture rejected")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read evidence fixture '{}'", path.display()))?;
        Self::from_json(&raw)
    }

    pub fn items(&self) -> &[ReviewItem] {
        &self.items
    }

    pub fn get(&self, id: &ItemId) -> Option<&ReviewItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Applies `status` to the item with `id`. An existing comment is never
    /// replaced; `comment` is only stored when the item has none yet. Returns
    /// false when no item has that id.
    pub fn set_status(&mut self, id: &ItemId, status: ReviewStatus, comment: Option<&str>) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| &item.id == id) else {
            debug!(item_id = %id, "status change for unknown evidence item ignored");
            return false;
        };

        item.status = status;
        let has_comment = item.comment.as_deref().is_some_and(|c| !c.is_empty());
        if !has_comment {
            if let Some(comment) = comment.filter(|c| !c.is_empty()) {
                item.comment = Some(comment.to_string());
            }
        }
        debug!(item_id = %id, ?status, "evidence item status updated");
        true
    }

    pub fn reset_status(&mut self, id: &ItemId) -> bool {
        self.set_status(id, ReviewStatus::Pending, None)
    }

    pub fn all_reviewed(&self) -> bool {
        self.items.iter().all(|item| !item.status.is_pending())
    }

    pub fn count(&self, status: ReviewStatus) -> usize {
        self.items.iter().filter(|item| item.status == status).count()
    }

    pub fn approved_count(&self) -> usize {
        self.count(ReviewStatus::Approved)
    }

    pub fn rejected_count(&self) -> usize {
        self.count(ReviewStatus::Rejected)
    }

    pub fn pending_count(&self) -> usize {
        self.count(ReviewStatus::Pending)
    }

    pub fn percent_approved(&self) -> u8 {
        crate::metrics::compliance_percentage(self.approved_count(), self.len())
    }
}

/// Evidence rows the review step starts from when no fixture is supplied.
pub fn demo_evidence() -> Vec<ReviewItem> {
    let rows = [
        (
            "e1",
            "Credentialing",
            "Verify physician's board certification.",
            12,
            "Dr. Smith's board certification from ABMS, dated 2022.",
            95,
            "Identified board certification details matching criteria for physician credentialing.",
        ),
        (
            "e2",
            "Quality Management",
            "Review patient complaint resolution process.",
            34,
            "Complaint log entry #2023-005, resolved within 7 days.",
            88,
            "Found a complaint resolution record with a timely resolution, aligning with QM process.",
        ),
        (
            "e3",
            "HEDIS Data Validation",
            "Confirm immunization records for pediatric patients.",
            56,
            "Patient chart for Jane Doe, showing MMR vaccine administered on 01/15/2023.",
            92,
            "Extracted immunization date from patient chart, matching HEDIS criteria for pediatric vaccines.",
        ),
        (
            "e4",
            "Provider Network",
            "Ensure provider contracts are up-to-date.",
            78,
            "Contract with ABC Clinic, valid until 12/31/2024.",
            85,
            "Identified contract validity period, indicating an active and current provider agreement.",
        ),
    ];

    rows.into_iter()
        .map(
            |(id, category, definition, page, extract, confidence, explanation)| {
                let mut item = ReviewItem::new(id, category, definition, confidence);
                item.page_number = Some(page);
                item.evidence_extract = Some(extract.to_string());
                item.ai_explanation = Some(explanation.to_string());
                item
            },
        )
        .collect()
}

#[cfg(test)]
#[path = "tests/ledger_tests.rs"]
mod tests;

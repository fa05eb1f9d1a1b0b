//! Audit framework/area catalog and the draft filled in on the first wizard
//! step.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFramework {
    pub key: String,
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditArea {
    pub key: String,
    pub label: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditCatalog {
    pub frameworks: Vec<AuditFramework>,
    pub areas: Vec<AuditArea>,
}

impl Default for AuditCatalog {
    fn default() -> Self {
        let frameworks = [
            ("ncqa", "NCQA Health Plan Accreditation", "Healthcare quality accreditation"),
            ("sox", "SOX Compliance", "Sarbanes-Oxley financial compliance"),
            ("hipaa", "HIPAA Security Assessment", "Healthcare privacy and security"),
            ("iso", "ISO 27001", "Information security management"),
            ("custom", "Custom Audit", "Define your own audit framework"),
        ]
        .into_iter()
        .map(|(key, label, description)| AuditFramework {
            key: key.into(),
            label: label.into(),
            description: description.into(),
        })
        .collect();

        let areas = [
            ("credentialing", "Credentialing"),
            ("hedis", "HEDIS Data Validation"),
            ("quality_management", "Quality Management"),
            ("utilization_management", "Utilization Management"),
            ("member_rights", "Member Rights"),
            ("provider_network", "Provider Network"),
            ("general", "General Documents"),
        ]
        .into_iter()
        .map(|(key, label)| AuditArea {
            key: key.into(),
            label: label.into(),
            enabled: true,
        })
        .collect();

        Self { frameworks, areas }
    }
}

impl AuditCatalog {
    pub fn framework(&self, key: &str) -> Option<&AuditFramework> {
        self.frameworks.iter().find(|f| f.key == key)
    }

    pub fn enabled_areas(&self) -> impl Iterator<Item = &AuditArea> {
        self.areas.iter().filter(|area| area.enabled)
    }

    pub fn is_selectable_area(&self, key: &str) -> bool {
        self.enabled_areas().any(|area| area.key == key)
    }

    /// Restricts selectable areas to `keys`; areas not listed are disabled.
    pub fn restrict_areas<S: AsRef<str>>(&mut self, keys: &[S]) {
        for area in &mut self.areas {
            area.enabled = keys.iter().any(|key| key.as_ref() == area.key);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditDraft {
    pub name: String,
    pub framework: Option<String>,
    pub areas: Vec<String>,
    pub due_date: Option<NaiveDate>,
    pub description: String,
}

impl AuditDraft {
    pub fn set_framework(&mut self, catalog: &AuditCatalog, key: &str) -> bool {
        if catalog.framework(key).is_none() {
            return false;
        }
        self.framework = Some(key.to_string());
        true
    }

    /// Adds the area when absent, removes it when present. Areas the catalog
    /// does not offer are ignored.
    pub fn toggle_area(&mut self, catalog: &AuditCatalog, key: &str) -> bool {
        if let Some(pos) = self.areas.iter().position(|area| area == key) {
            self.areas.remove(pos);
            return true;
        }
        if !catalog.is_selectable_area(key) {
            return false;
        }
        self.areas.push(key.to_string());
        true
    }

    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && self.framework.is_some()
            && !self.areas.is_empty()
            && self.due_date.is_some()
    }
}

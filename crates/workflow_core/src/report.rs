use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub audience: String,
    pub sections: Vec<String>,
}

pub fn default_templates() -> Vec<ReportTemplate> {
    [
        (
            "executive",
            "Executive Summary",
            "High-level overview for leadership",
            "C-Suite, Board",
            &["Executive Overview", "Key Findings", "Risk Assessment", "Recommendations"][..],
        ),
        (
            "detailed",
            "Detailed Audit Report",
            "Comprehensive findings and evidence",
            "Audit Committee, Compliance Team",
            &["Methodology", "Detailed Findings", "Evidence", "Testing Results", "Appendices"][..],
        ),
        (
            "regulatory",
            "Regulatory Submission",
            "NCQA-formatted submission package",
            "NCQA, Regulators",
            &["Compliance Matrix", "Evidence Package", "Corrective Actions", "Attestations"][..],
        ),
        (
            "dashboard",
            "Management Dashboard",
            "Visual metrics and KPIs",
            "Management Team",
            &["Key Metrics", "Progress Charts", "Risk Indicators", "Action Items"][..],
        ),
    ]
    .into_iter()
    .map(|(id, name, description, audience, sections)| ReportTemplate {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        audience: audience.into(),
        sections: sections.iter().map(|s| s.to_string()).collect(),
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    pub id: String,
    pub label: String,
    pub required: bool,
    pub selected: bool,
}

impl ReportSection {
    pub fn is_included(&self) -> bool {
        self.required || self.selected
    }
}

/// Section picker for a generated report. Required sections are always
/// included and cannot be toggled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSelection {
    pub template: String,
    sections: Vec<ReportSection>,
}

impl Default for ReportSelection {
    fn default() -> Self {
        let sections = [
            ("overview", "Executive Overview", true, true),
            ("methodology", "Audit Methodology", false, false),
            ("findings", "Detailed Findings", true, true),
            ("evidence", "Evidence Summary", false, false),
            ("recommendations", "Recommendations", true, true),
            ("timeline", "Implementation Timeline", false, false),
            ("appendix", "Supporting Appendices", false, false),
        ]
        .into_iter()
        .map(|(id, label, required, selected)| ReportSection {
            id: id.into(),
            label: label.into(),
            required,
            selected,
        })
        .collect();

        Self {
            template: "executive".into(),
            sections,
        }
    }
}

impl ReportSelection {
    pub fn sections(&self) -> &[ReportSection] {
        &self.sections
    }

    pub fn select_template(&mut self, templates: &[ReportTemplate], id: &str) -> bool {
        if !templates.iter().any(|template| template.id == id) {
            return false;
        }
        self.template = id.to_string();
        true
    }

    /// Returns false for unknown or required sections, which stay as they are.
    pub fn toggle(&mut self, id: &str, selected: bool) -> bool {
        match self.sections.iter_mut().find(|section| section.id == id) {
            Some(section) if !section.required => {
                section.selected = selected;
                true
            }
            _ => false,
        }
    }

    pub fn included(&self) -> impl Iterator<Item = &ReportSection> {
        self.sections.iter().filter(|section| section.is_included())
    }
}

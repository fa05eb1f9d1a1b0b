use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use workflow_core::{document::DEFAULT_MAX_FILE_BYTES, AuditCatalog, DocumentPolicy, UploadTimings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_filter: String,
    /// Audit areas offered on the first wizard step; `None` keeps every
    /// catalog area.
    pub enabled_areas: Option<Vec<String>>,
    pub max_file_bytes: u64,
    pub upload_tick_ms: u64,
    pub processing_delay_ms: u64,
    pub classification_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let timings = UploadTimings::default();
        Self {
            log_filter: "info".into(),
            enabled_areas: None,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            upload_tick_ms: timings.tick.as_millis() as u64,
            processing_delay_ms: timings.processing_delay.as_millis() as u64,
            classification_delay_ms: timings.classification_delay.as_millis() as u64,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    log_filter: Option<String>,
    enabled_areas: Option<Vec<String>>,
    max_file_bytes: Option<u64>,
    upload_tick_ms: Option<u64>,
    processing_delay_ms: Option<u64>,
    classification_delay_ms: Option<u64>,
}

impl Settings {
    pub fn catalog(&self) -> AuditCatalog {
        let mut catalog = AuditCatalog::default();
        if let Some(keys) = &self.enabled_areas {
            catalog.restrict_areas(keys.as_slice());
        }
        catalog
    }

    pub fn document_policy(&self) -> DocumentPolicy {
        DocumentPolicy {
            max_file_bytes: self.max_file_bytes,
            ..DocumentPolicy::default()
        }
    }

    pub fn upload_timings(&self) -> UploadTimings {
        UploadTimings {
            tick: Duration::from_millis(self.upload_tick_ms),
            processing_delay: Duration::from_millis(self.processing_delay_ms),
            classification_delay: Duration::from_millis(self.classification_delay_ms),
            ..UploadTimings::default()
        }
    }
}

/// Defaults, then the TOML file at `path` if it exists, then `APP__*`
/// environment variables.
pub fn load_settings(path: &Path) -> Result<Settings> {
    let mut settings = Settings::default();

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
        let file_cfg = parse_file_settings(&raw)
            .with_context(|| format!("invalid settings file '{}'", path.display()))?;
        apply_file_settings(&mut settings, file_cfg);
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn parse_file_settings(raw: &str) -> Result<FileSettings> {
    Ok(toml::from_str::<FileSettings>(raw)?)
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    if let Some(v) = file_cfg.enabled_areas {
        settings.enabled_areas = Some(v);
    }
    if let Some(v) = file_cfg.max_file_bytes {
        settings.max_file_bytes = v;
    }
    if let Some(v) = file_cfg.upload_tick_ms {
        settings.upload_tick_ms = v;
    }
    if let Some(v) = file_cfg.processing_delay_ms {
        settings.processing_delay_ms = v;
    }
    if let Some(v) = file_cfg.classification_delay_ms {
        settings.classification_delay_ms = v;
    }
}

fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
    if let Some(v) = var("APP__ENABLED_AREAS") {
        let areas: Vec<String> = v
            .split(',')
            .map(str::trim)
            .filter(|area| !area.is_empty())
            .map(String::from)
            .collect();
        settings.enabled_areas = Some(areas);
    }
    if let Some(parsed) = var("APP__MAX_FILE_BYTES").and_then(|v| v.parse().ok()) {
        settings.max_file_bytes = parsed;
    }
    if let Some(parsed) = var("APP__UPLOAD_TICK_MS").and_then(|v| v.parse().ok()) {
        settings.upload_tick_ms = parsed;
    }
    if let Some(parsed) = var("APP__PROCESSING_DELAY_MS").and_then(|v| v.parse().ok()) {
        settings.processing_delay_ms = parsed;
    }
    if let Some(parsed) = var("APP__CLASSIFICATION_DELAY_MS").and_then(|v| v.parse().ok()) {
        settings.classification_delay_ms = parsed;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;

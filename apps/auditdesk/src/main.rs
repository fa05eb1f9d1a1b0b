use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use shared::{
    domain::ChecklistItemId,
    protocol::{WizardAction, WizardEvent},
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use workflow_core::{
    ledger::demo_evidence, report, sample_testing::AuditSample, AuditWizard, RandomClassifier,
    ReviewLedger, SampleTestingWorkflow, UploadSimulator,
};

mod config;

const DEMO_SCRIPT: &str = include_str!("../demo_script.json");

#[derive(Parser, Debug)]
#[command(about = "Drive the audit review workflows from the command line")]
struct Args {
    #[arg(long, default_value = "auditdesk.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a wizard action script and print the resulting events.
    Walkthrough {
        /// JSON array of evidence items; the built-in demo set when omitted.
        #[arg(long)]
        evidence: Option<PathBuf>,
        /// JSON array of wizard actions; the built-in demo script when omitted.
        #[arg(long)]
        script: Option<PathBuf>,
    },
    /// Simulate uploading files given as `name:bytes`.
    Upload {
        files: Vec<String>,
        /// Remove this upload (by position, starting at 1) once it is queued.
        #[arg(long)]
        cancel: Vec<usize>,
        /// Audit folder to file every upload under.
        #[arg(long)]
        folder: Option<String>,
    },
    /// Print the configured audit frameworks, areas and report templates.
    Catalog,
    /// Walk the sample testing workflow for the demo sample.
    SampleTesting {
        /// Checklist rows to mark as verified.
        #[arg(long)]
        check: Vec<String>,
        #[arg(long, default_value = "")]
        notes: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = config::load_settings(&args.config)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Walkthrough { evidence, script } => walkthrough(&settings, evidence, script),
        Command::Upload {
            files,
            cancel,
            folder,
        } => upload(&settings, files, cancel, folder).await,
        Command::Catalog => catalog(&settings),
        Command::SampleTesting { check, notes } => sample_testing(check, notes),
    }
}

fn walkthrough(
    settings: &config::Settings,
    evidence: Option<PathBuf>,
    script: Option<PathBuf>,
) -> Result<()> {
    let ledger = match evidence {
        Some(path) => ReviewLedger::load(&path)?,
        None => ReviewLedger::new(demo_evidence())?,
    };
    let raw_script = match script {
        Some(path) => fs::read_to_string(&path)
            .with_context(|| format!("failed to read script '{}'", path.display()))?,
        None => DEMO_SCRIPT.to_string(),
    };
    let actions: Vec<WizardAction> =
        serde_json::from_str(&raw_script).context("script must be a JSON array of actions")?;

    let mut wizard = AuditWizard::new(settings.catalog(), settings.document_policy(), ledger);
    info!(actions = actions.len(), "replaying wizard script");
    for action in actions {
        let event = wizard.apply(action);
        if let WizardEvent::Rejected(body) = &event {
            warn!(code = ?body.code, message = %body.message, "action rejected");
        }
        println!("{}", serde_json::to_string(&event)?);
    }

    let metrics = wizard.metrics();
    println!(
        "step {}/{} ({}), compliance {}% ({})",
        wizard.current_step(),
        wizard.sequencer().len(),
        wizard.sequencer().current_step().label,
        metrics.compliance_percentage,
        metrics.risk_tier.label()
    );
    if let Some(summary) = wizard.summary() {
        println!("{}", serde_json::to_string_pretty(summary)?);
    }
    Ok(())
}

fn parse_upload_spec(spec: &str) -> Result<(String, u64)> {
    let (name, size) = spec
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("upload '{spec}' must look like name:bytes"))?;
    if name.is_empty() {
        bail!("upload '{spec}' has an empty file name");
    }
    let size = size
        .parse()
        .with_context(|| format!("upload '{spec}' has an invalid byte count"))?;
    Ok((name.to_string(), size))
}

async fn upload(
    settings: &config::Settings,
    files: Vec<String>,
    cancel: Vec<usize>,
    folder: Option<String>,
) -> Result<()> {
    let specs = files
        .iter()
        .map(|spec| parse_upload_spec(spec))
        .collect::<Result<Vec<_>>>()?;
    if specs.is_empty() {
        bail!("nothing to upload");
    }

    let policy = settings.document_policy();
    let mut simulator =
        UploadSimulator::new(Arc::new(RandomClassifier::default()), settings.upload_timings());
    let mut events = simulator.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(err) => warn!(error = %err, "failed to encode upload event"),
                },
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "upload events dropped"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut ids = Vec::with_capacity(specs.len());
    for (name, size) in specs {
        for advisory in policy.check(&name, size) {
            warn!(file_name = %name, ?advisory, "upload advisory");
        }
        ids.push(
            simulator
                .enqueue_into(name, size, String::new(), folder.clone())
                .await,
        );
    }
    for position in cancel {
        match ids.get(position.wrapping_sub(1)) {
            Some(id) => {
                simulator.remove(*id).await;
            }
            None => warn!(position, "no upload at that position"),
        }
    }

    simulator.settle().await;
    let board = simulator.snapshot().await;
    drop(simulator);
    printer.await.context("upload event printer failed")?;

    println!("{}", serde_json::to_string_pretty(&board)?);
    Ok(())
}

fn catalog(settings: &config::Settings) -> Result<()> {
    let catalog = settings.catalog();
    let output = serde_json::json!({
        "frameworks": catalog.frameworks,
        "areas": catalog.enabled_areas().collect::<Vec<_>>(),
        "report_templates": report::default_templates(),
        "report_sections": report::ReportSelection::default().sections(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn sample_testing(check: Vec<String>, notes: String) -> Result<()> {
    let mut flow = SampleTestingWorkflow::new(AuditSample::demo());
    for id in check {
        let id = ChecklistItemId::new(id);
        if !flow.set_checked(&id, true) {
            warn!(item = %id, "unknown checklist row");
        }
    }
    flow.set_notes(notes);

    while !flow.sequencer().is_last() {
        let step = flow.sequencer().current_step();
        println!("step {}: {}", step.ordinal, step.label);
        flow.next();
    }
    let step = flow.sequencer().current_step();
    println!("step {}: {}", step.ordinal, step.label);

    let sample = flow.sample();
    println!(
        "{} ({}): {} of {} checklist rows verified",
        sample.name,
        sample.id,
        flow.checked_count(),
        sample.checklist.len()
    );
    for item in flow.outstanding_required() {
        println!("  outstanding: {} [{:?}]", item.label, item.status);
    }
    if !flow.notes().is_empty() {
        println!("notes: {}", flow.notes());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upload_specs() {
        assert_eq!(
            parse_upload_spec("Board_Cert.pdf:2048").expect("spec"),
            ("Board_Cert.pdf".to_string(), 2048)
        );
        assert_eq!(
            parse_upload_spec("C:notes.docx:10").expect("colon in name"),
            ("C:notes.docx".to_string(), 10)
        );
        assert!(parse_upload_spec("no-size.pdf").is_err());
        assert!(parse_upload_spec(":10").is_err());
        assert!(parse_upload_spec("a.pdf:lots").is_err());
    }

    #[test]
    fn demo_script_completes_the_wizard() {
        let actions: Vec<WizardAction> = serde_json::from_str(DEMO_SCRIPT).expect("demo script");
        let settings = config::Settings::default();
        let mut wizard = AuditWizard::new(
            settings.catalog(),
            settings.document_policy(),
            ReviewLedger::new(demo_evidence()).expect("demo evidence"),
        );
        let last = actions
            .into_iter()
            .map(|action| wizard.apply(action))
            .last()
            .expect("non-empty script");
        assert!(matches!(last, WizardEvent::Completed(_)));
    }
}

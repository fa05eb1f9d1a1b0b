pub mod audit_setup;
pub mod classifier;
pub mod document;
pub mod ledger;
pub mod metrics;
pub mod report;
pub mod sample_testing;
pub mod sequencer;
pub mod upload;
pub mod wizard;

pub use audit_setup::{AuditCatalog, AuditDraft};
pub use classifier::{Classifier, FixedClassifier, RandomClassifier};
pub use document::DocumentPolicy;
pub use ledger::ReviewLedger;
pub use metrics::DerivedMetrics;
pub use sample_testing::SampleTestingWorkflow;
pub use sequencer::{Movement, StepSequencer};
pub use upload::{UploadSimulator, UploadTimings};
pub use wizard::AuditWizard;

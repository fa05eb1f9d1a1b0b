use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use shared::domain::Classification;

/// Assigns an audit-area category to an uploaded document.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, file_name: &str) -> Result<Classification>;
}

pub fn default_classifications() -> Vec<Classification> {
    [
        ("Credentialing", 94),
        ("HEDIS Data Validation", 87),
        ("Quality Management", 91),
        ("Provider Network", 89),
    ]
    .into_iter()
    .map(|(category, confidence)| Classification {
        category: category.to_string(),
        confidence,
    })
    .collect()
}

/// Picks one entry of its table uniformly at random.
pub struct RandomClassifier {
    table: Vec<Classification>,
}

impl RandomClassifier {
    pub fn new(table: Vec<Classification>) -> Self {
        Self { table }
    }
}

impl Default for RandomClassifier {
    fn default() -> Self {
        Self::new(default_classifications())
    }
}

#[async_trait]
impl Classifier for RandomClassifier {
    async fn classify(&self, file_name: &str) -> Result<Classification> {
        self.table
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| anyhow!("no classification candidates configured for '{file_name}'"))
    }
}

/// Always answers with the same result.
pub struct FixedClassifier {
    outcome: std::result::Result<Classification, String>,
}

impl FixedClassifier {
    pub fn new(category: impl Into<String>, confidence: u8) -> Self {
        Self {
            outcome: Ok(Classification {
                category: category.into(),
                confidence,
            }),
        }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            outcome: Err(reason.into()),
        }
    }
}

#[async_trait]
impl Classifier for FixedClassifier {
    async fn classify(&self, _file_name: &str) -> Result<Classification> {
        self.outcome.clone().map_err(|reason| anyhow!(reason))
    }
}

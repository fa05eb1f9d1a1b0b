//! Linear step cursor shared by every multi-step workflow.

use serde::{Deserialize, Serialize};
use shared::error::WorkflowError;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// 1-based position in the flow.
    pub ordinal: usize,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Moved { from: usize, to: usize },
    AtBoundary,
    Gated,
}

impl Movement {
    pub fn moved(self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

#[derive(Debug, Clone)]
pub struct StepSequencer {
    steps: Vec<Step>,
    cursor: usize,
}

impl StepSequencer {
    pub fn new<I, S>(labels: I) -> Result<Self, WorkflowError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let steps = labels
            .into_iter()
            .enumerate()
            .map(|(index, label)| Step {
                ordinal: index + 1,
                label: label.into(),
                description: None,
            })
            .collect();
        Self::from_steps(steps)
    }

    pub fn with_descriptions<'a, I>(steps: I) -> Result<Self, WorkflowError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let steps = steps
            .into_iter()
            .enumerate()
            .map(|(index, (label, description))| Step {
                ordinal: index + 1,
                label: label.to_string(),
                description: Some(description.to_string()),
            })
            .collect();
        Self::from_steps(steps)
    }

    fn from_steps(steps: Vec<Step>) -> Result<Self, WorkflowError> {
        if steps.is_empty() {
            return Err(WorkflowError::NoSteps);
        }
        Ok(Self { steps, cursor: 1 })
    }

    pub fn current(&self) -> usize {
        self.cursor
    }

    pub fn current_step(&self) -> &Step {
        &self.steps[self.cursor - 1]
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_first(&self) -> bool {
        self.cursor == 1
    }

    pub fn is_last(&self) -> bool {
        self.cursor == self.steps.len()
    }

    /// Unconditional forward move, clamped at the last step.
    pub fn advance(&mut self) -> Movement {
        self.advance_if(|_| true)
    }

    /// Moves forward only when `can_advance` holds for the current step.
    pub fn advance_if(&mut self, can_advance: impl FnOnce(&Step) -> bool) -> Movement {
        if self.is_last() {
            return Movement::AtBoundary;
        }
        if !can_advance(self.current_step()) {
            debug!(step = self.cursor, "advance refused by step gate");
            return Movement::Gated;
        }
        let from = self.cursor;
        self.cursor += 1;
        debug!(from, to = self.cursor, "workflow advanced");
        Movement::Moved {
            from,
            to: self.cursor,
        }
    }

    pub fn retreat(&mut self) -> Movement {
        if self.is_first() {
            return Movement::AtBoundary;
        }
        let from = self.cursor;
        self.cursor -= 1;
        debug!(from, to = self.cursor, "workflow retreated");
        Movement::Moved {
            from,
            to: self.cursor,
        }
    }

    /// Share of the flow already passed, for the connector line between step
    /// markers: 0.0 on the first step, 1.0 on the last.
    pub fn traversed_ratio(&self) -> f64 {
        if self.steps.len() <= 1 {
            return 1.0;
        }
        (self.cursor - 1) as f64 / (self.steps.len() - 1) as f64
    }

    /// Share of steps reached including the current one.
    pub fn reached_ratio(&self) -> f64 {
        self.cursor as f64 / self.steps.len() as f64
    }
}

#[cfg(test)]
#[path = "tests/sequencer_tests.rs"]
mod tests;

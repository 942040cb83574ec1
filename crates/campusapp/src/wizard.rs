//! Multi-step form over one draft.
//!
//! The draft is shared by every step. Moving forward is gated on the current
//! step's required fields; moving back never is. The step index stays within
//! `[0, steps - 1]`. Submitting from the last step sends the whole draft,
//! whichever steps were actually visited.

use crate::error::{invalid_fields, CampusError, Result};
use validator::Validate;

/// A draft split into named steps.
pub trait StepForm: Validate {
    const STEPS: &'static [&'static str];

    /// Fields validated before leaving `step`.
    fn step_fields(step: usize) -> &'static [&'static str];
}

#[derive(Debug, Clone)]
pub struct Wizard<D> {
    step: usize,
    draft: D,
}

impl<D: StepForm> Wizard<D> {
    pub fn new(draft: D) -> Self {
        Self { step: 0, draft }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn step_name(&self) -> &'static str {
        D::STEPS.get(self.step).copied().unwrap_or_default()
    }

    pub fn is_last(&self) -> bool {
        self.step + 1 >= D::STEPS.len()
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut D {
        &mut self.draft
    }

    pub fn into_draft(self) -> D {
        self.draft
    }

    /// Required fields of `step` that are still missing, sorted.
    pub fn missing_on(&self, step: usize) -> Vec<String> {
        let wanted: Vec<String> = D::step_fields(step).iter().map(|f| normalize(f)).collect();
        match self.draft.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => invalid_fields(&errors)
                .into_iter()
                .filter(|k| wanted.contains(&normalize(k)))
                .collect(),
        }
    }

    fn check_step(&self, step: usize) -> Result<()> {
        let missing = self.missing_on(step);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CampusError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )))
        }
    }

    /// Continue to the next step. Stays put on the last step.
    pub fn next(&mut self) -> Result<usize> {
        self.check_step(self.step)?;
        if !self.is_last() {
            self.step += 1;
        }
        Ok(self.step)
    }

    pub fn back(&mut self) -> usize {
        self.step = self.step.saturating_sub(1);
        self.step
    }

    /// Walk forward from the current step to the last, stopping at the first
    /// step whose fields are incomplete.
    pub fn advance_to_end(&mut self) -> Result<usize> {
        while !self.is_last() {
            self.next()?;
        }
        Ok(self.step)
    }

    /// Validate the final step and hand the full draft to `send`.
    pub fn submit<R>(&self, send: impl FnOnce(&D) -> Result<R>) -> Result<R> {
        if !self.is_last() {
            return Err(CampusError::Refused(format!(
                "Finish the '{}' step first",
                self.step_name()
            )));
        }
        self.check_step(self.step)?;
        send(&self.draft)
    }
}

fn normalize(field: &str) -> String {
    field
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

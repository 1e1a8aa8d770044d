// File: src/flow.rs
// Purpose: Multi-step flows: ordered field groups gated by partial validation

use tracing::debug;

use crate::error::SchemaError;
use crate::form::Form;
use crate::schema::Schema;
use crate::validation::ValidationResult;

/// One named step and the fields it owns
#[derive(Debug, Clone)]
pub struct Step {
    name: String,
    fields: Vec<String>,
}

impl Step {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// Position through an ordered list of steps, with a terminal review
/// position after the last one. Advancing is gated by partial validation of
/// the current step's fields; going back never validates.
#[derive(Debug, Clone)]
pub struct StepFlow {
    steps: Vec<Step>,
    current: usize,
}

pub struct StepFlowBuilder {
    steps: Vec<Step>,
}

impl StepFlow {
    pub fn builder() -> StepFlowBuilder {
        StepFlowBuilder { steps: Vec::new() }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// The step under the cursor, or None at the review position
    pub fn current_step(&self) -> Option<&Step> {
        self.steps.get(self.current)
    }

    pub fn is_review(&self) -> bool {
        self.current == self.steps.len()
    }

    /// Percent of steps completed; 100 at the review position
    pub fn progress(&self) -> f64 {
        if self.steps.is_empty() {
            return 100.0;
        }
        (self.current as f64 / self.steps.len() as f64) * 100.0
    }

    /// Gate on the current step's fields; move forward only when they pass.
    /// On failure the step's errors come back and the cursor stays put.
    pub fn advance(&mut self, form: &Form) -> Result<(), ValidationResult> {
        let Some(step) = self.steps.get(self.current) else {
            return Ok(()); // already at review
        };
        let fields: Vec<&str> = step.fields.iter().map(String::as_str).collect();
        let result = form.validate_fields(&fields);
        if result.is_valid {
            self.current += 1;
            debug!(
                "Step flow advanced past `{}` ({}/{})",
                step.name,
                self.current,
                self.steps.len()
            );
            Ok(())
        } else {
            debug!(
                "Step `{}` blocked by {} validation errors",
                step.name,
                result.errors.len()
            );
            Err(result)
        }
    }

    /// One step back, from review into the last step included; never below 0
    pub fn back(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// Back to the first step, as after a form reset
    pub fn restart(&mut self) {
        self.current = 0;
    }
}

impl StepFlowBuilder {
    pub fn step<S: Into<String>>(
        mut self,
        name: impl Into<String>,
        fields: impl IntoIterator<Item = S>,
    ) -> Self {
        self.steps.push(Step {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Check every step field against the schema and produce the flow
    pub fn build(self, schema: &Schema) -> Result<StepFlow, SchemaError> {
        for step in &self.steps {
            for field in &step.fields {
                let known =
                    schema.field(field).is_some() || schema.sequence(field).is_some();
                if !known {
                    return Err(SchemaError::UnknownStepField {
                        step: step.name.clone(),
                        field: field.clone(),
                    });
                }
            }
        }
        Ok(StepFlow {
            steps: self.steps,
            current: 0,
        })
    }
}

//! Ordered record of the single-document writes a multi-document mutation
//! has completed.
//!
//! There is no rollback primitive, so when a step fails the earlier steps
//! stay applied. `StepLog` makes that window visible in the logs and stops
//! the remaining steps from running.

use std::future::Future;

use domains::Result;
use tracing::{debug, warn};

pub(crate) struct StepLog {
    operation: &'static str,
    applied: Vec<&'static str>,
}

impl StepLog {
    pub(crate) fn new(operation: &'static str) -> Self {
        Self {
            operation,
            applied: Vec::new(),
        }
    }

    /// Awaits one step. On failure the error is returned untouched and no
    /// later step is attempted by the caller's `?`.
    pub(crate) async fn run<T, F>(&mut self, step: &'static str, write: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match write.await {
            Ok(value) => {
                debug!(operation = self.operation, step, "step applied");
                self.applied.push(step);
                Ok(value)
            }
            Err(err) => {
                if self.applied.is_empty() {
                    debug!(operation = self.operation, step, error = %err, "first step failed, nothing applied");
                } else {
                    warn!(
                        operation = self.operation,
                        applied = ?self.applied,
                        failed = step,
                        error = %err,
                        "mutation aborted after partial apply; edge stays asymmetric until retried or repaired"
                    );
                }
                Err(err)
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn applied(&self) -> &[&'static str] {
        &self.applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::DomainError;

    #[tokio::test]
    async fn records_only_successful_steps() {
        let mut steps = StepLog::new("test");
        steps.run("first", async { Ok(()) }).await.unwrap();
        let failed: Result<()> = steps
            .run("second", async { Err(DomainError::TransientStore("down".into())) })
            .await;

        assert!(failed.is_err());
        assert_eq!(steps.applied(), &["first"]);
    }
}

//! Prometheus counters for core operations, labelled by outcome.

use domains::DomainError;
use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct OperationLabels {
    pub operation: String,
    pub outcome: String,
}

pub struct Metrics {
    registry: Registry,
    operations: Family<OperationLabels, Counter>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("chirp");
        let operations = Family::<OperationLabels, Counter>::default();
        registry.register(
            "operations",
            "Core operations handled, by outcome",
            operations.clone(),
        );
        Self {
            registry,
            operations,
        }
    }

    pub fn observe<T>(&self, operation: &str, result: &Result<T, DomainError>) {
        let outcome = match result {
            Ok(_) => "ok",
            Err(err) => outcome_label(err),
        };
        self.operations
            .get_or_create(&OperationLabels {
                operation: operation.to_string(),
                outcome: outcome.to_string(),
            })
            .inc();
    }

    /// OpenMetrics text exposition.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }
}

fn outcome_label(err: &DomainError) -> &'static str {
    match err {
        DomainError::NotFound(_, _) => "not_found",
        DomainError::SelfReference(_) => "self_reference",
        DomainError::Validation(_) => "validation",
        DomainError::Conflict(_) => "conflict",
        DomainError::Forbidden(_) => "forbidden",
        DomainError::TransientStore(_) => "transient_store",
    }
}

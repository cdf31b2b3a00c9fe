use crate::tools::{Args, DispatchError, Outcome, ToolRegistry};
use serde_json::Value;
use std::sync::Arc;

/// Looks operations up, validates their arguments and runs them. Handler
/// failures never leave here as errors: they come back as `Outcome::Failure`.
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub async fn run(&self, name: &str, params: Value) -> Result<Outcome, DispatchError> {
        let tool = self.registry.get(name).ok_or_else(|| {
            tracing::error!("Tool not found: {}", name);
            DispatchError::OperationNotFound(name.to_string())
        })?;

        let args = Args::resolve(&tool.params(), &params).map_err(|e| {
            tracing::warn!("Rejected call to {}: {}", name, e);
            e
        })?;

        tracing::info!("Executing tool: {} with arguments: {}", name, params);
        let outcome = match tool.execute(&args).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Tool {} failed: {}", name, e);
                Outcome::Failure(e.to_string())
            }
        };
        tracing::debug!("Tool {} returned: {:?}", name, outcome);
        Ok(outcome)
    }

    /// Runs an operation and renders its outcome to the text the invoker sees.
    pub async fn execute(&self, name: &str, params: Value) -> Result<String, DispatchError> {
        Ok(self.run(name, params).await?.to_string())
    }
}

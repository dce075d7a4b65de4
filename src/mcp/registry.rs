use crate::{
    config::Config,
    errors::AppError,
    mcp::types::{ToolCallResult, ToolDescriptor},
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

pub type DynTool = Arc<dyn Tool + Send + Sync + 'static>;

#[derive(Clone)]
pub struct ToolRegistry {
    tools: Vec<(String, DynTool)>,
}

impl ToolRegistry {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        use crate::tools::learn::LearnTool;
        let learn: DynTool = Arc::new(LearnTool::new(cfg)?);
        Ok(Self::with_tools(vec![learn]))
    }

    pub fn with_tools(tools: Vec<DynTool>) -> Self {
        let mut tools: Vec<(String, DynTool)> =
            tools.into_iter().map(|t| (t.name().to_string(), t)).collect();
        tools.sort_by(|a, b| a.0.cmp(&b.0));
        Self { tools }
    }

    pub fn get(&self, name: &str) -> Option<DynTool> { self.tools.iter().find(|(n, _)| n == name).map(|(_, t)| t.clone()) }
    pub fn list_names(&self) -> Vec<String> { self.tools.iter().map(|(n, _)| n.clone()).collect() }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|(_, t)| t.descriptor()).collect()
    }

    /// Runs a tool by name. Failures never escape: they come back as
    /// error-flagged results.
    pub async fn invoke(&self, name: &str, arguments: Option<Value>) -> ToolCallResult {
        let Some(tool) = self.get(name) else {
            return ToolCallResult::error(AppError::UnknownTool(name.to_string()).tool_text());
        };
        match tool.call(arguments).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(tool = name, code = e.code(), error = %e, "tool call failed");
                ToolCallResult::error(e.tool_text())
            }
        }
    }
}

#[async_trait]
pub trait Tool {
    fn name(&self) -> &'static str;
    fn descriptor(&self) -> ToolDescriptor;
    async fn call(&self, arguments: Option<Value>) -> Result<ToolCallResult, AppError>;
}

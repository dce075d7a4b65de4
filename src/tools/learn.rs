use crate::{
    config::Config,
    errors::AppError,
    mcp::{
        registry::Tool,
        types::{ToolCallResult, ToolDescriptor},
    },
    remote::{RemoteClient, RemoteResource},
};
use async_trait::async_trait;
use serde_json::{json, Value};

pub const NAME: &str = "learn_mcp";

const DESCRIPTION: &str = "Provides educational resources about Model Context Protocol (MCP). \
This tool helps you learn about building and using MCP servers by returning \
documentation links, tutorials, examples, and other learning materials. \
Each call returns a different resource to explore the MCP ecosystem.";

pub struct LearnTool {
    client: RemoteClient,
    require_arguments: bool,
}

impl LearnTool {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            client: RemoteClient::new(&cfg.remote)?,
            require_arguments: cfg.tool.require_arguments,
        })
    }
}

fn topic_from(arguments: Option<&Value>) -> Result<String, AppError> {
    let Some(arguments) = arguments else { return Ok(String::new()) };
    let map = arguments
        .as_object()
        .ok_or_else(|| AppError::InvalidArguments("arguments must be an object".into()))?;
    match map.get("topic") {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(AppError::InvalidArguments("topic must be a string".into())),
    }
}

#[async_trait]
impl Tool for LearnTool {
    fn name(&self) -> &'static str { NAME }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: NAME,
            description: DESCRIPTION,
            input_schema: json!({
                "type": "object",
                "properties": {
                    "topic": {
                        "type": "string",
                        "description": "Optional topic to focus on (e.g., 'implementation', 'architecture', 'examples')"
                    }
                }
            }),
        }
    }

    async fn call(&self, arguments: Option<Value>) -> Result<ToolCallResult, AppError> {
        if arguments.is_none() && self.require_arguments {
            return Err(AppError::NoArguments);
        }
        let topic = topic_from(arguments.as_ref())?;
        tracing::info!(topic = %topic, endpoint = self.client.endpoint(), "calling remote endpoint");

        let resource = match self.client.fetch(NAME, &topic).await {
            Ok(resource) => resource,
            Err(e) => {
                tracing::warn!(code = e.code(), error = %e, "remote call failed, using fallback resource");
                RemoteResource::fallback()
            }
        };
        Ok(ToolCallResult::text(resource.to_string()))
    }
}

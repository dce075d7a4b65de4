use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("parse error: {0}")]
    ParseError(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("Method not found: {0}")]
    MethodNotFound(String),
    #[error("invalid params: {0}")]
    InvalidParams(String),
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("No arguments provided")]
    NoArguments,
    #[error("{0}")]
    InvalidArguments(String),
    #[error("remote error: {0}")]
    Remote(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ParseError(_) => "ParseError",
            AppError::InvalidRequest(_) => "InvalidRequest",
            AppError::MethodNotFound(_) => "MethodNotFound",
            AppError::InvalidParams(_) => "InvalidParams",
            AppError::UnknownTool(_) => "UnknownTool",
            AppError::NoArguments => "NoArguments",
            AppError::InvalidArguments(_) => "InvalidArguments",
            AppError::Remote(_) => "Remote",
            AppError::Internal(_) => "Internal",
        }
    }

    /// JSON-RPC error code for protocol-level failures.
    pub fn rpc_code(&self) -> i64 {
        match self {
            AppError::ParseError(_) => -32700,
            AppError::InvalidRequest(_) => -32600,
            AppError::MethodNotFound(_) => -32601,
            AppError::InvalidParams(_) => -32602,
            _ => -32603,
        }
    }

    /// Text placed in an error-flagged tool result.
    pub fn tool_text(&self) -> String {
        match self {
            AppError::UnknownTool(_) => self.to_string(),
            other => format!("Error: {other}"),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

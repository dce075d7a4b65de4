use crate::{
    config::Config,
    errors::AppError,
    mcp::{
        registry::ToolRegistry,
        types::{CallParams, RpcRequest, RpcResponse, ToolList, PROTOCOL_VERSION, SUPPORTED_PROTOCOL_VERSIONS},
    },
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::{sync::Arc, time::Instant};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub registry: Arc<ToolRegistry>,
}

impl AppState {
    pub fn new(cfg: Config, registry: ToolRegistry) -> Self {
        Self { cfg: Arc::new(cfg), registry: Arc::new(registry) }
    }
}

/// Serves on stdin/stdout until stdin closes.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve_io(state, stdin, stdout).await
}

/// Line-delimited JSON-RPC loop. Requests are handled one at a time in
/// arrival order; a bad line never ends the loop.
pub async fn serve_io<R, W>(state: AppState, mut reader: R, mut writer: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let resp = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => handle_line(&state, line.trim()).await,
            Err(e) => Some(parse_error(format!("invalid UTF-8: {e}"))),
        };
        if let Some(resp) = resp {
            let mut out = serde_json::to_vec(&resp)?;
            out.push(b'\n');
            writer.write_all(&out).await?;
            writer.flush().await?;
        }
    }
    tracing::info!("input closed, shutting down");
    Ok(())
}

fn parse_error(message: String) -> RpcResponse {
    let err = AppError::ParseError(message);
    audit_end("-", "-", "error", err.code(), 0);
    RpcResponse::error(Value::Null, err.rpc_code(), err.to_string())
}

/// Handles one raw line; `None` means nothing is written back.
pub async fn handle_line(state: &AppState, line: &str) -> Option<RpcResponse> {
    let value: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => return Some(parse_error(e.to_string())),
    };
    // Well-formed JSON that is not a request object.
    let id = value.get("id").cloned().unwrap_or(Value::Null);
    let parsed = if value.is_object() {
        RpcRequest::deserialize(value).map_err(|e| e.to_string())
    } else {
        Err("request must be a JSON object".to_string())
    };
    let req = match parsed {
        Ok(r) => r,
        Err(msg) => {
            let err = AppError::InvalidRequest(msg);
            audit_end("-", "-", "error", err.code(), 0);
            return Some(RpcResponse::error(id, err.rpc_code(), err.to_string()));
        }
    };
    handle_request(state, req).await
}

pub async fn handle_request(state: &AppState, req: RpcRequest) -> Option<RpcResponse> {
    let started = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();

    if let Some(v) = req.jsonrpc.as_deref() {
        if v != "2.0" {
            let err = AppError::InvalidRequest(format!("unsupported jsonrpc version {v:?}"));
            audit_end(&request_id, &req.method, "deny", err.code(), started.elapsed().as_millis() as u64);
            return req.id.map(|id| RpcResponse::error(id, err.rpc_code(), err.to_string()));
        }
    }

    let outcome = dispatch(state, &req).await;
    let duration_ms = started.elapsed().as_millis() as u64;

    let Some(id) = req.id else {
        // Notification: never answered.
        let code = match &outcome { Ok(_) => "OK", Err(e) => e.code() };
        audit_end(&request_id, &req.method, "notify", code, duration_ms);
        return None;
    };

    match outcome {
        Ok(result) => {
            audit_end(&request_id, &req.method, "allow", "OK", duration_ms);
            Some(RpcResponse::success(id, result.unwrap_or_else(|| json!({}))))
        }
        Err(e) => {
            audit_end(&request_id, &req.method, "error", e.code(), duration_ms);
            Some(RpcResponse::error(id, e.rpc_code(), e.to_string()))
        }
    }
}

async fn dispatch(state: &AppState, req: &RpcRequest) -> Result<Option<Value>, AppError> {
    match req.method.as_str() {
        "initialize" => Ok(Some(initialize(state, req.params.as_ref()))),
        "initialized" | "notifications/initialized" | "notifications/cancelled" => Ok(None),
        "ping" => Ok(Some(json!({}))),
        "tools/list" | "list_tools" => {
            let list = ToolList { tools: state.registry.descriptors() };
            serde_json::to_value(list).map(Some).map_err(|e| AppError::Internal(e.to_string()))
        }
        "tools/call" | "call_tool" => {
            let params = req
                .params
                .clone()
                .ok_or_else(|| AppError::InvalidParams("missing params".into()))?;
            let call: CallParams =
                serde_json::from_value(params).map_err(|e| AppError::InvalidParams(e.to_string()))?;
            tracing::info!(tool = %call.name, arguments = ?call.arguments, "handling tool call");
            let result = state.registry.invoke(&call.name, call.arguments).await;
            tracing::info!(
                tool = %call.name,
                is_error = result.is_error,
                text_len = result.joined_text().len(),
                "tool call finished"
            );
            serde_json::to_value(result).map(Some).map_err(|e| AppError::Internal(e.to_string()))
        }
        other => Err(AppError::MethodNotFound(other.to_string())),
    }
}

fn initialize(state: &AppState, params: Option<&Value>) -> Value {
    let version = params
        .and_then(|p| p.get("protocolVersion"))
        .and_then(|v| v.as_str())
        .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(v))
        .unwrap_or(PROTOCOL_VERSION);
    json!({
        "protocolVersion": version,
        "capabilities": {"tools": {}},
        "serverInfo": {
            "name": state.cfg.server.name,
            "version": state.cfg.server.version,
        }
    })
}

fn audit_end(request_id: &str, method: &str, decision: &str, code: &str, duration_ms: u64) {
    tracing::info!(
        request_id = request_id,
        method = method,
        decision = decision,
        code = code,
        duration_ms = duration_ms,
        "audit"
    );
}

// Usage: learn-mcp-probe [adapter-path] [topic]
// A "Method not found" reply to tools/invoke is expected.

use anyhow::Context;
use serde_json::{json, Value};
use std::{path::PathBuf, process::Stdio, time::Duration};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader},
    process::{ChildStdin, Command},
};

const DEFAULT_TOPIC: &str = "architecture";
const PAUSE: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let adapter = match args.next() {
        Some(path) => PathBuf::from(path),
        None => default_adapter()?,
    };
    let topic = args.next().unwrap_or_else(|| DEFAULT_TOPIC.to_string());

    println!("Testing MCP adapter at: {}", adapter.display());
    println!("Using topic: {topic}");

    let mut child = Command::new(&adapter)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawning {}", adapter.display()))?;

    let mut stdin = child.stdin.take().context("adapter stdin unavailable")?;
    let stdout = child.stdout.take().context("adapter stdout unavailable")?;
    let stderr = child.stderr.take().context("adapter stderr unavailable")?;
    let out_task = tokio::spawn(echo(stdout, "STDOUT"));
    let err_task = tokio::spawn(echo(stderr, "STDERR"));

    println!("\nSending initialize request...");
    send(
        &mut stdin,
        json!({
            "jsonrpc": "2.0",
            "id": 0,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "test-client", "version": "0.1.0"}
            }
        }),
    )
    .await?;

    println!("\nSending tools/call request...");
    send(&mut stdin, tool_request(1, "tools/call", &topic)).await?;

    println!("\nSending tools/invoke request (for comparison)...");
    send(&mut stdin, tool_request(2, "tools/invoke", &topic)).await?;

    drop(stdin);
    let status = child.wait().await?;
    let _ = out_task.await;
    let _ = err_task.await;

    println!("\nTest completed ({status}).");
    Ok(())
}

fn default_adapter() -> anyhow::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe.parent().context("probe executable has no parent directory")?;
    Ok(dir.join(format!("learn-mcp{}", std::env::consts::EXE_SUFFIX)))
}

fn tool_request(id: u64, method: &str, topic: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": {"name": "learn_mcp", "arguments": {"topic": topic}}
    })
}

async fn send(stdin: &mut ChildStdin, msg: Value) -> anyhow::Result<()> {
    let mut line = serde_json::to_vec(&msg)?;
    line.push(b'\n');
    stdin.write_all(&line).await?;
    stdin.flush().await?;
    tokio::time::sleep(PAUSE).await;
    Ok(())
}

async fn echo<R: AsyncRead + Unpin>(stream: R, label: &'static str) {
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if label == "STDERR" {
            eprintln!("[{label}]: {line}");
        } else {
            println!("[{label}]: {line}");
        }
    }
}

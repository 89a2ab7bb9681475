#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use tokio::runtime::Runtime;
use wiremock::{Mock, MockServer};

pub const TEST_API_KEY: &str = "vscrb-test-key";

/// Mocked Viscribe upstream, kept alive by its own runtime while the binary
/// under test talks to it.
pub struct Upstream {
    server: MockServer,
    runtime: Runtime,
}

impl Upstream {
    pub fn start() -> Self {
        let runtime = Runtime::new().expect("runtime");
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    pub fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn request_count(&self) -> usize {
        self.runtime
            .block_on(self.server.received_requests())
            .map(|requests| requests.len())
            .unwrap_or(0)
    }

    pub fn bodies(&self) -> Vec<serde_json::Value> {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
            .iter()
            .map(|request| serde_json::from_slice(&request.body).expect("json body"))
            .collect()
    }
}

pub fn command(upstream: &Upstream) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_mcp-viscribe"));
    command
        .env("VISCRIBE_API_KEY", TEST_API_KEY)
        .env("VISCRIBE_BASE_URL", upstream.uri());
    command
}

pub struct StdioServer {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl StdioServer {
    pub fn spawn(upstream: &Upstream) -> Self {
        let mut child = command(upstream)
            .args(["serve", "--stdio"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .expect("spawn server");
        let stdin = child.stdin.take().expect("stdin available");
        let stdout = BufReader::new(child.stdout.take().expect("stdout available"));
        Self {
            child,
            stdin,
            stdout,
        }
    }

    pub fn call(&mut self, id: u64, name: &str, arguments: serde_json::Value) -> serde_json::Value {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": {
                "name": name,
                "arguments": arguments
            }
        });
        let serialized = serde_json::to_string(&request).expect("serialize");
        writeln!(self.stdin, "{serialized}").expect("write request");
        self.stdin.flush().expect("flush request");

        let mut line = String::new();
        self.stdout.read_line(&mut line).expect("read response");
        let response: serde_json::Value = serde_json::from_str(line.trim()).expect("json response");
        assert_eq!(response.get("id").and_then(|v| v.as_u64()), Some(id));
        response.get("result").cloned().expect("result present")
    }
}

impl Drop for StdioServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
    }
}

use crate::client::ViscribeClient;
use crate::config::ClientConfig;
use serde_json::Value;
use tokio::runtime::Runtime;
use wiremock::{Mock, MockServer};

pub const TEST_API_KEY: &str = "vscrb-test-key";

/// A mocked upstream driven by its own runtime so the blocking client can be
/// called from a plain `#[test]` thread.
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

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(TEST_API_KEY)
            .expect("config")
            .with_base_url(self.server.uri())
    }

    pub fn client(&self) -> ViscribeClient {
        ViscribeClient::new(self.config()).expect("client")
    }

    pub fn verify(&self) {
        self.runtime.block_on(self.server.verify());
    }

    pub fn request_count(&self) -> usize {
        self.runtime
            .block_on(self.server.received_requests())
            .map(|requests| requests.len())
            .unwrap_or(0)
    }

    /// JSON body of the only request received so far.
    pub fn single_body(&self) -> Value {
        let requests = self
            .runtime
            .block_on(self.server.received_requests())
            .expect("request recording enabled");
        assert_eq!(requests.len(), 1, "expected exactly one upstream request");
        serde_json::from_slice(&requests[0].body).expect("json body")
    }
}

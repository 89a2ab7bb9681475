use crate::client::ViscribeClient;
use crate::error::Result;
use crate::mcp::contracts;
use crate::tools::{Tool, ToolOutput, parse_args};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetCreditsInput {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetCreditsOutput {
    pub remaining_credits: i64,
    pub total_credits_used: i64,
}

pub struct GetCreditsTool {
    client: ViscribeClient,
}

impl GetCreditsTool {
    pub fn new(client: ViscribeClient) -> Self {
        Self { client }
    }

    pub fn run(&self) -> Result<GetCreditsOutput> {
        self.client.get(contracts::PATH_CREDITS)
    }
}

impl Tool for GetCreditsTool {
    fn name(&self) -> &'static str {
        contracts::TOOL_GET_CREDITS
    }

    fn description(&self) -> &'static str {
        contracts::GET_CREDITS_DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        contracts::get_credits_schema()
    }

    fn invoke(&self, args: &Value) -> Result<ToolOutput> {
        let GetCreditsInput {} = parse_args(args)?;
        let output = self.run()?;
        let text = format!(
            "Remaining credits: {} (total used: {})",
            output.remaining_credits, output.total_credits_used
        );
        ToolOutput::new(text, &output)
    }
}

//! `greeting`: pure, deterministic, no sandbox involvement.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use burrow_types::ToolError;

use crate::descriptor::{ToolArgument, ToolDescriptor};
use crate::registry::{parse_arguments, ToolHandler, ToolOutput};

/// Tool name.
pub const NAME: &str = "greeting";

/// Returns the `greeting` descriptor.
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        NAME,
        "Returns a greeting message with the user's name.",
        &[ToolArgument::required_string("name", "The name of the user")],
    )
}

#[derive(Debug, Deserialize)]
struct GreetingArgs {
    name: String,
}

/// Greets the caller by name.
#[derive(Debug, Clone, Copy, Default)]
pub struct Greeting;

#[async_trait]
impl ToolHandler for Greeting {
    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let args: GreetingArgs = parse_arguments(arguments)?;
        Ok(ToolOutput::text(format!(
            "Hello from the burrow server, {}!",
            args.name
        )))
    }
}

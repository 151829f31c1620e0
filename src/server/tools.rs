//! Print tools exposed over MCP.

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, schemars, tool, tool_router};

use super::TinyPrintServer;
use crate::render::Layout;

#[derive(Debug, serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
pub struct PrintMarkdownParams {
    /// Markdown text to print. Headings and emphasis markers are stripped,
    /// checkboxes become bullets.
    pub markdown_text: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
pub struct PrintTextParams {
    /// Plain text to print. Each line is centered and the longest line is
    /// scaled to fill the paper width.
    pub text: String,
}

pub(crate) fn router() -> rmcp::handler::server::router::tool::ToolRouter<TinyPrintServer> {
    TinyPrintServer::print_tools()
}

#[tool_router(router = print_tools)]
impl TinyPrintServer {
    /// Print markdown at a fixed size, cropped to its content.
    #[tool(description = "Print markdown text to the thermal printer")]
    async fn print_markdown(
        &self,
        Parameters(params): Parameters<PrintMarkdownParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .print_job(&params.markdown_text, Layout::Markdown, &context)
            .await)
    }

    /// Print plain text with the largest font that fits the paper.
    #[tool(
        description = "Print plain text to the thermal printer, centered with the largest font that fits"
    )]
    async fn print_text(
        &self,
        Parameters(params): Parameters<PrintTextParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.print_job(&params.text, Layout::Fitted, &context).await)
    }
}

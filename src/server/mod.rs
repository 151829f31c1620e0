//! # MCP Print Server
//!
//! Exposes the printer to MCP clients as two tools:
//!
//! | Tool             | Parameter       | Layout                          |
//! |------------------|-----------------|---------------------------------|
//! | `print_markdown` | `markdown_text` | 24 px, cropped to content       |
//! | `print_text`     | `text`          | largest font that fits, centered|
//!
//! ## Usage
//!
//! ```bash
//! tinyprint serve               # stdio, for desktop MCP clients
//! tinyprint serve --http        # streamable HTTP on 127.0.0.1:3100
//! ```
//!
//! ## Request Flow
//!
//! ```text
//! tool call ──► progress "Initializing printer..."
//!           ──► render + encode
//!           ──► lock printer (connect on first use)
//!           ──► progress "Sending data..."
//!           ──► write ──► "Successfully printed ..."
//!                    └──► "Failed to print ...: <error>" + error log
//! ```
//!
//! Printing failures are reported to the client as a tool result with the
//! error flag set. The printer connection is shared by every session.

mod tools;

pub use tools::{PrintMarkdownParams, PrintTextParams};

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::model::*;
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler, ServiceExt, tool_handler};

use crate::error::TinyPrintError;
use crate::printer::PrintService;
use crate::render::Layout;

/// Default port for `serve --http`.
pub const DEFAULT_HTTP_PORT: u16 = 3100;

const PROGRESS_STEPS: f64 = 2.0;

#[derive(Clone)]
pub struct TinyPrintServer {
    service: Arc<PrintService>,
    tool_router: ToolRouter<Self>,
}

impl TinyPrintServer {
    pub fn new(service: Arc<PrintService>) -> Self {
        Self {
            service,
            tool_router: tools::router(),
        }
    }

    /// Run one print request end to end and describe the outcome.
    async fn print_job(
        &self,
        text: &str,
        layout: Layout,
        context: &RequestContext<RoleServer>,
    ) -> CallToolResult {
        let result = self.send(text, layout, context).await;
        let message = outcome_message(layout, &result);

        match result {
            Ok(()) => {
                report_progress(context, PROGRESS_STEPS, "Printed").await;
                CallToolResult::success(vec![Content::text(message)])
            }
            Err(_) => {
                log::error!("{}", message);
                log_to_client(context, &message).await;
                CallToolResult::error(vec![Content::text(message)])
            }
        }
    }

    async fn send(
        &self,
        text: &str,
        layout: Layout,
        context: &RequestContext<RoleServer>,
    ) -> Result<(), TinyPrintError> {
        report_progress(context, 0.0, "Initializing printer...").await;
        let job = self.service.prepare(text, layout)?;

        let mut session = self.service.manager().session().await?;
        report_progress(context, 1.0, "Sending data...").await;
        session.send(&job).await
    }
}

/// Text returned to the client for a finished request.
pub fn outcome_message(layout: Layout, result: &Result<(), TinyPrintError>) -> String {
    let (subject, short) = match layout {
        Layout::Markdown => ("markdown text", "markdown"),
        Layout::Fitted => ("text", "text"),
    };
    match result {
        Ok(()) => format!("Successfully printed {} to thermal printer", subject),
        Err(e) => format!("Failed to print {}: {}", short, e),
    }
}

async fn report_progress(context: &RequestContext<RoleServer>, progress: f64, message: &str) {
    let Some(progress_token) = context.meta.get_progress_token() else {
        return;
    };
    let param = ProgressNotificationParam {
        progress_token,
        progress,
        total: Some(PROGRESS_STEPS),
        message: Some(message.to_string()),
    };
    if let Err(e) = context.peer.notify_progress(param).await {
        log::debug!("progress notification not delivered: {}", e);
    }
}

async fn log_to_client(context: &RequestContext<RoleServer>, message: &str) {
    let param = LoggingMessageNotificationParam {
        level: LoggingLevel::Error,
        logger: Some("tinyprint".to_string()),
        data: serde_json::Value::String(message.to_string()),
    };
    if let Err(e) = context.peer.notify_logging_message(param).await {
        log::debug!("log notification not delivered: {}", e);
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for TinyPrintServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Tiny thermal printer. Use print_markdown for notes and lists, \
                 print_text for short centered banners."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder()
                .enable_logging()
                .enable_tools()
                .build(),
            server_info: Implementation {
                name: "tinyprint".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Serve MCP over stdin/stdout until the client disconnects.
pub async fn serve_stdio(service: Arc<PrintService>) -> Result<(), TinyPrintError> {
    let server = TinyPrintServer::new(service);
    log::info!("tinyprint MCP server starting via stdio");
    let running = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| TinyPrintError::Server(e.to_string()))?;
    running
        .waiting()
        .await
        .map_err(|e| TinyPrintError::Server(e.to_string()))?;
    Ok(())
}

/// Serve MCP over streamable HTTP on localhost.
pub async fn serve_http(service: Arc<PrintService>, port: u16) -> Result<(), TinyPrintError> {
    use rmcp::transport::streamable_http_server::{
        StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
    };

    let http_service = StreamableHttpService::new(
        move || Ok(TinyPrintServer::new(service.clone())),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig::default(),
    );

    let app = axum::Router::new().fallback_service(http_service);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("tinyprint MCP server listening on http://{addr}/mcp");
    axum::serve(listener, app).await?;
    Ok(())
}

//! MCP Server implementation using rmcp

use crate::upstream::{InvoiceFile, SegerClient, UpstreamConfig};
use anyhow::Result;
use base64::Engine;
use rmcp::{
    handler::server::tool::ToolRouter, handler::server::wrapper::Parameters, model::*,
    schemars::JsonSchema, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::Deserialize;
use std::sync::Arc;

/// Media type declared on every downloaded invoice
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Name advertised to MCP clients during initialization
pub const SERVER_NAME: &str = "seger-tools";

/// Seger MCP Server
#[derive(Clone)]
pub struct SegerServer {
    client: Arc<SegerClient>,
    tool_router: ToolRouter<Self>,
}

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DownloadInvoicesParams {
    /// Lista de códigos de instalação (ex: ['0160011111','0160022222'])
    #[serde(rename = "codInstalacoes")]
    pub installation_codes: Vec<String>,
    /// MÊS-ANO início (ex: 'JAN-2025')
    #[serde(rename = "dataIni")]
    pub start_period: String,
    /// MÊS-ANO fim (ex: 'MAR-2025')
    #[serde(rename = "dataFim")]
    pub end_period: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct InvoiceDataParams {
    /// Caminho local para o arquivo PDF da fatura no servidor
    #[serde(rename = "pdfPath")]
    pub pdf_path: String,
}

// ============================================================================
// Tool implementations
// ============================================================================

#[tool_router]
impl SegerServer {
    /// Create a server on top of an already built upstream client
    pub fn new(client: SegerClient) -> Self {
        Self {
            client: Arc::new(client),
            tool_router: Self::tool_router(),
        }
    }

    /// Create a server from an upstream configuration
    pub fn with_config(config: UpstreamConfig) -> crate::Result<Self> {
        Ok(Self::new(SegerClient::new(config)?))
    }

    /// Download invoices for one or more installations
    #[tool(
        name = "baixar-faturas",
        description = "Baixa as faturas de uma ou mais instalações e retorna os PDFs"
    )]
    pub async fn download_invoices(
        &self,
        Parameters(params): Parameters<DownloadInvoicesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let files = self
            .client
            .get_invoice_files(
                &params.installation_codes,
                &params.start_period,
                &params.end_period,
            )
            .await
            .map_err(|e| tool_error("baixar-faturas", e))?;

        Ok(CallToolResult::success(
            files.iter().map(invoice_file_content).collect(),
        ))
    }

    /// Extract billing data from one invoice
    #[tool(
        name = "dados-fatura",
        description = "Retorna todos os dados de energia de uma fatura em JSON"
    )]
    pub async fn invoice_data(
        &self,
        Parameters(params): Parameters<InvoiceDataParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let data = self
            .client
            .get_invoice_data(&params.pdf_path)
            .await
            .map_err(|e| tool_error("dados-fatura", e))?;

        let text = serde_json::to_string(&data)
            .map_err(|e| tool_error("dados-fatura", crate::Error::Serialization(e)))?;

        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

/// Embedded PDF resource for one downloaded invoice
pub fn invoice_file_content(file: &InvoiceFile) -> Content {
    let engine = base64::engine::general_purpose::STANDARD;
    Content::resource(ResourceContents::BlobResourceContents {
        uri: file.name.clone(),
        mime_type: Some(PDF_MIME_TYPE.to_string()),
        blob: engine.encode(&file.content),
        meta: Default::default(),
    })
}

fn tool_error(tool: &'static str, err: crate::Error) -> ErrorData {
    tracing::debug!(tool, error = %err, "Tool invocation failed");
    let data = err
        .status()
        .map(|status| serde_json::json!({ "status": status }));
    ErrorData::internal_error(err.to_string(), data)
}

#[tool_handler]
impl ServerHandler for SegerServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.into(),
                ..Implementation::from_build_env()
            },
            instructions: Some(
                "Seger MCP Server downloads energy invoices (baixar-faturas) and extracts \
                 their billing data (dados-fatura). Pass a path returned by baixar-faturas \
                 to dados-fatura."
                    .into(),
            ),
        }
    }
}

/// Run the MCP server against the default upstream
pub async fn run_server() -> Result<()> {
    run_server_with_config(UpstreamConfig::default()).await
}

/// Run the MCP server against a specific upstream
pub async fn run_server_with_config(config: UpstreamConfig) -> Result<()> {
    let server = SegerServer::with_config(config)?;

    tracing::debug!(upstream = %server.client.base_url(), "Connecting stdio transport");

    let service = server.serve(rmcp::transport::io::stdio()).await?;
    tracing::info!("Seger MCP Server running on stdio");
    service.waiting().await?;

    Ok(())
}

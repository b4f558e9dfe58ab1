//! Seger MCP Server Library
//!
//! This crate exposes the Seger invoice API as MCP tools:
//! - `baixar-faturas`: Download invoice PDFs for a set of installations
//! - `dados-fatura`: Extract billing data from a downloaded invoice

pub mod error;
pub mod server;
pub mod upstream;

pub use error::{Error, Result};
pub use server::{
    run_server, run_server_with_config, DownloadInvoicesParams, InvoiceDataParams, SegerServer,
};
pub use upstream::{InvoiceData, InvoiceFile, SegerClient, UpstreamConfig};

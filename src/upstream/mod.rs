//! Upstream Seger API adapter
//!
//! This module owns the HTTP contract with the Seger API and knows nothing
//! about MCP. The server layer only calls the operations exported here.

mod client;
mod invoices;

pub use client::{SegerClient, UpstreamConfig, DEFAULT_API_BASE, DEFAULT_USER_AGENT};
pub use invoices::{
    file_name_of, is_falsy, InvoiceData, InvoiceFile, InvoiceFilesResponse, TariffEntry,
    TaxEntry,
};

//! Invoice operations: PDF download and invoice data extraction

use crate::error::{Error, Result};
use crate::upstream::SegerClient;
use futures_util::future::try_join_all;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Invoice PDF read from a path disclosed by the upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceFile {
    /// Final segment of the disclosed path
    pub name: String,
    /// Raw file bytes
    pub content: Vec<u8>,
}

#[derive(Debug, Serialize)]
struct InvoiceFilesRequest<'a> {
    #[serde(rename = "codInstalacoes")]
    installation_codes: &'a [String],
    #[serde(rename = "data_inicio")]
    start_period: &'a str,
    #[serde(rename = "data_fim")]
    end_period: &'a str,
}

/// Body returned by `POST /faturas`
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceFilesResponse {
    #[serde(default)]
    pub message: Option<String>,
    /// Paths of the downloaded PDFs on the upstream host's filesystem
    #[serde(default)]
    pub pdfs: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct InvoiceDataRequest<'a> {
    pdf_path: &'a str,
}

/// Billing data extracted from one invoice.
///
/// The record is relayed exactly as the upstream produced it; the accessors
/// only read the fields this crate knows about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceData(Value);

/// One `tarifas` entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TariffEntry {
    #[serde(rename = "periodo")]
    pub period: String,
    #[serde(rename = "valor")]
    pub value: f64,
}

/// One `impostos` entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaxEntry {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "valor")]
    pub value: f64,
}

impl InvoiceData {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Raw field lookup
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Start of the reading period (`leituraInicio`)
    pub fn reading_start(&self) -> Option<&str> {
        self.get("leituraInicio").and_then(Value::as_str)
    }

    /// End of the reading period (`leituraFim`)
    pub fn reading_end(&self) -> Option<&str> {
        self.get("leituraFim").and_then(Value::as_str)
    }

    /// Peak consumption (`consumoPonta`)
    pub fn peak_consumption(&self) -> Option<f64> {
        self.get("consumoPonta").and_then(Value::as_f64)
    }

    /// Off-peak consumption (`consumoForaPonta`)
    pub fn off_peak_consumption(&self) -> Option<f64> {
        self.get("consumoForaPonta").and_then(Value::as_f64)
    }

    /// Contracted demand (`demandaContratada`), absent on some tariff groups
    pub fn contracted_demand(&self) -> Option<f64> {
        self.get("demandaContratada").and_then(Value::as_f64)
    }

    /// Invoice total (`valorTotal`)
    pub fn total_amount(&self) -> Option<f64> {
        self.get("valorTotal").and_then(Value::as_f64)
    }

    /// Tariff values per period (`tarifas`); malformed entries are skipped
    pub fn tariffs(&self) -> Vec<TariffEntry> {
        self.entries("tarifas")
    }

    /// Taxes (`impostos`); malformed entries are skipped
    pub fn taxes(&self) -> Vec<TaxEntry> {
        self.entries("impostos")
    }

    fn entries<T: DeserializeOwned>(&self, field: &str) -> Vec<T> {
        self.get(field)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| T::deserialize(item).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Display name for a disclosed path: its final segment
pub fn file_name_of(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Whether an upstream payload counts as absent: `null`, `false`, zero or
/// the empty string.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

impl SegerClient {
    /// Ask the upstream to fetch invoices for the given installations and
    /// period, then read every disclosed PDF from local disk.
    ///
    /// Reads run concurrently; the result keeps the upstream's path order and
    /// the first failed read fails the whole call.
    pub async fn get_invoice_files(
        &self,
        installation_codes: &[String],
        start_period: &str,
        end_period: &str,
    ) -> Result<Vec<InvoiceFile>> {
        let request = InvoiceFilesRequest {
            installation_codes,
            start_period,
            end_period,
        };
        let value = self
            .request_json("/faturas", Method::POST, Some(&request))
            .await?;

        let missing = || Error::UpstreamDataMissing {
            context: "could not obtain invoice PDF files".to_string(),
        };
        if is_falsy(&value) {
            return Err(missing());
        }
        let response: InvoiceFilesResponse = serde_json::from_value(value)?;
        if let Some(message) = &response.message {
            tracing::debug!(message = %message, "Upstream invoice download finished");
        }
        let paths = response.pdfs.ok_or_else(missing)?;

        read_invoice_files(&paths).await
    }

    /// Extract billing data from an invoice previously returned by
    /// [`SegerClient::get_invoice_files`].
    pub async fn get_invoice_data(&self, pdf_path: &str) -> Result<InvoiceData> {
        let request = InvoiceDataRequest { pdf_path };
        let value = self
            .request_json("/dados-fatura", Method::POST, Some(&request))
            .await?;

        if is_falsy(&value) {
            return Err(Error::UpstreamDataMissing {
                context: format!("could not obtain invoice data for {}", pdf_path),
            });
        }
        Ok(InvoiceData::new(value))
    }
}

async fn read_invoice_files(paths: &[String]) -> Result<Vec<InvoiceFile>> {
    tracing::debug!(count = paths.len(), "Reading invoice files");

    try_join_all(paths.iter().map(|path| async move {
        let content = tokio::fs::read(path).await?;
        Ok::<_, Error>(InvoiceFile {
            name: file_name_of(path),
            content,
        })
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_name_of() {
        assert_eq!(file_name_of("/tmp/x/inv1.pdf"), "inv1.pdf");
        assert_eq!(file_name_of("faturas_edp/0160011111/JAN-2025.pdf"), "JAN-2025.pdf");
        assert_eq!(file_name_of("inv1.pdf"), "inv1.pdf");
        assert_eq!(file_name_of("/tmp/x/"), "x");
        assert_eq!(file_name_of("/"), "/");
    }

    #[test]
    fn test_is_falsy() {
        assert!(is_falsy(&Value::Null));
        assert!(is_falsy(&json!(false)));
        assert!(is_falsy(&json!(0)));
        assert!(is_falsy(&json!(0.0)));
        assert!(is_falsy(&json!("")));

        assert!(!is_falsy(&json!(true)));
        assert!(!is_falsy(&json!(1)));
        assert!(!is_falsy(&json!("0")));
        assert!(!is_falsy(&json!([])));
        assert!(!is_falsy(&json!({})));
    }

    #[test]
    fn test_invoice_files_request_wire_names() {
        let codes = vec!["0160011111".to_string()];
        let request = InvoiceFilesRequest {
            installation_codes: &codes,
            start_period: "JAN-2025",
            end_period: "MAR-2025",
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "codInstalacoes": ["0160011111"],
                "data_inicio": "JAN-2025",
                "data_fim": "MAR-2025"
            })
        );
    }

    #[test]
    fn test_invoice_files_response_without_pdfs() {
        let response: InvoiceFilesResponse =
            serde_json::from_value(json!({"message": "nada"})).unwrap();
        assert_eq!(response.message.as_deref(), Some("nada"));
        assert!(response.pdfs.is_none());
    }

    #[test]
    fn test_invoice_data_accessors() {
        let data = InvoiceData::new(json!({
            "leituraInicio": "02/01/2025",
            "leituraFim": "31/01/2025",
            "consumoPonta": 1520.0,
            "consumoForaPonta": 18340.5,
            "valorTotal": 12345.67,
            "tarifas": [
                {"periodo": "ponta", "valor": 2.1},
                {"periodo": "fora ponta", "valor": 0.45},
                {"periodo": 3}
            ],
            "impostos": [{"nome": "ICMS", "valor": 1800.0}],
            "bandeira": "verde"
        }));

        assert_eq!(data.reading_start(), Some("02/01/2025"));
        assert_eq!(data.reading_end(), Some("31/01/2025"));
        assert_eq!(data.peak_consumption(), Some(1520.0));
        assert_eq!(data.off_peak_consumption(), Some(18340.5));
        assert_eq!(data.contracted_demand(), None);
        assert_eq!(data.total_amount(), Some(12345.67));
        assert_eq!(
            data.tariffs(),
            vec![
                TariffEntry {
                    period: "ponta".to_string(),
                    value: 2.1
                },
                TariffEntry {
                    period: "fora ponta".to_string(),
                    value: 0.45
                },
            ]
        );
        assert_eq!(data.taxes().len(), 1);
        assert_eq!(data.get("bandeira"), Some(&json!("verde")));
    }

    #[test]
    fn test_invoice_data_serializes_unchanged() {
        let text = r#"{"valorTotal":123.45,"zeta":1,"alpha":[1,2]}"#;
        let data: InvoiceData = serde_json::from_str(text).unwrap();
        assert_eq!(serde_json::to_string(&data).unwrap(), text);
    }

    #[tokio::test]
    async fn test_read_invoice_files_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("inv1.pdf");
        std::fs::write(&present, b"%PDF").unwrap();

        let paths = vec![
            present.to_string_lossy().to_string(),
            dir.path().join("missing.pdf").to_string_lossy().to_string(),
        ];
        let result = read_invoice_files(&paths).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn test_read_invoice_files_empty() {
        let files = read_invoice_files(&[]).await.unwrap();
        assert!(files.is_empty());
    }
}

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;

use crate::fragment::extract_sections;
use crate::{
    ActionReply, FailureKind, FormPayload, NetError, PaymentReply, PendingConfirmation,
    SectionSnapshot, UploadReply,
};

#[derive(Debug, Clone)]
pub struct NetSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Anti-forgery token attached to every mutating request. Retrieval is
    /// the embedding page's concern; the value is an input here.
    pub csrf_token: String,
}

impl Default for NetSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            csrf_token: String::new(),
        }
    }
}

/// The record page's server endpoints, decoupled from reqwest for tests and
/// alternative transports.
#[async_trait::async_trait]
pub trait Api: Send + Sync {
    async fn fetch_checklist(&self, url: &str) -> Result<Vec<SectionSnapshot>, NetError>;
    async fn upload_document(&self, url: &str, form: FormPayload) -> Result<UploadReply, NetError>;
    async fn confirm_document(
        &self,
        url: &str,
        fields: &[(String, String)],
    ) -> Result<ActionReply, NetError>;
    async fn save_payment(&self, url: &str, form: FormPayload) -> Result<PaymentReply, NetError>;
    /// Plain POST used by delete, verify-all and verify-toggle.
    async fn post_action(&self, url: &str) -> Result<ActionReply, NetError>;
    /// Returns the price for a service, formatted with two decimals.
    async fn fetch_price(&self, url: &str) -> Result<String, NetError>;
}

pub struct HttpApi {
    client: reqwest::Client,
    csrf_token: String,
}

impl HttpApi {
    pub fn new(settings: NetSettings) -> Result<Self, NetError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| NetError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            client,
            csrf_token: settings.csrf_token,
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("X-Requested-With", "XMLHttpRequest")
            .header(CACHE_CONTROL, "no-store")
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("X-Requested-With", "XMLHttpRequest")
            .header("X-CSRFToken", &self.csrf_token)
    }

    async fn read_text(response: reqwest::Response) -> Result<String, NetError> {
        let status = response.status();
        if !status.is_success() {
            return Err(NetError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        response.text().await.map_err(map_transport_error)
    }

    async fn post_status_body(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<StatusBody, NetError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let text = Self::read_text(response).await?;
        decode_status_body(&text)
    }
}

#[async_trait::async_trait]
impl Api for HttpApi {
    async fn fetch_checklist(&self, url: &str) -> Result<Vec<SectionSnapshot>, NetError> {
        let response = self.get(url).send().await.map_err(map_transport_error)?;
        let html = Self::read_text(response).await?;
        Ok(extract_sections(&html))
    }

    async fn upload_document(&self, url: &str, form: FormPayload) -> Result<UploadReply, NetError> {
        let body = self
            .post_status_body(self.post(url).multipart(multipart_form(form)?))
            .await?;

        if !body.pending_confirmation.unwrap_or(false) {
            return Ok(UploadReply {
                message: body.message,
                doc_id: body.doc_id,
                pending: None,
            });
        }

        let parsed = body
            .parsed
            .ok_or_else(|| malformed("pending confirmation without parsed fields"))?;
        let confirm_url = body
            .confirm_url
            .ok_or_else(|| malformed("pending confirmation without confirm_url"))?;
        let doc_id = body
            .doc_id
            .ok_or_else(|| malformed("pending confirmation without doc_id"))?;
        let (fields, raw_text) = parsed.into_fields();
        Ok(UploadReply {
            message: body.message,
            doc_id: Some(doc_id),
            pending: Some(PendingConfirmation {
                fields,
                raw_text,
                confirm_url,
                doc_id,
            }),
        })
    }

    async fn confirm_document(
        &self,
        url: &str,
        fields: &[(String, String)],
    ) -> Result<ActionReply, NetError> {
        let body = self.post_status_body(self.post(url).form(fields)).await?;
        Ok(ActionReply {
            message: body.message,
        })
    }

    async fn save_payment(&self, url: &str, form: FormPayload) -> Result<PaymentReply, NetError> {
        let body = self
            .post_status_body(self.post(url).multipart(multipart_form(form)?))
            .await?;
        Ok(PaymentReply {
            payment_id: body
                .payment_id
                .ok_or_else(|| malformed("payment response without payment_id"))?,
            html: body
                .html
                .ok_or_else(|| malformed("payment response without html"))?,
            message: body.message,
        })
    }

    async fn post_action(&self, url: &str) -> Result<ActionReply, NetError> {
        let body = self.post_status_body(self.post(url)).await?;
        Ok(ActionReply {
            message: body.message,
        })
    }

    async fn fetch_price(&self, url: &str) -> Result<String, NetError> {
        let response = self.get(url).send().await.map_err(map_transport_error)?;
        let text = Self::read_text(response).await?;
        let body: PriceBody = serde_json::from_str(&text)
            .map_err(|err| NetError::new(FailureKind::Decode, err.to_string()))?;
        Ok(format_price(&body.price))
    }
}

/// Common shape of the JSON bodies returned by the mutating endpoints.
#[derive(Debug, Deserialize)]
struct StatusBody {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    pending_confirmation: Option<bool>,
    #[serde(default)]
    parsed: Option<ParsedBody>,
    #[serde(default)]
    confirm_url: Option<String>,
    #[serde(default)]
    doc_id: Option<u64>,
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    payment_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ParsedBody {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    case_number: Option<String>,
    #[serde(default)]
    fingerprints_date: Option<String>,
    #[serde(default)]
    fingerprints_time: Option<String>,
    #[serde(default)]
    fingerprints_location: Option<String>,
    #[serde(default)]
    decision_date: Option<String>,
    #[serde(default)]
    raw_text: Option<String>,
}

impl ParsedBody {
    /// Flattens into ordered (name, value) pairs for the confirm step;
    /// missing fields become empty inputs, never omissions.
    fn into_fields(self) -> (Vec<(String, String)>, String) {
        let raw_text = self.raw_text.unwrap_or_default();
        let pairs = [
            ("first_name", self.first_name),
            ("last_name", self.last_name),
            ("case_number", self.case_number),
            ("fingerprints_date", self.fingerprints_date),
            ("fingerprints_time", self.fingerprints_time),
            ("fingerprints_location", self.fingerprints_location),
            ("decision_date", self.decision_date),
        ];
        let fields = pairs
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.unwrap_or_default()))
            .collect();
        (fields, raw_text)
    }
}

#[derive(Debug, Deserialize)]
struct PriceBody {
    price: serde_json::Value,
}

fn decode_status_body(text: &str) -> Result<StatusBody, NetError> {
    let body: StatusBody = serde_json::from_str(text)
        .map_err(|err| NetError::new(FailureKind::Decode, err.to_string()))?;
    if body.status != "success" {
        let message = body.message.clone();
        return Err(NetError::new(
            FailureKind::Rejected {
                message: message.clone(),
                errors: body.errors.unwrap_or_default(),
            },
            message.unwrap_or_else(|| "rejected".to_string()),
        ));
    }
    Ok(body)
}

fn multipart_form(form: FormPayload) -> Result<reqwest::multipart::Form, NetError> {
    let mut multipart = reqwest::multipart::Form::new();
    for (name, value) in form.fields {
        multipart = multipart.text(name, value);
    }
    if let Some(file) = form.file {
        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.mime)
            .map_err(|err| NetError::new(FailureKind::Network, err.to_string()))?;
        multipart = multipart.part(file.field, part);
    }
    Ok(multipart)
}

/// Accepts both string and numeric prices; anything unusable becomes "0.00".
fn format_price(value: &serde_json::Value) -> String {
    let amount = match value {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    amount
        .filter(|amount| amount.is_finite())
        .map(|amount| format!("{amount:.2}"))
        .unwrap_or_else(|| "0.00".to_string())
}

fn malformed(message: &str) -> NetError {
    NetError::new(FailureKind::Decode, message)
}

fn map_transport_error(err: reqwest::Error) -> NetError {
    if err.is_timeout() {
        return NetError::new(FailureKind::Network, format!("timeout: {err}"));
    }
    NetError::new(FailureKind::Network, err.to_string())
}

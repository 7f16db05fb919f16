use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// RFC 3986 unreserved characters stay literal; everything else is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Per-record URLs supplied by the rendered page, with placeholder templates
/// for the endpoints that embed an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub checklist_refresh: String,
    /// Contains `__doc_type__`.
    pub upload_template: String,
    pub payment_create: String,
    /// Contains `__payment_id__`.
    pub payment_update_template: String,
    /// Contains `__document_id__`.
    pub document_delete_template: String,
    pub verify_all: String,
    /// Contains `__document_id__`.
    pub verify_toggle_template: String,
    /// Contains `__service__`.
    pub price_template: String,
}

impl Endpoints {
    pub fn upload_url(&self, document_type: &str) -> String {
        self.upload_template
            .replace("__doc_type__", &escape(document_type))
    }

    pub fn payment_url(&self, existing_id: Option<u64>) -> String {
        match existing_id {
            Some(id) => self
                .payment_update_template
                .replace("__payment_id__", &id.to_string()),
            None => self.payment_create.clone(),
        }
    }

    pub fn document_delete_url(&self, document_id: u64) -> String {
        self.document_delete_template
            .replace("__document_id__", &document_id.to_string())
    }

    pub fn verify_toggle_url(&self, document_id: u64) -> String {
        self.verify_toggle_template
            .replace("__document_id__", &document_id.to_string())
    }

    pub fn price_url(&self, service: &str) -> String {
        self.price_template.replace("__service__", &escape(service))
    }
}

fn escape(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

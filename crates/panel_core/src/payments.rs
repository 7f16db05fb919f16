/// One entry of the payment list, tagged with its server-assigned id.
///
/// Ids are never assigned locally; an entry only exists once the server has
/// confirmed the create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentEntry {
    pub id: u64,
    pub markup: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentList {
    entries: Vec<PaymentEntry>,
    placeholder: bool,
}

impl Default for PaymentList {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            placeholder: true,
        }
    }
}

impl PaymentList {
    /// Seeds the list with server-rendered entries from the initial page.
    pub fn from_entries(entries: Vec<PaymentEntry>) -> Self {
        let placeholder = entries.is_empty();
        Self {
            entries,
            placeholder,
        }
    }

    pub fn entries(&self) -> &[PaymentEntry] {
        &self.entries
    }

    pub fn has_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Prepends a confirmed entry, removing the empty-list placeholder once.
    pub(crate) fn insert(&mut self, id: u64, markup: String) {
        self.placeholder = false;
        self.entries.insert(0, PaymentEntry { id, markup });
    }

    /// Replaces the entry tagged with `id`. A missing entry is silently
    /// ignored; a concurrent refresh may already have removed it.
    pub(crate) fn update(&mut self, id: u64, markup: String) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == id) {
            entry.markup = markup;
        }
    }
}

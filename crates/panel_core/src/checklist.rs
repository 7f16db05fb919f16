use std::collections::BTreeSet;

/// One named sub-section of the document checklist fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: String,
    pub markup: String,
    pub open: bool,
}

/// Replaces the checklist content wholesale, then restores the expansion set.
///
/// Identifiers from `expansion` that do not exist in the new content are
/// silently dropped. Idempotent: applying the same snapshot and expansion set
/// twice yields the same visible state.
pub(crate) fn reconcile(
    current: &mut Vec<Section>,
    incoming: Vec<Section>,
    expansion: &BTreeSet<String>,
) {
    *current = incoming;
    for section in current.iter_mut() {
        if expansion.contains(&section.id) {
            section.open = true;
        }
    }
}

/// Identifiers of the sections currently open, captured before a refresh.
pub(crate) fn expansion_set(sections: &[Section]) -> BTreeSet<String> {
    sections
        .iter()
        .filter(|section| section.open)
        .map(|section| section.id.clone())
        .collect()
}

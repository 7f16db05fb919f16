use scraper::{Html, Selector};

use crate::SectionSnapshot;

/// Splits a server-rendered checklist fragment into its named sub-sections.
///
/// Sections are the collapsible bodies carrying an element id; the open state
/// follows the `show` class. Elements without an id cannot take part in
/// expansion restore and are skipped.
pub fn extract_sections(html: &str) -> Vec<SectionSnapshot> {
    let document = Html::parse_fragment(html);
    let selector = match Selector::parse(".accordion-collapse") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let id = element.value().attr("id")?;
            let open = element.value().classes().any(|class| class == "show");
            Some(SectionSnapshot {
                id: id.to_string(),
                markup: element.inner_html(),
                open,
            })
        })
        .collect()
}

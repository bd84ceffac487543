// src/extractors/incidents.rs
use crate::extractors::models::Incident;
use crate::extractors::stats::normalized_text;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static INCIDENT_ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("table tbody tr").expect("Failed to compile INCIDENT_ROW_SELECTOR")
});

static CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("td").expect("Failed to compile CELL_SELECTOR")
});

/// Rows of the violations table as `date | location | summary`.
/// Rows with fewer than three cells (headers, spacers) are skipped.
pub fn extract_incidents(document: &Html) -> Vec<Incident> {
    let mut rows = Vec::new();

    for tr in document.select(&INCIDENT_ROW_SELECTOR) {
        let cells: Vec<String> = tr.select(&CELL_SELECTOR).map(normalized_text).collect();
        let [date, location, summary, ..] = cells.as_slice() else {
            tracing::trace!("Skipping table row with {} cells", cells.len());
            continue;
        };
        rows.push(Incident {
            date: date.clone(),
            location: location.clone(),
            summary: summary.clone(),
        });
    }

    tracing::debug!("Found {} incident rows", rows.len());
    rows
}

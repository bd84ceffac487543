// src/extractors/stats.rs

// --- Imports ---
use crate::extractors::incidents;
use crate::extractors::models::{Record, Year};
use crate::extractors::numbers::{self, INTEGER_PATTERN};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;

// --- Constants ---
/// Years the yearly total cards are labelled with, oldest first. The page does
/// not print the year next to each total, so they are paired by position.
pub const CANDIDATE_YEARS: [&str; 3] = ["2023", "2024", "2025"];
/// A monthly series never holds more than a year's worth of values.
pub const MAX_MONTHS: usize = 12;

// --- CSS Selectors (Lazy Static) ---
static YEARLY_TOTAL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".total-wrapper .total").expect("Failed to compile YEARLY_TOTAL_SELECTOR")
});

static CATEGORY_CARD_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".category-card").expect("Failed to compile CATEGORY_CARD_SELECTOR")
});

static CARD_LABEL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".label").expect("Failed to compile CARD_LABEL_SELECTOR")
});

static CARD_TOTAL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".total").expect("Failed to compile CARD_TOTAL_SELECTOR")
});

static BREAKDOWN_LINE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".breakdown, li").expect("Failed to compile BREAKDOWN_LINE_SELECTOR")
});

// Narrow candidates by substring; the class token regexes below decide.
static MONTHLY_CANDIDATE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("[class*='monthly']").expect("Failed to compile MONTHLY_CANDIDATE_SELECTOR")
});

static SEGMENT_CANDIDATE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("[class*='segment-']").expect("Failed to compile SEGMENT_CANDIDATE_SELECTOR")
});

static LIST_ITEM_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("li").expect("Failed to compile LIST_ITEM_SELECTOR")
});

// --- Regex Patterns (Lazy Static) ---
static MONTHLY_CLASS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"monthly[-_]?(\d{4})").expect("Failed to compile MONTHLY_CLASS_RE")
});

// segment-<name>-<year>, where <name> may itself contain dashes
static SEGMENT_CLASS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^segment-([A-Za-z0-9_]+(?:-[A-Za-z0-9_]+)*?)-(\d{4})$")
        .expect("Failed to compile SEGMENT_CLASS_RE")
});

// "808,648 [2024]" or "[2024] 808,648"
static BREAKDOWN_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?:({int})\s*\[(\d{{4}})\])|(?:\[(\d{{4}})\]\s*({int}))",
        int = INTEGER_PATTERN
    );
    Regex::new(&pattern).expect("Failed to compile BREAKDOWN_RE")
});

/// `(pattern, highlight type)` pairs for the annotated debug copy of the page.
pub const DEBUG_MARKER_PATTERNS: &[(&str, &str)] = &[
    (r#"<[^>]*class="[^"]*\btotal\b[^"]*"[^>]*>"#, "total"),
    (r#"<[^>]*class="[^"]*monthly[-_]?\d{4}[^"]*"[^>]*>"#, "monthly"),
    (r#"<[^>]*class="[^"]*\bcategory-card\b[^"]*"[^>]*>"#, "card"),
    (r#"<[^>]*class="[^"]*\bsegment-[\w-]+-\d{4}\b[^"]*"[^>]*>"#, "segment"),
    (r"\[\d{4}\]", "year"),
];

// --- Main Extractor ---
#[derive(Debug, Default)]
pub struct StatsExtractor;

impl StatsExtractor {
    pub fn new() -> Self { Self {} }

    /// Extracts every statistic on the page, stamped with the current time.
    pub fn extract(&self, html: &str) -> Record {
        self.extract_at(html, chrono::Utc::now().to_rfc3339())
    }

    /// Same as [`extract`](Self::extract) with an explicit `scraped_at` value.
    ///
    /// Each pass runs independently; missing markup leaves its field empty.
    pub fn extract_at(&self, html: &str, scraped_at: impl Into<String>) -> Record {
        let document = Html::parse_document(html);
        let mut record = Record::empty(scraped_at);

        record.yearly_totals = self.yearly_totals(&document);
        record.monthly_totals = self.monthly_totals(&document);
        let (totals, breakdowns) = self.categories(&document);
        record.category_totals = totals;
        record.category_breakdowns = breakdowns;
        record.segments = self.segments(&document);
        record.incidents = incidents::extract_incidents(&document);

        tracing::debug!("Extraction finished: {}", record.summary());
        record
    }

    /// Pairs the yearly total cards with [`CANDIDATE_YEARS`] by position.
    fn yearly_totals(&self, document: &Html) -> BTreeMap<Year, u64> {
        let values: Vec<u64> = document
            .select(&YEARLY_TOTAL_SELECTOR)
            .filter(|el| !has_ancestor_matching(*el, &CATEGORY_CARD_SELECTOR))
            .filter_map(|el| numbers::first_integer(&joined_text(el)))
            .collect();

        if values.len() > CANDIDATE_YEARS.len() {
            tracing::warn!(
                "Found {} yearly totals but only {} candidate years; extra values ignored",
                values.len(),
                CANDIDATE_YEARS.len()
            );
        }

        CANDIDATE_YEARS
            .iter()
            .zip(values)
            .map(|(year, value)| (year.to_string(), value))
            .collect()
    }

    fn monthly_totals(&self, document: &Html) -> BTreeMap<Year, Vec<u64>> {
        let mut monthly: BTreeMap<Year, Vec<u64>> = BTreeMap::new();

        if document.select(&MONTHLY_CANDIDATE_SELECTOR).next().is_none() {
            return monthly;
        }

        // Each text node counts once, for the innermost monthly wrapper around it.
        for node in document.root_element().descendants() {
            let Some(text) = node.value().as_text() else { continue };
            let Some(parent) = node.parent().and_then(ElementRef::wrap) else { continue };
            let Some((_, year)) = nearest_tagged(parent, monthly_year) else { continue };

            monthly
                .entry(year)
                .or_default()
                .extend(numbers::integers_excluding_years(text));
        }

        for (year, values) in monthly.iter_mut() {
            if values.len() > MAX_MONTHS {
                tracing::debug!("Truncating {} monthly values for {} to {}", values.len(), year, MAX_MONTHS);
                values.truncate(MAX_MONTHS);
            }
        }
        monthly.retain(|_, values| !values.is_empty());
        monthly
    }

    /// Label to total, plus label to year to value from the bracketed lines.
    fn categories(
        &self,
        document: &Html,
    ) -> (BTreeMap<String, u64>, BTreeMap<String, BTreeMap<Year, u64>>) {
        let mut totals = BTreeMap::new();
        let mut breakdowns = BTreeMap::new();

        for card in document.select(&CATEGORY_CARD_SELECTOR) {
            let Some(label_el) = card.select(&CARD_LABEL_SELECTOR).next() else { continue };
            let label = normalized_text(label_el);
            if label.is_empty() {
                tracing::trace!("Skipping category card without label text");
                continue;
            }

            let total_el = card.select(&CARD_TOTAL_SELECTOR).next();
            match total_el.and_then(|el| numbers::first_integer(&joined_text(el))) {
                Some(total) => {
                    totals.insert(label.clone(), total);
                }
                None => tracing::debug!("Category '{}' has no parseable total", label),
            }

            let mut lines: Vec<String> = card.select(&BREAKDOWN_LINE_SELECTOR).map(joined_text).collect();
            if lines.is_empty() {
                // The total sits right before the first annotation, so leave it out.
                let excluded: Vec<ElementRef> = std::iter::once(label_el).chain(total_el).collect();
                lines.push(text_outside(card, &excluded));
            }

            let per_year: BTreeMap<Year, u64> = lines.iter().flat_map(|line| breakdown_pairs(line)).collect();
            if !per_year.is_empty() {
                breakdowns.insert(label, per_year);
            }
        }

        (totals, breakdowns)
    }

    fn segments(&self, document: &Html) -> BTreeMap<String, BTreeMap<Year, Vec<u64>>> {
        let mut segments: BTreeMap<String, BTreeMap<Year, Vec<u64>>> = BTreeMap::new();

        for wrapper in document.select(&SEGMENT_CANDIDATE_SELECTOR) {
            let Some((name, year)) = segment_token(wrapper) else { continue };

            // Values belong to the innermost segment wrapper around them.
            let owns = |el: ElementRef| {
                nearest_tagged(el, segment_token).map(|(owner, _)| owner.id()) == Some(wrapper.id())
            };

            let mut values: Vec<u64> = wrapper
                .select(&LIST_ITEM_SELECTOR)
                .filter(|li| owns(*li))
                .flat_map(|li| {
                    let text = joined_text(li);
                    numbers::integer_tokens(&text)
                        .filter_map(numbers::parse_token)
                        .collect::<Vec<_>>()
                })
                .collect();

            if values.is_empty() {
                values = wrapper
                    .descendants()
                    .filter_map(|node| {
                        let text = node.value().as_text()?;
                        let parent = node.parent().and_then(ElementRef::wrap)?;
                        owns(parent).then(|| numbers::integers_excluding_years(text))
                    })
                    .flatten()
                    .collect();
            }

            tracing::trace!("Segment {} {}: {} values", name, year, values.len());
            if values.is_empty() {
                continue;
            }
            segments
                .entry(name)
                .or_default()
                .entry(year)
                .or_default()
                .extend(values);
        }

        segments
    }
}

// --- Helpers ---

/// Text nodes joined with single spaces so adjacent cells never fuse digits.
fn joined_text(element: ElementRef) -> String {
    element.text().collect::<Vec<_>>().join(" ")
}

/// Whitespace-collapsed text, used for labels.
pub(crate) fn normalized_text(element: ElementRef) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

/// Text of `element` minus anything inside one of the `excluded` descendants.
fn text_outside(element: ElementRef, excluded: &[ElementRef]) -> String {
    element
        .descendants()
        .filter_map(|node| node.value().as_text().map(|text| (node, text)))
        .filter(|(node, _)| {
            !node
                .ancestors()
                .any(|ancestor| excluded.iter().any(|el| el.id() == ancestor.id()))
        })
        .map(|(_, text)| &**text)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Closest element, starting at `element` itself, for which `tag` yields a value.
fn nearest_tagged<'a, T>(
    element: ElementRef<'a>,
    tag: impl Fn(ElementRef<'a>) -> Option<T>,
) -> Option<(ElementRef<'a>, T)> {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .find_map(|el| tag(el).map(|value| (el, value)))
}

fn has_ancestor_matching(element: ElementRef, selector: &Selector) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| selector.matches(&ancestor))
}

/// Year encoded in a `monthly-YYYY` style class token.
fn monthly_year(element: ElementRef) -> Option<Year> {
    element
        .value()
        .classes()
        .find_map(|class| MONTHLY_CLASS_RE.captures(class).map(|c| c[1].to_string()))
}

/// `(segment, year)` from a `segment-<name>-<YYYY>` class token.
fn segment_token(element: ElementRef) -> Option<(String, Year)> {
    element.value().classes().find_map(|class| {
        SEGMENT_CLASS_RE
            .captures(class)
            .map(|c| (c[1].to_string(), c[2].to_string()))
    })
}

fn breakdown_pairs(line: &str) -> Vec<(Year, u64)> {
    BREAKDOWN_RE
        .captures_iter(line)
        .filter_map(|caps| {
            let (value, year) = match (caps.get(1), caps.get(2)) {
                (Some(v), Some(y)) => (v, y),
                _ => (caps.get(4)?, caps.get(3)?),
            };
            numbers::parse_token(value.as_str()).map(|v| (year.as_str().to_string(), v))
        })
        .collect()
}

// src/utils/html_debug.rs
use std::fs;
use std::path::Path;
use regex::Regex;
use crate::utils::error::AppError;

/// Saves a copy of the page with the given byte ranges wrapped in highlight spans.
/// Ranges overlapping an earlier highlight are skipped.
pub fn save_debug_html(html: &str, path: &Path, highlights: &[(usize, usize, &str)]) -> Result<(), AppError> {
    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");
    debug_html.push_str(".highlight-total { background-color: #FFFF00; }\n");
    debug_html.push_str(".highlight-monthly { background-color: #90EE90; }\n");
    debug_html.push_str(".highlight-card { background-color: #FFA500; }\n");
    debug_html.push_str(".highlight-segment { background-color: #ADD8E6; }\n");
    debug_html.push_str(".highlight-custom { background-color: #FFC0CB; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    let mut last_pos = 0;
    let mut sorted_highlights = highlights.to_vec();
    sorted_highlights.sort_by_key(|h| h.0);

    for (start, end, highlight_type) in sorted_highlights {
        if start < last_pos || end > html.len() {
            tracing::trace!("Skipping overlapping highlight {}-{} ({})", start, end, highlight_type);
            continue;
        }
        debug_html.push_str(&html[last_pos..start]);

        let css_class = match highlight_type {
            "total" => "highlight-total",
            "monthly" => "highlight-monthly",
            "card" => "highlight-card",
            "segment" => "highlight-segment",
            _ => "highlight-custom",
        };

        debug_html.push_str(&format!("<span class=\"{}\" title=\"Position: {}-{}, Type: {}\">",
            css_class, start, end, highlight_type));
        debug_html.push_str(&html[start..end]);
        debug_html.push_str("</span>");

        last_pos = end;
    }

    if last_pos < html.len() {
        debug_html.push_str(&html[last_pos..]);
    }
    debug_html.push_str("\n</body>\n</html>");

    fs::write(path, debug_html)?;

    tracing::info!("Saved debug HTML to {}", path.display());
    Ok(())
}

/// Creates an annotated copy of the page with every match of the given
/// `(pattern, highlight_type)` pairs highlighted.
pub fn create_debug_html(html: &str, path: &Path, patterns: &[(&str, &str)]) -> Result<(), AppError> {
    let mut highlights = Vec::new();

    for (pattern, highlight_type) in patterns {
        let re = Regex::new(pattern).map_err(|e| {
            AppError::Config(format!("Invalid regex pattern '{}': {}", pattern, e))
        })?;

        for mat in re.find_iter(html) {
            highlights.push((mat.start(), mat.end(), *highlight_type));
        }
    }
    tracing::debug!("Found {} marker matches for debug annotation", highlights.len());

    save_debug_html(html, path, &highlights)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("drone_stats_debug_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn test_matches_are_wrapped_in_spans() {
        let path = scratch_file("annotated.html");
        let html = r#"<div class="total-wrapper"><div class="total">1,000</div></div>"#;

        create_debug_html(html, &path, &[(r#"<div class="total">"#, "total")]).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains(r#"<span class="highlight-total" title="Position: 27-46, Type: total"><div class="total"></span>"#));
        assert!(written.contains("1,000</div></div>"));
    }

    #[test]
    fn test_overlapping_highlights_are_skipped() {
        let path = scratch_file("overlap.html");
        save_debug_html("abcdef", &path, &[(0, 4, "card"), (2, 5, "segment")]).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written.matches("<span").count(), 1);
        assert!(written.contains("abcd</span>ef"));
    }

    #[test]
    fn test_invalid_pattern_is_a_config_error() {
        let path = scratch_file("invalid.html");
        let result = create_debug_html("<p></p>", &path, &[("(unclosed", "custom")]);
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}

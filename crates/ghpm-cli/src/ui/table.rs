//! Table rendering for list, search and info.

use comfy_table::presets::NOTHING;
use comfy_table::{ContentArrangement, Table};

/// Description column width in characters.
const DESCRIPTION_WIDTH: usize = 60;

/// Borderless table with a header row.
pub fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(header.to_vec());
    table
}

/// Shorten `text` to at most `max` characters, ending in `...` when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Shorten a repository description for a table cell.
pub fn description(text: Option<&str>) -> String {
    truncate(text.unwrap_or("").trim(), DESCRIPTION_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly-10", 10), "exactly-10");
        assert_eq!(truncate("a much longer text", 10), "a much ...");
    }

    #[test]
    fn test_table_has_header_and_rows() {
        let mut t = table(&["repo", "stars"]);
        t.add_row(vec!["sharkdp/bat", "48000"]);
        let rendered = t.to_string();
        assert!(rendered.contains("repo"));
        assert!(rendered.contains("sharkdp/bat"));
        assert!(rendered.contains("48000"));
    }

    #[test]
    fn test_description_defaults_to_empty() {
        assert_eq!(description(None), "");
        assert_eq!(description(Some("  A cat clone  ")), "A cat clone");
    }
}

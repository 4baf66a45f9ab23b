//! Line text utilities shared by both pipelines.

/// Characters treated as a literal bullet at the start of a line.
pub const BULLET_MARKERS: [char; 3] = ['-', '*', '•'];

/// Marker-plus-space prefixes stripped from inserted list text.
const BULLET_PREFIXES: [&str; 3] = ["- ", "* ", "• "];

/// Collapse carriage returns and newlines to spaces, then trim.
///
/// # Example
/// ```
/// use docline::text::clean_line_text;
///
/// assert_eq!(clean_line_text("  Lead\r\ndeveloper \n"), "Lead  developer");
/// ```
pub fn clean_line_text(text: &str) -> String {
    text.replace(['\r', '\n'], " ").trim().to_string()
}

/// Check if a line starts with a literal bullet marker.
pub fn starts_with_bullet(text: &str) -> bool {
    text.trim_start().starts_with(BULLET_MARKERS)
}

/// Remove one leading `- `, `* ` or `• ` prefix.
pub fn strip_bullet_prefix(text: &str) -> &str {
    let text = text.trim_start();
    BULLET_PREFIXES
        .iter()
        .find_map(|prefix| text.strip_prefix(prefix))
        .unwrap_or(text)
}

/// Normalize text that is about to become a new line after an anchor.
///
/// The text is cleaned like any extracted line. When the anchor renders its
/// bullet through list formatting (and not as literal text), a literal
/// bullet prefix is dropped so the glyph is not doubled.
pub fn normalize_insertion_text(new_text: &str, anchor_text: &str, anchor_is_list: bool) -> String {
    let text = clean_line_text(new_text);
    if text.is_empty() {
        return text;
    }
    if anchor_is_list && !starts_with_bullet(&clean_line_text(anchor_text)) {
        return strip_bullet_prefix(&text).to_string();
    }
    text
}

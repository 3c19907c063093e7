// ============================================================================
// Log Sanitization - strip control sequences from user-provided text
// ============================================================================
//
// Uploaded file names and spreadsheet cells end up in log lines. A cell with
// an embedded newline or ANSI escape would otherwise forge or hide entries.
//
// ============================================================================

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum number of characters of user input written to a log line
const MAX_LOG_LENGTH: usize = 200;

static ANSI_ESCAPE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").unwrap());

/// Sanitize user input for safe logging
///
/// 1. Removes ANSI escape sequences
/// 2. Replaces newlines, carriage returns and tabs with spaces
/// 3. Drops remaining control characters (0x00-0x1F, 0x7F)
/// 4. Truncates to `MAX_LOG_LENGTH` characters, appending "..."
///
/// ```
/// use storefront_catalog::utils::log_sanitizer::sanitize_for_log;
///
/// assert_eq!(sanitize_for_log("products.xlsx\nINFO fake"), "products.xlsx INFO fake");
/// ```
pub fn sanitize_for_log(input: &str) -> String {
    let no_ansi = ANSI_ESCAPE_REGEX.replace_all(input, "");

    let cleaned: String = no_ansi
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            other => other,
        })
        .filter(|c| !c.is_control())
        .collect();

    if cleaned.chars().count() > MAX_LOG_LENGTH {
        let truncated: String = cleaned.chars().take(MAX_LOG_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        cleaned
    }
}

/// Sanitize a list of headers (or any short strings) into one bracketed line.
pub fn sanitize_list_for_log<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    let joined = items.into_iter().collect::<Vec<_>>().join(", ");
    format!("[{}]", sanitize_for_log(&joined))
}

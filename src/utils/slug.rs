use once_cell::sync::Lazy;
use regex::Regex;

static NON_SLUG_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Lowercase `name` and collapse every run of characters outside `[a-z0-9]`
/// into a single hyphen. Leading and trailing hyphens are kept.
pub fn slugify(name: &str) -> String {
    NON_SLUG_RUN
        .replace_all(&name.to_lowercase(), "-")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name() {
        assert_eq!(slugify("Widget"), "widget");
    }

    #[test]
    fn test_runs_collapse_to_single_hyphen() {
        assert_eq!(slugify("Rose  Quartz -- Bracelet"), "rose-quartz-bracelet");
    }

    #[test]
    fn test_edge_hyphens_kept() {
        assert_eq!(slugify("₹ Lucky Charm!"), "-lucky-charm-");
    }

    #[test]
    fn test_non_ascii_letters_replaced() {
        assert_eq!(slugify("Café Crème"), "caf-cr-me");
    }
}

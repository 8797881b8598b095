use chrono::NaiveDate;

/// Helper function to format the date
///
/// Formats a `NaiveDate` as `YYYY-MM-DD`, the format used in every alert and
/// in the forecast table.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Helper function to escape special characters for Telegram MarkdownV2
///
/// Every character with a meaning in MarkdownV2 is prefixed with a backslash so
/// that names like `Co-Amoxiclav (500mg)` are shown literally.
///
/// # Arguments
///
/// * `text` - A string slice containing the text to be escaped
///
/// # Returns
///
/// A `String` with all MarkdownV2 special characters escaped
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if "_*[]()~`>#+-=|{}.!\\".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Escapes text placed inside a MarkdownV2 `pre` block, where only the
/// backtick and the backslash are special.
pub fn escape_code(text: &str) -> String {
    text.replace('\\', "\\\\").replace('`', "\\`")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_iso_dates() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        assert_eq!(format_date(date), "2025-06-09");
    }

    #[test]
    fn escapes_markdown_specials() {
        assert_eq!(escape_markdown("Co-Amoxiclav (500mg)."), "Co\\-Amoxiclav \\(500mg\\)\\.");
        assert_eq!(escape_markdown("Aspirin"), "Aspirin");
    }

    #[test]
    fn escapes_code_block_specials_only() {
        assert_eq!(escape_code("a`b\\c-d"), "a\\`b\\\\c-d");
    }
}

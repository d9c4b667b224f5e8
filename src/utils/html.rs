// src/utils/html.rs

/// Sanitizes bank text with ammonia's whitelist: safe inline markup stays,
/// `<script>` and friends are removed together with their content.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_html_strips_script() {
        let cleaned = clean_html("Which <b>layer</b>?<script>alert(1)</script>");
        assert_eq!(cleaned, "Which <b>layer</b>?");
    }

    #[test]
    fn test_clean_html_trims_plain_text() {
        assert_eq!(clean_html("  TCP  "), "TCP");
    }
}

//! In-page scripts used by the driver.

/// Embed `selector` as a JavaScript string literal.
fn literal(selector: &str) -> String {
    serde_json::Value::String(selector.to_string()).to_string()
}

/// Evaluates to `true` once the first match is rendered and not hidden.
pub fn is_visible(selector: &str) -> String {
    format!(
        "(() => {{ \
           const el = document.querySelector({}); \
           if (!el) return false; \
           const style = window.getComputedStyle(el); \
           if (style.display === 'none' || style.visibility === 'hidden') return false; \
           const rect = el.getBoundingClientRect(); \
           return rect.width > 0 && rect.height > 0; \
         }})()",
        literal(selector)
    )
}

/// Evaluates to the `textContent` of every match, in document order.
///
/// A single-node text read only sees the first match, which is not enough
/// for the balance summary.
pub fn text_of_all(selector: &str) -> String {
    format!(
        "Array.from(document.querySelectorAll({}), el => el.textContent)",
        literal(selector)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_of_all() {
        assert_eq!(
            text_of_all(".balance-container .data-value"),
            r#"Array.from(document.querySelectorAll(".balance-container .data-value"), el => el.textContent)"#
        );
    }

    #[test]
    fn test_selector_quotes_are_escaped() {
        let js = is_visible(r#"input[name="user"]"#);
        assert!(js.contains(r#"document.querySelector("input[name=\"user\"]")"#));
    }

    #[test]
    fn test_single_quotes_pass_through() {
        let js = text_of_all("a[title='x']");
        assert!(js.contains(r#"querySelectorAll("a[title='x']")"#));
    }
}

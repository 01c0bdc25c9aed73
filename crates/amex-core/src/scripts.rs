//! In-page scripts evaluated through [`DomDriver::evaluate_script`].
//!
//! [`DomDriver::evaluate_script`]: amex_protocols::DomDriver::evaluate_script

/// Script that detaches every element matching `selector` and evaluates to
/// `true`.
///
/// The selector is embedded as a JSON string literal, so quotes and
/// backslashes inside it cannot break out of the script.
pub fn remove_elements(selector: &str) -> String {
    let literal = serde_json::Value::String(selector.to_string()).to_string();
    format!(
        "(() => {{ \
           const nodes = document.body.querySelectorAll({literal}); \
           for (const node of nodes) {{ node.parentNode.removeChild(node); }} \
           return true; \
         }})()"
    )
}

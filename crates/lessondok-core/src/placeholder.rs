//! Placeholder tokens
//!
//! Templates mark substitution points with `{{name}}`.

use std::sync::OnceLock;

use regex::Regex;

/// Composite token filled with the per-kind footer line
pub const FOOTER_TOKEN: &str = "footer";

/// Composite token filled with the generated document name
pub const TITLE_TOKEN: &str = "title";

/// Build the literal token for a field name
pub fn token(name: &str) -> String {
    format!("{{{{{}}}}}", name)
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{([A-Za-z_][A-Za-z0-9_.\-]*)\}\}").expect("placeholder pattern is valid")
    })
}

/// Names of all placeholders in `text`, in order of first appearance
pub fn placeholders_in(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in placeholder_regex().captures_iter(text) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

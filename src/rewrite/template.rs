//! Target template expansion.
//!
//! Templates are expanded in two passes against the text the rule matched:
//!
//! 1. the regex engine's own expansion resolves `$1`, `$name`, `${name}`
//!    and `$$`. Bare `:name` tokens are not expansion syntax and pass
//!    through as literal text.
//! 2. if the result still contains `:`, every `:name` of a named group is
//!    replaced textually by that group's capture, in group order.
//!
//! The second pass is a plain substring replacement. `:id` also matches the
//! front of `:identity`, so templates should not use overlapping names.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches the empty string with no groups. Expanding against its captures
/// resolves every reference to the empty string.
static NO_MATCH: Lazy<Regex> = Lazy::new(|| Regex::new("").expect("empty regex is valid"));

/// Expand `template` using the captures of `matcher` in `source`.
///
/// When `source` does not match, references expand to the empty string and
/// `:name` tokens are left in place.
pub fn expand(matcher: &Regex, source: &str, template: &str) -> String {
    if !template.contains(['$', ':']) {
        return template.to_string();
    }

    let caps = matcher.captures(source);

    let mut expanded = String::new();
    match &caps {
        Some(caps) => caps.expand(template, &mut expanded),
        None => {
            if let Some(empty) = NO_MATCH.captures("") {
                empty.expand(template, &mut expanded);
            }
        }
    }

    if !expanded.contains(':') {
        return expanded;
    }

    let Some(caps) = caps else {
        return expanded;
    };

    for (index, name) in matcher.capture_names().enumerate() {
        let Some(name) = name.filter(|n| !n.is_empty()) else {
            continue;
        };
        let value = caps.get(index).map_or("", |m| m.as_str());
        expanded = expanded.replace(&format!(":{}", name), value);
    }

    expanded
}

//! Stable `KEY=VALUE` output for scripts.
//!
//! One pair per line, keys in a fixed order, values unquoted. Empty values
//! are printed as `KEY=`.

/// Render `pairs` as `KEY=VALUE` lines.
#[must_use]
pub fn format_pairs(pairs: &[(&str, String)]) -> String {
    let mut out = String::new();
    for (key, value) in pairs {
        out.push_str(key);
        out.push('=');
        out.push_str(value);
        out.push('\n');
    }
    out
}

/// Keep only the pairs whose key is in `keys`, in `keys` order.
#[must_use]
pub fn select<'a>(pairs: &[(&'a str, String)], keys: &[&str]) -> Vec<(&'a str, String)> {
    keys.iter()
        .filter_map(|k| pairs.iter().find(|(key, _)| key == k).cloned())
        .collect()
}

/// Print `pairs` to stdout.
pub fn print_pairs(pairs: &[(&str, String)]) {
    print!("{}", format_pairs(pairs));
}

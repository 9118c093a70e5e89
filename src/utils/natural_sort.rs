use std::cmp::Ordering;
use std::path::{Path, PathBuf};

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum KeyPart {
    Number(u128),
    Text(String),
}

/// Sort key splitting a name into digit and non-digit runs, digits compared
/// numerically and text case-insensitively (`st2` < `st10`).
fn natural_key(name: &str) -> Vec<KeyPart> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_digits = false;

    for ch in name.chars() {
        let is_digit = ch.is_ascii_digit();
        if !current.is_empty() && is_digit != in_digits {
            parts.push(make_part(&current, in_digits));
            current.clear();
        }
        in_digits = is_digit;
        current.push(ch);
    }
    if !current.is_empty() {
        parts.push(make_part(&current, in_digits));
    }

    parts
}

fn make_part(run: &str, digits: bool) -> KeyPart {
    if digits {
        if let Ok(n) = run.parse::<u128>() {
            return KeyPart::Number(n);
        }
    }
    KeyPart::Text(run.to_lowercase())
}

pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_key(a).cmp(&natural_key(b)).then_with(|| a.cmp(b))
}

/// Sort paths by their full text with numeric runs compared as numbers
pub fn natural_sort_paths(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| natural_cmp(&path_text(a), &path_text(b)));
}

fn path_text(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

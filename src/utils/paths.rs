use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

pub fn timestamp(now: DateTime<Local>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

/// `<dir>/<name>_<timestamp>.<ext>`
pub fn artifact_path(dir: &Path, name: &str, stamp: &str, ext: &str) -> PathBuf {
    dir.join(format!("{}_{}.{}", slug(name), stamp, ext))
}

/// File stem of an asset href, e.g. `B03` for `.../B03.tif`.
pub fn href_stem(href: &str) -> String {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("band")
        .to_string()
}

/// Keep ASCII alphanumerics, `-` and `_`; everything else becomes `_`.
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

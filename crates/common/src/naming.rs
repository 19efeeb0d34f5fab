//! Screenshot path naming
//!
//! Layout: `{root}/{name_from_url(url)}/{browser}.png`. Element captures get
//! an index suffix when a selector matches more than one element, and a
//! numbered sub-directory per selector when several selectors are captured.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static PROTOCOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://").unwrap());
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[/:]+").unwrap());

/// Directory name for a page URL
pub fn name_from_url(url: &str) -> String {
    let without_protocol = PROTOCOL.replace_all(url, "");
    let name = SEPARATORS.replace_all(&without_protocol, "_");
    let trimmed = name.trim_matches('_');
    if trimmed.is_empty() {
        name.into_owned()
    } else {
        trimmed.to_string()
    }
}

/// Full-page screenshot path for one URL under one browser
pub fn screenshot_path(root: &Path, url: &str, browser: &str) -> PathBuf {
    root.join(name_from_url(url)).join(format!("{}.png", browser))
}

/// Path used for selector number `index` when `total` selectors are captured
pub fn selector_path(file_path: &Path, index: usize, total: usize) -> PathBuf {
    if total <= 1 {
        return file_path.to_path_buf();
    }
    let dir = file_path.parent().unwrap_or_else(|| Path::new(""));
    match file_path.file_name() {
        Some(name) => dir.join(index.to_string()).join(name),
        None => dir.join(index.to_string()),
    }
}

/// Path used for matched element number `index` out of `total`
pub fn element_path(file_path: &Path, index: usize, total: usize) -> PathBuf {
    if total <= 1 {
        return file_path.to_path_buf();
    }
    let stem = file_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match file_path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, index, ext.to_string_lossy()),
        None => format!("{}_{}", stem, index),
    };
    file_path.with_file_name(name)
}

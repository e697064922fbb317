//! Route path normalization.
//!
//! A registered path is joined onto its router's prefix, redundant slashes
//! are collapsed and any trailing slash is dropped. The root is always `/`.

/// Join `path` onto `prefix` and normalize the result.
pub fn normalize(prefix: &str, path: &str) -> String {
    let mut out = String::with_capacity(prefix.len() + path.len() + 1);
    for segment in prefix.split('/').chain(path.split('/')) {
        if segment.is_empty() {
            continue;
        }
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

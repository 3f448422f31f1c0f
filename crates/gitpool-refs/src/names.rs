//! Ref-name validation following git's conventions.
//!
//! Valid ref names:
//! - `HEAD`, or a path starting with `refs/`
//! - At most 100 characters (the storage column bound)
//! - No whitespace, `~`, `^`, `:`, `?`, `*`, `[`, `\`
//! - No `..` (double dot) and no `@{`
//! - No leading/trailing `.` or `/`, no `.lock` suffix, no `//`
//! - Components between slashes non-empty and not starting with `.`

use crate::error::{RefError, RefResult};

/// Characters forbidden anywhere in a ref name.
const FORBIDDEN_CHARS: &[char] = &[' ', '\t', '\n', '\r', '~', '^', ':', '?', '*', '[', '\\'];

/// Longest name the refs table accepts.
pub const MAX_NAME_LEN: usize = 100;

fn invalid(name: &str, reason: impl Into<String>) -> RefError {
    RefError::InvalidName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// Validate a full ref name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use gitpool_refs::check_ref_name;
///
/// assert!(check_ref_name("HEAD").is_ok());
/// assert!(check_ref_name("refs/heads/master").is_ok());
/// assert!(check_ref_name("refs/heads/bad..name").is_err());
/// assert!(check_ref_name("master").is_err());
/// ```
pub fn check_ref_name(name: &str) -> RefResult<()> {
    if name == "HEAD" {
        return Ok(());
    }
    if name.len() > MAX_NAME_LEN {
        return Err(invalid(name, format!("longer than {MAX_NAME_LEN} characters")));
    }
    let Some(rest) = name.strip_prefix("refs/") else {
        return Err(invalid(name, "must be HEAD or start with 'refs/'"));
    };
    if rest.is_empty() {
        return Err(invalid(name, "no path after 'refs/'"));
    }

    for ch in FORBIDDEN_CHARS {
        if name.contains(*ch) {
            return Err(invalid(name, format!("contains forbidden character: {ch:?}")));
        }
    }
    if name.contains("..") {
        return Err(invalid(name, "must not contain '..'"));
    }
    if name.contains("@{") {
        return Err(invalid(name, "must not contain '@{'"));
    }
    if name.ends_with('.') || name.ends_with('/') {
        return Err(invalid(name, "must not end with '.' or '/'"));
    }
    if name.ends_with(".lock") {
        return Err(invalid(name, "must not end with '.lock'"));
    }
    if name.contains("//") {
        return Err(invalid(name, "must not contain consecutive slashes '//'"));
    }
    for component in name.split('/') {
        if component.is_empty() {
            return Err(invalid(name, "path components must not be empty"));
        }
        if component.starts_with('.') {
            return Err(invalid(
                name,
                format!("component must not start with '.': {component:?}"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names() {
        assert!(check_ref_name("HEAD").is_ok());
        assert!(check_ref_name("refs/heads/master").is_ok());
        assert!(check_ref_name("refs/heads/feature/auth").is_ok());
        assert!(check_ref_name("refs/tags/v1.0").is_ok());
        assert!(check_ref_name("refs/remotes/origin/main").is_ok());
    }

    #[test]
    fn reject_short_names() {
        assert!(check_ref_name("master").is_err());
        assert!(check_ref_name("heads/master").is_err());
        assert!(check_ref_name("").is_err());
        assert!(check_ref_name("refs/").is_err());
    }

    #[test]
    fn reject_forbidden_chars() {
        assert!(check_ref_name("refs/heads/has space").is_err());
        assert!(check_ref_name("refs/heads/a~b").is_err());
        assert!(check_ref_name("refs/heads/a^b").is_err());
        assert!(check_ref_name("refs/heads/a:b").is_err());
        assert!(check_ref_name("refs/heads/a?b").is_err());
        assert!(check_ref_name("refs/heads/a*b").is_err());
        assert!(check_ref_name("refs/heads/a[b").is_err());
        assert!(check_ref_name("refs/heads/a\\b").is_err());
    }

    #[test]
    fn reject_double_dot_and_reflog_syntax() {
        assert!(check_ref_name("refs/heads/bad..name").is_err());
        assert!(check_ref_name("refs/heads/x@{0}").is_err());
    }

    #[test]
    fn reject_bad_boundaries() {
        assert!(check_ref_name("refs/heads/trailing.").is_err());
        assert!(check_ref_name("refs/heads/trailing/").is_err());
        assert!(check_ref_name("refs/heads//double").is_err());
        assert!(check_ref_name("refs/heads/.hidden").is_err());
        assert!(check_ref_name("refs/heads/main.lock").is_err());
    }

    #[test]
    fn reject_over_long_names() {
        let name = format!("refs/heads/{}", "a".repeat(MAX_NAME_LEN));
        assert!(check_ref_name(&name).is_err());
    }
}

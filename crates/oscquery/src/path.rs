// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! OSC address validation and path helpers.
//!
//! `/` is the structural separator and is always allowed.

/// Characters an OSC address may not contain.
pub const DISALLOWED_PATH_CHARS: [char; 9] = [' ', '#', '*', ',', '?', '[', ']', '{', '}'];

/// Path of the address-space root.
pub const ROOT_PATH: &str = "/";

/// Check whether `path` is usable as a node address.
///
/// A valid path is rooted (starts with `/`) and contains none of
/// [`DISALLOWED_PATH_CHARS`].
pub fn is_valid_path(path: &str) -> bool {
    path.starts_with('/') && !path.contains(&DISALLOWED_PATH_CHARS[..])
}

/// Structural parent of `path`: everything before the last `/`.
///
/// The parent of a top-level path (and of the root itself) is the root.
pub fn parent_path(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some(("", _)) | None => ROOT_PATH,
        Some((parent, _)) => parent,
    }
}

/// Last `/`-delimited segment of `path`, used as the key under `CONTENTS`.
pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Join a parent path and a child segment.
pub fn join(parent: &str, segment: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, segment)
    } else {
        format!("{}/{}", parent, segment)
    }
}

/// Whether `path` lies strictly below `ancestor`.
pub fn is_below(ancestor: &str, path: &str) -> bool {
    if ancestor == ROOT_PATH {
        return path.starts_with('/') && path != ROOT_PATH;
    }
    path.strip_prefix(ancestor)
        .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_paths() {
        for path in ["/", "/test", "/test/node/one", "/a_b-c/d.e", "/value/0"] {
            assert!(is_valid_path(path), "{path} should be valid");
        }
    }

    #[test]
    fn test_disallowed_chars_rejected() {
        for c in DISALLOWED_PATH_CHARS {
            let path = format!("/test{}node", c);
            assert!(!is_valid_path(&path), "{path:?} should be rejected");
        }
    }

    #[test]
    fn test_unrooted_path_rejected() {
        assert!(!is_valid_path(""));
        assert!(!is_valid_path("test"));
    }

    #[test]
    fn test_parent_path() {
        assert_eq!(parent_path("/test/node/one"), "/test/node");
        assert_eq!(parent_path("/test"), "/");
        assert_eq!(parent_path("/"), "/");
    }

    #[test]
    fn test_last_segment_and_join() {
        assert_eq!(last_segment("/test/node/one"), "one");
        assert_eq!(last_segment("/test"), "test");
        assert_eq!(join("/", "test"), "/test");
        assert_eq!(join("/test", "one"), "/test/one");
    }

    #[test]
    fn test_is_below() {
        assert!(is_below("/", "/a"));
        assert!(is_below("/a", "/a/b/c"));
        assert!(!is_below("/a", "/ab"));
        assert!(!is_below("/a", "/a"));
        assert!(!is_below("/", "/"));
    }
}

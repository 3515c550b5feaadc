//! Conversion between nested state trees and flat dotted-path maps.
//!
//! [`flatten`] and [`unflatten`] are exact inverses for well-formed input:
//! nested keys are non-empty and free of `.`, branches are non-empty
//! objects, and no flat path is a strict prefix of another.
//!
//! # Examples
//!
//! ```
//! use qrform::domain::{flatten, unflatten, nested};
//! use serde_json::json;
//!
//! let state = nested(json!({"a": {"b": 1, "c": {"d": 2}}}));
//! let flat = flatten(&state).unwrap();
//! assert_eq!(flat.get("a.b"), Some(&json!(1)));
//! assert_eq!(flat.get("a.c.d"), Some(&json!(2)));
//! assert_eq!(unflatten(&flat).unwrap(), state);
//! ```

use super::errors::{PathError, PathResult};
use super::models::{FlatState, NestedState, PATH_SEPARATOR, Value};

/// Flattens a nested state into dotted paths.
///
/// Entries are emitted depth-first in per-object key order. Empty branches
/// produce no entries.
///
/// # Errors
///
/// Returns [`PathError::InvalidKey`] when a key is empty or contains the
/// separator, since such a key cannot be recovered by [`unflatten`].
pub fn flatten(state: &NestedState) -> PathResult<FlatState> {
    let mut flat = FlatState::new();
    flatten_into(state, None, &mut flat)?;
    Ok(flat)
}

fn flatten_into(state: &NestedState, prefix: Option<&str>, flat: &mut FlatState) -> PathResult<()> {
    for (key, value) in state {
        if key.is_empty() || key.contains(PATH_SEPARATOR) {
            return Err(PathError::InvalidKey(key.clone()));
        }

        let path = match prefix {
            Some(prefix) => format!("{prefix}{PATH_SEPARATOR}{key}"),
            None => key.clone(),
        };

        match value {
            Value::Object(branch) => flatten_into(branch, Some(&path), flat)?,
            leaf => {
                flat.insert(path, leaf.clone());
            }
        }
    }
    Ok(())
}

/// Rebuilds a nested state from dotted paths.
///
/// # Errors
///
/// Returns [`PathError::ConflictingPath`] when one path is a strict prefix
/// of another, and [`PathError::EmptySegment`] for paths such as `"a..b"`.
pub fn unflatten(flat: &FlatState) -> PathResult<NestedState> {
    unflatten_entries(flat.iter().map(|(path, value)| (path.as_str(), value.clone())))
}

/// Rebuilds a nested state from `(path, value)` pairs.
///
/// When two pairs share a full path the later one wins and keeps the
/// position of the first.
pub fn unflatten_entries<I, K>(entries: I) -> PathResult<NestedState>
where
    I: IntoIterator<Item = (K, Value)>,
    K: AsRef<str>,
{
    let mut root = NestedState::new();
    for (path, value) in entries {
        insert_path(&mut root, path.as_ref(), value)?;
    }
    Ok(root)
}

/// Splits a path into its segments, rejecting empty ones.
pub fn split_path(path: &str) -> PathResult<Vec<&str>> {
    let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(PathError::EmptySegment(path.to_string()));
    }
    Ok(segments)
}

/// Checks that a set of paths can coexist in one nested state.
///
/// Repeated paths are accepted; callers that need uniqueness check it
/// themselves.
pub fn check_paths<'a>(paths: impl IntoIterator<Item = &'a str>) -> PathResult<()> {
    unflatten_entries(paths.into_iter().map(|path| (path, Value::Null))).map(|_| ())
}

fn insert_path(root: &mut NestedState, path: &str, value: Value) -> PathResult<()> {
    let segments = split_path(path)?;
    let Some((leaf, branches)) = segments.split_last() else {
        return Err(PathError::EmptySegment(path.to_string()));
    };

    let mut node = root;
    for segment in branches {
        let entry = node
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(NestedState::new()));
        node = match entry {
            Value::Object(branch) => branch,
            _ => return Err(PathError::ConflictingPath(path.to_string())),
        };
    }

    if let Some(Value::Object(_)) = node.get(*leaf) {
        return Err(PathError::ConflictingPath(path.to_string()));
    }
    node.insert(leaf.to_string(), value);
    Ok(())
}

/// Merges `patch` into `target`.
///
/// Objects merge key by key; any other value (arrays and null included)
/// replaces what was there.
pub fn deep_merge(target: &mut NestedState, patch: &NestedState) {
    for (key, value) in patch {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming)
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

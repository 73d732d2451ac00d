//! Dotted field paths with `*` wildcards.
//!
//! A schema key such as `items.*.price` is a pattern; resolving it against the
//! data yields one concrete path (`items.0.price`, `items.1.price`, ...) per
//! element the wildcard ranges over. Numeric segments index arrays, other
//! segments index objects. The empty path denotes the root value.
//!
//! Resolution never fails: a wildcard over a missing or non-container value
//! produces no instances, and a missing plain segment produces one instance
//! whose value is absent.

use serde_json::Value;

/// Wildcard segment.
pub const WILDCARD: &str = "*";

/// One concrete instance of a field pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField<'a> {
    /// Concrete dotted path.
    pub path: String,
    /// Value at that path, `None` when absent.
    pub value: Option<&'a Value>,
}

/// Splits a dotted path into segments. The empty path has none.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    let root = path.is_empty();
    path.split('.').filter(move |_| !root)
}

/// Expands `pattern` against `data`, in data order.
#[must_use]
pub fn resolve<'a>(data: &'a Value, pattern: &str) -> Vec<ResolvedField<'a>> {
    let segs: Vec<&str> = segments(pattern).collect();
    let mut out = Vec::new();
    expand(Some(data), &segs, String::new(), &mut out);
    out
}

fn expand<'a>(
    current: Option<&'a Value>,
    segs: &[&str],
    prefix: String,
    out: &mut Vec<ResolvedField<'a>>,
) {
    let Some((seg, rest)) = segs.split_first() else {
        out.push(ResolvedField {
            path: prefix,
            value: current,
        });
        return;
    };

    if *seg == WILDCARD {
        match current {
            Some(Value::Array(items)) => {
                for (idx, item) in items.iter().enumerate() {
                    expand(Some(item), rest, join(&prefix, &idx.to_string()), out);
                }
            }
            Some(Value::Object(map)) => {
                for (key, item) in map {
                    expand(Some(item), rest, join(&prefix, key), out);
                }
            }
            _ => {}
        }
        return;
    }

    let next = current.and_then(|value| child(value, seg));
    expand(next, rest, join(&prefix, seg), out);
}

fn child<'a>(value: &'a Value, seg: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(seg),
        Value::Array(items) => seg.parse::<usize>().ok().and_then(|idx| items.get(idx)),
        _ => None,
    }
}

fn join(prefix: &str, seg: &str) -> String {
    if prefix.is_empty() {
        seg.to_owned()
    } else {
        format!("{prefix}.{seg}")
    }
}

/// Reads the value at a concrete path.
#[must_use]
pub fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    segments(path).try_fold(data, |value, seg| child(value, seg))
}

/// Fills the wildcards of `pattern` with the segments of `concrete` at the
/// same positions.
///
/// Used to point a cross-field reference at the same array element as the
/// field being validated: `align("items.*.kind", "items.2.qty")` is
/// `items.2.kind`. Alignment stops at the first plain segment where the two
/// paths disagree; later wildcards are left in place.
#[must_use]
pub fn align(pattern: &str, concrete: &str) -> String {
    if !pattern.contains(WILDCARD) {
        return pattern.to_owned();
    }
    let mut concrete = segments(concrete);
    let mut diverged = false;
    segments(pattern)
        .map(|seg| {
            let other = if diverged { None } else { concrete.next() };
            match other {
                Some(other) if seg == WILDCARD => other,
                Some(other) if other == seg => seg,
                _ => {
                    diverged = true;
                    seg
                }
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Writes `value` at an existing concrete path. Returns false when the path
/// does not exist.
pub fn assign(data: &mut Value, path: &str, value: Value) -> bool {
    match data.pointer_mut(&to_pointer(path)) {
        Some(slot) => {
            *slot = value;
            true
        }
        None => false,
    }
}

/// Converts a dotted path to a JSON pointer.
#[must_use]
pub fn to_pointer(path: &str) -> String {
    segments(path).fold(String::new(), |mut pointer, seg| {
        pointer.push('/');
        pointer.push_str(&seg.replace('~', "~0").replace('/', "~1"));
        pointer
    })
}

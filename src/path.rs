//! Field-path construction for [`NonMatch`](crate::nonmatch::NonMatch) reporting (spec §4.10):
//! dot notation for nested fields, bracket notation for list indices.

/// Joins a parent path and a child path segment.
///
/// `child` is either a bare field name (joined with `.`) or a list-index suffix already
/// rendered as `[i]...` (appended directly, no dot) — the two conventions compose across
/// arbitrary nesting without ever producing a stray `.` before a `[`.
///
/// ```text
/// join("", "name")          == "name"
/// join("items", "[0]")      == "items[0]"
/// join("items[0]", "qty")   == "items[0].qty"
/// join("a.b", "[2].c")      == "a.b[2].c"
/// ```
pub fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        return child.to_owned();
    }
    if child.starts_with('[') {
        format!("{parent}{child}")
    } else {
        format!("{parent}.{child}")
    }
}

/// Renders a list index suffix, e.g. `index(3) == "[3]"`.
pub fn index(i: usize) -> String {
    format!("[{i}]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_field_names_with_dots() {
        assert_eq!(join("a", "b"), "a.b");
        assert_eq!(join("", "b"), "b");
    }

    #[test]
    fn joins_list_indices_without_extra_dot() {
        assert_eq!(join("items", &index(0)), "items[0]");
        assert_eq!(join("items[0]", "qty"), "items[0].qty");
        assert_eq!(join("a.b", &format!("{}.c", index(2))), "a.b[2].c");
    }
}

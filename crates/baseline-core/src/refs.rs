//! Sequential ref assignment for tracker entities (M01, M02, ... / D01, ...).
//!
//! Refs are computed by scanning existing refs for the highest numeric
//! suffix and incrementing. Simple and correct for this workload, but
//! non-atomic: two concurrent commits against the same project can race to
//! the same ref (callers are expected to serialize commits).

/// Compute the next ref for `prefix` given the refs already in use.
///
/// The prefix match is case-insensitive and refs with unparseable suffixes
/// are ignored. Gaps are not reused: given `M01` and `M03`, the next ref is
/// `M04`. Returns `"{prefix}01"` when no parseable refs exist.
pub fn next_ref(prefix: char, existing: &[String]) -> String {
    let mut max = 0u32;
    for r in existing {
        let mut chars = r.trim().chars();
        let Some(first) = chars.next() else {
            continue;
        };
        if !first.eq_ignore_ascii_case(&prefix) {
            continue;
        }
        if let Ok(n) = chars.as_str().parse::<u32>() {
            max = max.max(n);
        }
    }
    format!("{prefix}{:02}", max + 1)
}

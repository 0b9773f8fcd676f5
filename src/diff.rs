//! Line-level diff counting
//!
//! Pure helpers the history store uses to decide whether a cached
//! commentary still describes the file.

use similar::{Algorithm, DiffTag, capture_diff_slices};

/// Number of lines present on only one side of a minimal line diff
///
/// Insertions and deletions are counted individually, so a replaced line
/// counts twice. Lines are split the way [`str::lines`] splits them: a
/// trailing newline (or `\r\n`) does not produce an extra line, so
/// `"a"` and `"a\n"` are equal.
#[must_use]
pub fn count_changed_lines(old: &str, new: &str) -> usize {
    if old == new {
        return 0;
    }

    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();

    capture_diff_slices(Algorithm::Myers, &old_lines, &new_lines)
        .iter()
        .map(|op| {
            let (tag, old_range, new_range) = op.as_tag_tuple();
            match tag {
                DiffTag::Equal => 0,
                DiffTag::Delete => old_range.len(),
                DiffTag::Insert => new_range.len(),
                DiffTag::Replace => old_range.len() + new_range.len(),
            }
        })
        .sum()
}

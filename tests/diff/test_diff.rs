//! Tests for line-level change counting

use kodegen_code_commentary::count_changed_lines;

#[test]
fn test_identical_content_has_no_changes() {
    let text = "fn main() {\n    println!(\"hi\");\n}\n";
    assert_eq!(count_changed_lines(text, text), 0);
    assert_eq!(count_changed_lines("", ""), 0);
}

#[test]
fn test_single_line_edit_counts_delete_and_insert() {
    let old = "a\nb\nc";
    let new = "a\nB\nc";
    assert_eq!(count_changed_lines(old, new), 2);
}

#[test]
fn test_pure_insertion_and_deletion() {
    assert_eq!(count_changed_lines("a\nc", "a\nb\nc"), 1);
    assert_eq!(count_changed_lines("a\nb\nc", "a\nc"), 1);
    assert_eq!(count_changed_lines("", "one\ntwo\nthree"), 3);
}

#[test]
fn test_count_is_symmetric() {
    let old = "use std::io;\n\nfn a() {}\nfn b() {}\n";
    let new = "use std::fs;\n\nfn a() {}\nfn c() {}\nfn d() {}\n";
    assert_eq!(count_changed_lines(old, new), count_changed_lines(new, old));
}

#[test]
fn test_trailing_newline_alone_is_not_a_change() {
    // `lines()` drops a single trailing terminator
    assert_eq!(count_changed_lines("a\nb", "a\nb\n"), 0);
}

#[test]
fn test_rewrite_counts_every_line() {
    let old = "1\n2\n3\n4\n5\n6";
    let new = "a\nb\nc\nd\ne\nf";
    assert_eq!(count_changed_lines(old, new), 12);
}

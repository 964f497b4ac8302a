//! Line-level insertion/deletion counting.
//!
//! Uses the `similar` crate (Myers diff algorithm) over byte lines. Content
//! is never required to be UTF-8.

use repostat_types::FileGitStatus;
use similar::{capture_diff_slices, Algorithm, DiffTag};

/// Inserted and deleted line counts between two texts.
pub type LineDelta = FileGitStatus;

/// Split content into lines.
///
/// A single trailing newline does not produce an empty final line, so
/// `b"a\nb\n"` and `b"a\nb"` both yield two lines and `b""` yields none.
pub fn split_lines(content: &[u8]) -> Vec<&[u8]> {
    if content.is_empty() {
        return Vec::new();
    }
    let body = content.strip_suffix(b"\n").unwrap_or(content);
    body.split(|b| *b == b'\n').collect()
}

/// Number of lines in `content` under the [`split_lines`] convention.
pub fn count_lines(content: &[u8]) -> usize {
    if content.is_empty() {
        return 0;
    }
    let newlines = content.iter().filter(|b| **b == b'\n').count();
    if content.ends_with(b"\n") {
        newlines
    } else {
        newlines + 1
    }
}

/// Compute the line delta from `old` to `new`.
///
/// Replace spans count toward both sides independently: replacing two lines
/// with three adds `(3, 2)`.
pub fn line_delta(old: &[u8], new: &[u8]) -> LineDelta {
    if old == new {
        return LineDelta::default();
    }
    if old.is_empty() {
        return LineDelta::new(count_lines(new), 0);
    }
    if new.is_empty() {
        return LineDelta::new(0, count_lines(old));
    }

    let old_lines = split_lines(old);
    let new_lines = split_lines(new);

    let mut delta = LineDelta::default();
    for op in capture_diff_slices(Algorithm::Myers, &old_lines, &new_lines) {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => {}
            DiffTag::Delete => delta.deletions += old_range.len(),
            DiffTag::Insert => delta.insertions += new_range.len(),
            DiffTag::Replace => {
                delta.deletions += old_range.len();
                delta.insertions += new_range.len();
            }
        }
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn both_empty() {
        assert_eq!(line_delta(b"", b""), LineDelta::new(0, 0));
    }

    #[test]
    fn single_line_replaced() {
        assert_eq!(line_delta(b"a\nb\n", b"a\nc\n"), LineDelta::new(1, 1));
    }

    #[test]
    fn trailing_line_removed() {
        assert_eq!(line_delta(b"a\nb\n", b"a\n"), LineDelta::new(0, 1));
    }

    #[test]
    fn trailing_line_added() {
        assert_eq!(line_delta(b"a\n", b"a\nb\n"), LineDelta::new(1, 0));
    }

    #[test]
    fn empty_to_content() {
        assert_eq!(line_delta(b"", b"one\ntwo\nthree\n"), LineDelta::new(3, 0));
    }

    #[test]
    fn content_to_empty() {
        assert_eq!(line_delta(b"one\ntwo\n", b""), LineDelta::new(0, 2));
    }

    #[test]
    fn missing_final_newline_is_not_a_phantom_line() {
        assert_eq!(count_lines(b"a\nb\n"), 2);
        assert_eq!(count_lines(b"a\nb"), 2);
        assert_eq!(count_lines(b""), 0);
        assert_eq!(count_lines(b"\n"), 1);
        assert_eq!(split_lines(b"\n"), vec![&b""[..]]);
    }

    #[test]
    fn replace_counts_both_sides() {
        let old = b"keep\nx1\nx2\nkeep2\n";
        let new = b"keep\ny1\ny2\ny3\nkeep2\n";
        assert_eq!(line_delta(old, new), LineDelta::new(3, 2));
    }

    #[test]
    fn binary_content_is_diffed_linewise() {
        let old = [0u8, 159, 146, 150, b'\n', 1, 2];
        let new = [0u8, 159, 146, 150, b'\n', 3, 4];
        assert_eq!(line_delta(&old, &new), LineDelta::new(1, 1));
    }

    fn text() -> impl Strategy<Value = String> {
        prop::collection::vec(prop::sample::select(vec!["a", "b", "c", "d", ""]), 0..24)
            .prop_map(|lines| {
                let mut s = lines.join("\n");
                if !s.is_empty() {
                    s.push('\n');
                }
                s
            })
    }

    proptest! {
        #[test]
        fn identical_texts_have_no_delta(a in text()) {
            prop_assert_eq!(line_delta(a.as_bytes(), a.as_bytes()), LineDelta::default());
        }

        #[test]
        fn delta_reconstructs_line_count(a in text(), b in text()) {
            let delta = line_delta(a.as_bytes(), b.as_bytes());
            prop_assert_eq!(
                count_lines(a.as_bytes()) + delta.insertions - delta.deletions,
                count_lines(b.as_bytes())
            );
        }
    }
}

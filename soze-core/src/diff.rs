use std::collections::BTreeMap;
use std::iter;

/// Changed runs between two frames, keyed by `(x, y)` of each run's first
/// character. Values are the new text for the run.
pub type FrameDiff = BTreeMap<(usize, usize), String>;

/// Compare `prev` against `next` line by line and collect the runs that
/// changed.
///
/// Missing lines count as empty and short lines are padded with spaces, so
/// frames of different shapes can be compared.
pub fn diff_frames<P, N>(prev: &[P], next: &[N]) -> FrameDiff
where
    P: AsRef<str>,
    N: AsRef<str>,
{
    let mut diff = FrameDiff::new();
    let rows = prev.len().max(next.len());

    for y in 0..rows {
        let old = prev.get(y).map_or("", |s| s.as_ref());
        let new = next.get(y).map_or("", |s| s.as_ref());

        let mut run: Option<(usize, String)> = None;
        for (x, (a, b)) in pad_zip(old, new).enumerate() {
            if a != b {
                run.get_or_insert_with(|| (x, String::new())).1.push(b);
            } else if let Some((start, text)) = run.take() {
                diff.insert((start, y), text);
            }
        }
        if let Some((start, text)) = run {
            diff.insert((start, y), text);
        }
    }

    diff
}

/// Overwrite `lines` with every run in `diff`.
pub fn apply_diff(lines: &mut Vec<String>, diff: &FrameDiff) {
    for (&(x, y), text) in diff {
        if lines.len() <= y {
            lines.resize(y + 1, String::new());
        }
        let mut chars: Vec<char> = lines[y].chars().collect();
        let end = x + text.chars().count();
        if chars.len() < end {
            chars.resize(end, ' ');
        }
        for (slot, c) in chars[x..end].iter_mut().zip(text.chars()) {
            *slot = c;
        }
        lines[y] = chars.into_iter().collect();
    }
}

fn pad_zip<'a>(a: &'a str, b: &'a str) -> impl Iterator<Item = (char, char)> + 'a {
    let width = a.chars().count().max(b.chars().count());
    let pad = |s: &'a str| s.chars().chain(iter::repeat(' ')).take(width);
    pad(a).zip(pad(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn diff_of(entries: &[((usize, usize), &str)]) -> FrameDiff {
        entries.iter().map(|&(k, v)| (k, v.to_string())).collect()
    }

    #[test]
    fn single_changed_char() {
        assert_eq!(diff_frames(&["abc"], &["abd"]), diff_of(&[((2, 0), "d")]));
    }

    #[test]
    fn identical_frames() {
        assert!(diff_frames(&["ab"], &["ab"]).is_empty());
        assert!(diff_frames::<&str, &str>(&[], &[]).is_empty());
    }

    #[test]
    fn missing_line_is_empty() {
        assert_eq!(diff_frames(&["a"], &["a", "b"]), diff_of(&[((0, 1), "b")]));
        assert_eq!(diff_frames(&["a", "b"], &["a"]), diff_of(&[((0, 1), " ")]));
    }

    #[test]
    fn runs_split_on_matching_columns() {
        let diff = diff_frames(&["abcdef"], &["xbyzef"]);
        assert_eq!(diff, diff_of(&[((0, 0), "x"), ((2, 0), "yz")]));
    }

    #[test]
    fn shorter_line_padded_with_spaces() {
        assert_eq!(diff_frames(&["ab"], &["abcd"]), diff_of(&[((2, 0), "cd")]));
        assert_eq!(diff_frames(&["abcd"], &["ab"]), diff_of(&[((2, 0), "  ")]));
        assert!(diff_frames(&["ab  "], &["ab"]).is_empty());
    }

    #[test]
    fn takes_text_from_next_frame() {
        let diff = diff_frames(&["12", "34"], &["13", "44"]);
        assert_eq!(diff, diff_of(&[((1, 0), "3"), ((0, 1), "4")]));
    }

    proptest! {
        #[test]
        fn applying_diff_reproduces_next(
            prev in prop::collection::vec("[ab ]{0,6}", 0..4),
            next in prop::collection::vec("[ab ]{0,6}", 0..4),
        ) {
            let diff = diff_frames(prev.as_slice(), next.as_slice());
            let mut lines = prev.clone();
            apply_diff(&mut lines, &diff);

            for y in 0..prev.len().max(next.len()) {
                let got = lines.get(y).map_or("", String::as_str).trim_end();
                let want = next.get(y).map_or("", String::as_str).trim_end();
                prop_assert_eq!(got, want);
            }
        }
    }
}

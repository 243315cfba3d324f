//! Small text helpers shared by the form and report parsers.

/// Case-insensitive `str::strip_prefix`. Returns the remainder of `line`
/// after `prefix`, sliced from the original text.
pub(crate) fn strip_prefix_ci<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let mut rest = line.char_indices();
    for p in prefix.chars() {
        let (_, c) = rest.next()?;
        if !c.to_lowercase().eq(p.to_lowercase()) {
            return None;
        }
    }
    match rest.next() {
        Some((i, _)) => Some(&line[i..]),
        None => Some(""),
    }
}

/// [`strip_prefix_ci`] for a whole keyword: the keyword must not run on into
/// a longer word or number, so `relevé 2` does not match `relevé 2012`.
pub(crate) fn strip_keyword_ci<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = strip_prefix_ci(line, keyword)?;
    let runs_on = |c: char| c.is_alphanumeric();
    match (keyword.chars().last(), rest.chars().next()) {
        (Some(k), Some(r)) if runs_on(k) && runs_on(r) => None,
        _ => Some(rest),
    }
}

/// First non-empty line at or after `start`, trimmed.
pub(crate) fn next_non_empty<'a>(lines: &[&'a str], start: usize) -> Option<&'a str> {
    lines.iter().skip(start).map(|l| l.trim()).find(|l| !l.is_empty())
}

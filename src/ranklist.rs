//! The `.in` rank file: one line per rank, tied handles side by side.
//!
//! ```text
//! alice bob carol
//! dave
//! ```
//!
//! reads back as alice, bob and carol at rank 1 and dave at rank 4.

use std::borrow::Cow;

use compact_str::CompactString;
use hashbrown::HashSet;

use crate::row::ScoreboardRow;

/// A handle as a single token: whitespace runs become `_`, otherwise the
/// reader would see several tied handles.
fn token(handle: &str) -> Cow<'_, str> {
    if !handle.contains(char::is_whitespace) {
        return Cow::Borrowed(handle);
    }
    let squashed = handle.split_whitespace().collect::<Vec<_>>().join("_");
    tracing::warn!(target: "ranklist", "handle {handle:?} written as {squashed:?}");
    Cow::Owned(squashed)
}

/// Renders rows as rank file text.
///
/// Rows are ordered by rank (stable, so scrape order breaks nothing) and
/// consecutive rows with equal rank share a line.
#[must_use]
pub fn render(rows: &[ScoreboardRow]) -> String {
    let mut sorted = rows.iter().collect::<Vec<_>>();
    sorted.sort_by_key(|row| row.rank);

    let mut out = String::new();
    let mut last = None;
    for row in sorted {
        if last == Some(row.rank) {
            out.push(' ');
        } else {
            if last.is_some() {
                out.push('\n');
            }
            last = Some(row.rank);
        }
        out.push_str(&token(&row.handle));
    }
    if last.is_some() {
        out.push('\n');
    }
    out
}

/// Reads rank file text into `(token, rank)` pairs in file order.
#[must_use]
pub fn parse(text: &str) -> Vec<(CompactString, u32)> {
    let mut current = 1;
    let mut out = Vec::new();
    for line in text.lines() {
        let before = out.len();
        out.extend(line.split_whitespace().map(|tok| (CompactString::new(tok), current)));
        current += (out.len() - before) as u32;
    }
    out
}

/// Like [`parse`], but a token appearing more than once keeps only its last
/// rank. Order is that of the kept occurrences.
#[must_use]
pub fn last_ranks(text: &str) -> Vec<(CompactString, u32)> {
    let mut seen = HashSet::new();
    let mut out = parse(text)
        .into_iter()
        .rev()
        .filter(|(tok, _)| seen.insert(tok.clone()))
        .collect::<Vec<_>>();
    out.reverse();
    out
}

#[cfg(test)]
mod tests {
    use hashbrown::HashMap;

    use super::*;

    fn rank_map(text: &str) -> HashMap<CompactString, u32> {
        parse(text).into_iter().collect()
    }

    #[test]
    fn ties_skip_ranks() {
        let ranks = parse("a b c\nd\n\ne f\ng\n");
        let got = ranks.iter().map(|(h, r)| (h.as_str(), *r)).collect::<Vec<_>>();
        assert_eq!(
            got,
            [("a", 1), ("b", 1), ("c", 1), ("d", 4), ("e", 5), ("f", 5), ("g", 7)]
        );
    }

    #[test]
    fn render_groups_equal_ranks() {
        let rows = [
            ScoreboardRow::new(3, "carol", Some(50.0)),
            ScoreboardRow::new(1, "alice", Some(100.0)),
            ScoreboardRow::new(1, "bob", Some(100.0)),
            ScoreboardRow::new(4, "dave", None),
        ];
        assert_eq!(render(&rows), "alice bob\ncarol\ndave\n");
    }

    #[test]
    fn render_then_parse_keeps_competition_ranks() {
        let rows = [
            ScoreboardRow::new(1, "alice", None),
            ScoreboardRow::new(1, "bob", None),
            ScoreboardRow::new(3, "carol", None),
            ScoreboardRow::new(4, "dave", None),
            ScoreboardRow::new(4, "erin", None),
            ScoreboardRow::new(6, "frank", None),
        ];
        let map = rank_map(&render(&rows));
        for row in &rows {
            assert_eq!(map[&row.handle], row.rank, "{}", row.handle);
        }
    }

    #[test]
    fn empty_input() {
        assert_eq!(render(&[]), "");
        assert!(parse("\n \n").is_empty());
    }

    #[test]
    fn duplicate_keeps_last_rank() {
        let map = rank_map("x\ny\nx\n");
        assert_eq!(map["x"], 3);
        assert_eq!(map["y"], 2);

        let ranks = last_ranks("x\ny\nx z\n");
        let got = ranks.iter().map(|(h, r)| (h.as_str(), *r)).collect::<Vec<_>>();
        assert_eq!(got, [("y", 2), ("x", 3), ("z", 3)]);
    }

    #[test]
    fn whitespace_in_handles_does_not_shift_ranks() {
        let rows = [
            ScoreboardRow::new(1, "John Doe", None),
            ScoreboardRow::new(2, "alice", None),
            ScoreboardRow::new(2, " Mary\tAnn  Lee ", None),
            ScoreboardRow::new(4, "bob", None),
        ];
        let text = render(&rows);
        assert_eq!(text, "John_Doe\nalice Mary_Ann_Lee\nbob\n");
        let got = parse(&text);
        let got = got.iter().map(|(h, r)| (h.as_str(), *r)).collect::<Vec<_>>();
        assert_eq!(
            got,
            [("John_Doe", 1), ("alice", 2), ("Mary_Ann_Lee", 2), ("bob", 4)]
        );
    }
}

use core::ops::Range;
use std::sync::LazyLock;

use cscr::row::ScoreboardRow;
use regex::Regex;

static HANDLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""user_handle"\s*:\s*"((?:[^"\\]|\\.)*)""#).unwrap());
static RANK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""rank"\s*:\s*"?(\d+)"#).unwrap());
static SCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""score"\s*:\s*"?(-?\d+(?:\.\d+)?)"#).unwrap());

/// Tracks whether a scan is inside a JSON string literal.
#[derive(Default)]
struct Quoting {
    in_string: bool,
    escaped: bool,
}

impl Quoting {
    /// Feeds the next character; `true` if it belongs to a string literal,
    /// quotes included.
    fn step(&mut self, c: char) -> bool {
        if self.in_string {
            if self.escaped {
                self.escaped = false;
            } else if c == '\\' {
                self.escaped = true;
            } else if c == '"' {
                self.in_string = false;
            }
            true
        } else {
            self.in_string = c == '"';
            self.in_string
        }
    }
}

/// Per byte of `text`, whether it starts a character inside a string literal.
fn string_mask(text: &str) -> Vec<bool> {
    let mut mask = vec![false; text.len()];
    let mut quoting = Quoting::default();
    for (i, c) in text.char_indices() {
        mask[i] = quoting.step(c);
    }
    mask
}

/// Byte range of the innermost `{ ... }` around `pos`, ignoring braces in
/// string literals.
fn enclosing_object(text: &str, in_string: &[bool], pos: usize) -> Option<Range<usize>> {
    let bytes = text.as_bytes();

    let mut depth = 0usize;
    let mut start = None;
    for i in (0..pos).rev().filter(|&i| !in_string[i]) {
        match bytes[i] {
            b'}' => depth += 1,
            b'{' if depth == 0 => {
                start = Some(i);
                break;
            }
            b'{' => depth -= 1,
            _ => (),
        }
    }

    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(pos) {
        if in_string[i] {
            continue;
        }
        match b {
            b'{' => depth += 1,
            b'}' if depth == 0 => return Some(start?..i + 1),
            b'}' => depth -= 1,
            _ => (),
        }
    }
    None
}

/// `object` with every nested `{...}` / `[...]` cut out, so that per-problem
/// fields such as `"score"` inside `"problems_status"` cannot shadow the
/// contestant's own.
fn top_level(object: &str) -> String {
    let inner = &object[1..object.len() - 1];
    let mut depth = 0usize;
    let mut quoting = Quoting::default();
    let mut out = String::with_capacity(inner.len());
    for c in inner.chars() {
        if !quoting.step(c) {
            match c {
                '{' | '[' => {
                    depth += 1;
                    continue;
                }
                '}' | ']' => {
                    depth = depth.saturating_sub(1);
                    continue;
                }
                _ => (),
            }
        }
        if depth == 0 {
            out.push(c);
        }
    }
    out
}

fn unescape(raw: &str) -> String {
    serde_json::from_str(&format!("\"{raw}\"")).unwrap_or_else(|_| raw.to_owned())
}

/// Pulls ranking rows out of a saved CodeChef rankings response.
///
/// Every object carrying a `"user_handle"` is one row; its `"rank"` and
/// `"score"` are read from the same object in whatever order they appear.
pub fn parse_rankings(text: &str) -> Vec<ScoreboardRow> {
    let mut rows = Vec::new();
    let mut last_object = None;
    let in_string = string_mask(text);

    for cap in HANDLE.captures_iter(text) {
        let (Some(whole), Some(handle)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        let handle = unescape(handle.as_str());

        let Some(range) = enclosing_object(text, &in_string, whole.start()) else {
            tracing::warn!(target: "codechef", "{handle}: no enclosing object");
            continue;
        };
        if last_object.as_ref() == Some(&range) {
            continue;
        }
        last_object = Some(range.clone());

        let fields = top_level(&text[range]);
        let Some(rank) = RANK
            .captures(&fields)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
        else {
            tracing::warn!(target: "codechef", "{handle}: rank not found");
            continue;
        };
        let score = SCORE
            .captures(&fields)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok());

        rows.push(ScoreboardRow::new(rank, handle, score));
    }

    rows
}

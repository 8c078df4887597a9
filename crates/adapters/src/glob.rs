// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal glob matching for file-watch include/exclude patterns (§4.2).
//!
//! Supports `*` (any run of characters, no path separator) and `**` (any run
//! of characters, including path separators). That covers the patterns a
//! watch config needs (`*.class`, `**/Test*.class`) without pulling in a
//! dedicated glob crate for a handful of rules evaluated per file event.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobPattern {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Star,
    DoubleStar,
}

impl GlobPattern {
    pub fn new(pattern: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '*' {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::DoubleStar);
                } else {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Star);
                }
            } else {
                literal.push(c);
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Self { segments }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        match_segments(&self.segments, candidate)
    }
}

fn match_segments(segments: &[Segment], input: &str) -> bool {
    match segments.first() {
        None => input.is_empty(),
        Some(Segment::Literal(lit)) => match input.strip_prefix(lit.as_str()) {
            Some(rest) => match_segments(&segments[1..], rest),
            None => false,
        },
        Some(Segment::Star) => {
            // Consume up to (but not including) a '/' before trying the rest.
            for (idx, ch) in input.char_indices() {
                if ch == '/' {
                    return match_segments(&segments[1..], &input[idx..]);
                }
                if match_segments(&segments[1..], &input[idx..]) {
                    return true;
                }
            }
            match_segments(&segments[1..], "")
        }
        Some(Segment::DoubleStar) => {
            for idx in 0..=input.len() {
                if !input.is_char_boundary(idx) {
                    continue;
                }
                if match_segments(&segments[1..], &input[idx..]) {
                    return true;
                }
            }
            false
        }
    }
}

#[cfg(test)]
#[path = "glob_tests.rs"]
mod tests;

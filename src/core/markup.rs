//! Inline markup for step descriptions.
//!
//! Two forms are recognised: `**strong**` and `[[badge]]`. Unterminated
//! markers are kept as literal text.

/// A run of description text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Strong(&'a str),
    Badge(&'a str),
}

impl<'a> Segment<'a> {
    /// The text without markers.
    pub fn text(&self) -> &'a str {
        match self {
            Segment::Text(s) | Segment::Strong(s) | Segment::Badge(s) => s,
        }
    }
}

/// Split a description into segments.
pub fn parse(input: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = input;

    while !rest.is_empty() {
        let next = [("**", "**"), ("[[", "]]")]
            .iter()
            .filter_map(|&(open, close)| rest.find(open).map(|at| (at, open, close)))
            .min_by_key(|(at, _, _)| *at);

        let Some((at, open, close)) = next else {
            segments.push(Segment::Text(rest));
            break;
        };

        let body_start = at + open.len();
        let Some(len) = rest[body_start..].find(close) else {
            segments.push(Segment::Text(rest));
            break;
        };

        if at > 0 {
            segments.push(Segment::Text(&rest[..at]));
        }
        let body = &rest[body_start..body_start + len];
        segments.push(if open == "**" {
            Segment::Strong(body)
        } else {
            Segment::Badge(body)
        });
        rest = &rest[body_start + len + close.len()..];
    }

    segments
}

/// Description text with markers replaced: badges become `[badge]`.
pub fn plain(input: &str) -> String {
    parse(input)
        .iter()
        .map(|segment| match segment {
            Segment::Badge(s) => format!("[{s}]"),
            other => other.text().to_string(),
        })
        .collect()
}

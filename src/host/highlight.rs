//! Optional syntax highlighting for code panels.

/// A syntax highlighting capability offered by a host.
pub trait Highlighter {
    /// Return `code` decorated for display.
    fn highlight(&self, code: &str) -> String;
}

const RESET: &str = "\x1B[0m";
const KEYWORD: &str = "\x1B[1;35m";
const NUMBER: &str = "\x1B[33m";
const STRING: &str = "\x1B[32m";
const COMMENT: &str = "\x1B[2m";

const KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "else", "enum", "false", "fn", "for", "if", "impl", "in",
    "let", "loop", "match", "mut", "pub", "return", "self", "Self", "struct", "true", "use",
    "where", "while",
];

/// ANSI highlighter for Rust-like snippets.
///
/// Colors keywords, numbers, string literals and `//` comments. Good
/// enough for the short samples in the decks, not a real lexer.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordHighlighter;

impl Highlighter for KeywordHighlighter {
    fn highlight(&self, code: &str) -> String {
        code.lines()
            .map(highlight_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn highlight_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 16);
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '/' && chars.get(i + 1) == Some(&'/') {
            let rest: String = chars[i..].iter().collect();
            out.push_str(&format!("{COMMENT}{rest}{RESET}"));
            break;
        }
        if c == '"' {
            let end = chars[i + 1..]
                .iter()
                .position(|&ch| ch == '"')
                .map_or(chars.len(), |p| i + 1 + p + 1);
            let lit: String = chars[i..end].iter().collect();
            out.push_str(&format!("{STRING}{lit}{RESET}"));
            i = end;
            continue;
        }
        if c.is_ascii_digit() {
            let end = scan(&chars, i, |ch| ch.is_ascii_alphanumeric() || ch == '.' || ch == '_');
            let num: String = chars[i..end].iter().collect();
            out.push_str(&format!("{NUMBER}{num}{RESET}"));
            i = end;
            continue;
        }
        if c.is_alphabetic() || c == '_' {
            let end = scan(&chars, i, |ch| ch.is_alphanumeric() || ch == '_');
            let word: String = chars[i..end].iter().collect();
            if KEYWORDS.contains(&word.as_str()) {
                out.push_str(&format!("{KEYWORD}{word}{RESET}"));
            } else {
                out.push_str(&word);
            }
            i = end;
            continue;
        }
        out.push(c);
        i += 1;
    }

    out
}

fn scan(chars: &[char], start: usize, keep: impl Fn(char) -> bool) -> usize {
    chars[start..]
        .iter()
        .position(|&ch| !keep(ch))
        .map_or(chars.len(), |p| start + p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_and_numbers_are_colored() {
        let out = KeywordHighlighter.highlight("let k = 5;");
        assert!(out.starts_with(&format!("{KEYWORD}let{RESET}")));
        assert!(out.contains(&format!("{NUMBER}5{RESET}")));
    }

    #[test]
    fn test_comment_runs_to_end_of_line() {
        let out = KeywordHighlighter.highlight("x // let is not a keyword here");
        assert!(out.contains(&format!("{COMMENT}// let is not a keyword here{RESET}")));
    }

    #[test]
    fn test_identifiers_containing_keywords_are_plain() {
        let out = KeywordHighlighter.highlight("letter");
        assert_eq!(out, "letter");
    }

    #[test]
    fn test_line_structure_is_preserved() {
        let code = "fn a() {}\n\nfn b() {}";
        let out = KeywordHighlighter.highlight(code);
        assert_eq!(out.lines().count(), 3);
    }
}

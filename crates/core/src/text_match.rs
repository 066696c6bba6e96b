//! Text matching for filter conditions.
//!
//! Two matchers live here, both `no_std`:
//!
//! - [`like`]: SQL LIKE, `%` matching zero or more characters and `_`
//!   matching exactly one. Case-sensitive, over Unicode scalar values.
//! - [`regex_match`]: a compact regex subset supporting `.` `*` `+` `?`,
//!   `^` / `$` anchors, `\d` `\D` `\w` `\W` `\s` `\S`, bracket classes
//!   (`[abc]`, `[a-z]`, `[^abc]`) and literal escapes. Unanchored patterns
//!   match anywhere in the input.
//!
//! An unparsable regex pattern matches nothing.

use alloc::vec::Vec;

/// SQL LIKE pattern matching.
///
/// ```
/// use ripple_core::text_match::like;
/// assert!(like("hello", "h%o"));
/// assert!(like("hello", "_ello"));
/// assert!(!like("hello", "h_o"));
/// ```
pub fn like(value: &str, pattern: &str) -> bool {
    let v: Vec<char> = value.chars().collect();
    let p: Vec<char> = pattern.chars().collect();

    // Two-pointer scan with backtracking to the most recent `%`.
    let (mut vi, mut pi) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;

    while vi < v.len() {
        if pi < p.len() && (p[pi] == '_' || p[pi] == v[vi]) {
            vi += 1;
            pi += 1;
        } else if pi < p.len() && p[pi] == '%' {
            star = Some((pi, vi));
            pi += 1;
        } else if let Some((spi, svi)) = star {
            // Let the last `%` absorb one more character
            pi = spi + 1;
            vi = svi + 1;
            star = Some((spi, svi + 1));
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == '%' {
        pi += 1;
    }
    pi == p.len()
}

// =========================================================================
// Regex subset
// =========================================================================

#[derive(Clone, Debug, PartialEq)]
enum Atom {
    Literal(char),
    Any,
    /// `\d` `\w` `\s` and their negations
    Perl(char),
    /// `[...]` bracket class
    Class { negated: bool, items: Vec<ClassItem> },
}

#[derive(Clone, Debug, PartialEq)]
enum ClassItem {
    Single(char),
    Range(char, char),
    Perl(char),
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Quant {
    One,
    Star,
    Plus,
    Opt,
}

#[derive(Clone, Debug)]
struct Piece {
    atom: Atom,
    quant: Quant,
}

#[derive(Clone, Debug)]
struct Pattern {
    anchored_start: bool,
    anchored_end: bool,
    pieces: Vec<Piece>,
}

/// Matches `value` against the regex subset `pattern`.
///
/// ```
/// use ripple_core::text_match::regex_match;
/// assert!(regex_match("user-42", r"^user-\d+$"));
/// assert!(regex_match("hello world", "wor.d"));
/// assert!(!regex_match("hello", "^world"));
/// ```
pub fn regex_match(value: &str, pattern: &str) -> bool {
    match parse(pattern) {
        Some(compiled) => run(&compiled, value),
        None => false,
    }
}

fn parse(pattern: &str) -> Option<Pattern> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0usize;

    let anchored_start = chars.first() == Some(&'^');
    if anchored_start {
        i = 1;
    }
    let anchored_end = chars.len() > i && chars.last() == Some(&'$');
    let end = if anchored_end { chars.len() - 1 } else { chars.len() };

    let mut pieces = Vec::new();
    while i < end {
        let atom = match chars[i] {
            '.' => {
                i += 1;
                Atom::Any
            }
            '\\' => {
                let c = *chars.get(i + 1)?;
                i += 2;
                match c {
                    'd' | 'D' | 'w' | 'W' | 's' | 'S' => Atom::Perl(c),
                    _ => Atom::Literal(c),
                }
            }
            '[' => {
                let (class, next) = parse_class(&chars, i + 1, end)?;
                i = next;
                class
            }
            '*' | '+' | '?' => return None, // dangling quantifier
            c => {
                i += 1;
                Atom::Literal(c)
            }
        };
        let quant = match chars.get(i) {
            Some('*') => {
                i += 1;
                Quant::Star
            }
            Some('+') => {
                i += 1;
                Quant::Plus
            }
            Some('?') => {
                i += 1;
                Quant::Opt
            }
            _ => Quant::One,
        };
        pieces.push(Piece { atom, quant });
    }

    Some(Pattern {
        anchored_start,
        anchored_end,
        pieces,
    })
}

/// Parses a bracket class starting just past `[`. Returns the atom and the
/// index just past the closing `]`.
fn parse_class(chars: &[char], mut i: usize, end: usize) -> Option<(Atom, usize)> {
    let negated = chars.get(i) == Some(&'^');
    if negated {
        i += 1;
    }
    let mut items = Vec::new();
    while i < end && chars[i] != ']' {
        let c = if chars[i] == '\\' {
            let c = *chars.get(i + 1)?;
            i += 2;
            match c {
                'd' | 'D' | 'w' | 'W' | 's' | 'S' => {
                    items.push(ClassItem::Perl(c));
                    continue;
                }
                _ => c,
            }
        } else {
            let c = chars[i];
            i += 1;
            c
        };
        if chars.get(i) == Some(&'-') && i + 1 < end && chars[i + 1] != ']' {
            let hi = chars[i + 1];
            i += 2;
            items.push(ClassItem::Range(c, hi));
        } else {
            items.push(ClassItem::Single(c));
        }
    }
    if i >= end || chars[i] != ']' {
        return None; // unterminated class
    }
    Some((Atom::Class { negated, items }, i + 1))
}

fn perl_matches(kind: char, c: char) -> bool {
    match kind {
        'd' => c.is_ascii_digit(),
        'D' => !c.is_ascii_digit(),
        'w' => c.is_alphanumeric() || c == '_',
        'W' => !(c.is_alphanumeric() || c == '_'),
        's' => c.is_whitespace(),
        'S' => !c.is_whitespace(),
        _ => false,
    }
}

fn atom_matches(atom: &Atom, c: char) -> bool {
    match atom {
        Atom::Literal(l) => *l == c,
        Atom::Any => true,
        Atom::Perl(kind) => perl_matches(*kind, c),
        Atom::Class { negated, items } => {
            let hit = items.iter().any(|item| match item {
                ClassItem::Single(s) => *s == c,
                ClassItem::Range(lo, hi) => *lo <= c && c <= *hi,
                ClassItem::Perl(kind) => perl_matches(*kind, c),
            });
            hit != *negated
        }
    }
}

fn run(pattern: &Pattern, value: &str) -> bool {
    let text: Vec<char> = value.chars().collect();
    if pattern.anchored_start {
        return match_here(pattern, &text, 0, 0);
    }
    (0..=text.len()).any(|start| match_here(pattern, &text, 0, start))
}

fn match_here(pattern: &Pattern, text: &[char], pi: usize, ti: usize) -> bool {
    if pi == pattern.pieces.len() {
        return !pattern.anchored_end || ti == text.len();
    }
    let piece = &pattern.pieces[pi];
    match piece.quant {
        Quant::One => {
            ti < text.len()
                && atom_matches(&piece.atom, text[ti])
                && match_here(pattern, text, pi + 1, ti + 1)
        }
        Quant::Opt => {
            (ti < text.len()
                && atom_matches(&piece.atom, text[ti])
                && match_here(pattern, text, pi + 1, ti + 1))
                || match_here(pattern, text, pi + 1, ti)
        }
        Quant::Star => match_repeat(pattern, text, pi, ti, 0),
        Quant::Plus => match_repeat(pattern, text, pi, ti, 1),
    }
}

/// Greedy repetition: consume as many matching characters as possible, then
/// back off until the rest of the pattern matches.
fn match_repeat(pattern: &Pattern, text: &[char], pi: usize, ti: usize, min: usize) -> bool {
    let piece = &pattern.pieces[pi];
    let mut count = 0usize;
    while ti + count < text.len() && atom_matches(&piece.atom, text[ti + count]) {
        count += 1;
    }
    loop {
        if count >= min && match_here(pattern, text, pi + 1, ti + count) {
            return true;
        }
        if count == 0 {
            return false;
        }
        count -= 1;
    }
}

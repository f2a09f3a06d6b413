//! Literal rendering of untrusted text
//!
//! Questions, answers and source excerpts come from users and from the
//! server. They are shown exactly as written: nothing is parsed as
//! markup, and characters that would steer the terminal (escape
//! sequences, other control characters, bidi overrides) are shown as
//! visible escapes instead of being emitted.

/// Text safe to put on a terminal, with markup characters untouched
pub fn literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if is_unsafe(c) {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    out
}

fn is_unsafe(c: char) -> bool {
    match c {
        '\n' | '\t' => false,
        c if c.is_control() => true,
        // Bidi embeddings, overrides and isolates
        '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}' => true,
        _ => false,
    }
}

/// Single-line form for lists and status lines
pub fn literal_line(text: &str) -> String {
    literal(text).replace(['\n', '\t'], " ")
}

//! Text normalization for card bodies
//!
//! User prompts and backend replies flow into markdown-style card bodies.
//! Before embedding, control characters are normalized (newline folding)
//! and raw HTML/script-like sequences are stripped so a hostile prompt can
//! never smuggle markup into the rendered card.

/// Normalize free text for embedding in a card body.
///
/// - `\r\n` and bare `\r` fold to `\n`
/// - control characters other than `\n` and `\t` are dropped
/// - `<script>...</script>` blocks are removed wholesale
/// - any remaining `<...>` tag-like sequences are stripped
pub fn normalize(text: &str) -> String {
    let folded = text.replace("\r\n", "\n").replace('\r', "\n");
    let no_scripts = strip_script_blocks(&folded);
    let no_tags = strip_tags(&no_scripts);
    no_tags
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Remove `<script ...> ... </script>` blocks, case-insensitively. An
/// unterminated block is stripped to the end of the text (fail closed).
fn strip_script_blocks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;

    while let Some(start) = find_ascii_ci(text, "<script", pos) {
        out.push_str(&text[pos..start]);
        match find_ascii_ci(text, "</script>", start) {
            Some(end) => pos = end + "</script>".len(),
            None => return out,
        }
    }
    out.push_str(&text[pos..]);
    out
}

/// Case-insensitive search for an ASCII needle, returning a byte offset.
/// Matches start and end on ASCII bytes, so the offsets are always valid
/// char boundaries.
fn find_ascii_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if from + n.len() > h.len() {
        return None;
    }
    (from..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

/// Strip `<...>` sequences that look like tags. A lone `<` with no closing
/// `>` is kept as-is (it is ordinary text, e.g. "a < b").
fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        match rest[open..].find('>') {
            Some(close) => rest = &rest[open + close + 1..],
            None => {
                out.push_str(&rest[open..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

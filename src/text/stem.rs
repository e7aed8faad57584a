//! Tactic stem extraction

/// Leading bullet and focusing characters stripped before the stem
const BULLET_CHARS: &[char] = &['-', '+', '*', '{', '}'];

/// The head word of a tactic: `"  - apply foo."` → `"apply"`,
/// `"reflexivity."` → `"reflexivity"`.
///
/// Returns `None` for tactics that are only bullets, braces or whitespace.
pub fn get_stem(tactic: &str) -> Option<String> {
    let body = tactic
        .trim()
        .trim_start_matches(|c: char| BULLET_CHARS.contains(&c) || c.is_whitespace());
    let word = body.split_whitespace().next()?;
    let word = word.strip_suffix('.').unwrap_or(word);

    if word.is_empty() {
        None
    } else {
        Some(word.to_string())
    }
}

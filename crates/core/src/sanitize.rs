/// Replaces characters that are unsafe in file names with `_` and trims
/// surrounding whitespace. Empty input stays empty.
pub fn sanitize(value: &str) -> String {
    let out: String = value
        .chars()
        .map(|ch| if is_disallowed_char(ch) { '_' } else { ch })
        .collect();
    out.trim().to_string()
}

fn is_disallowed_char(ch: char) -> bool {
    matches!(ch, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || ch.is_control()
}

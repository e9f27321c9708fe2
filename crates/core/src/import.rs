//! Turning pasted text and pre-tokenized rows into participant names.

const SEPARATORS: [char; 3] = [',', ';', '\n'];

/// Splits free text on newlines, commas, semicolons and whitespace, dropping
/// empty tokens.
pub fn split_names(raw: &str) -> Vec<String> {
    raw.split(|ch: char| SEPARATORS.contains(&ch) || ch.is_whitespace())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Flattens imported rows, skipping row numbers and e-mail addresses.
pub fn names_from_rows(rows: &[Vec<String>]) -> Vec<String> {
    rows.iter()
        .flatten()
        .map(|token| token.trim())
        .filter(|token| !token.is_empty() && !is_numeric(token) && !token.contains('@'))
        .map(str::to_string)
        .collect()
}

fn is_numeric(token: &str) -> bool {
    token.parse::<f64>().is_ok_and(|value| value.is_finite())
}

//! Decomposition of a client's free-text interests into `Client_Interests` rows.

/// Characters that separate interests in the free-text field.
pub const DELIMITERS: [char; 2] = [',', ';'];

/// Split free text into interest tokens.
///
/// Splits on `,` or `;`, trims surrounding whitespace and drops empty tokens.
/// A token that repeats an earlier one is dropped, since `(uid, interest)`
/// is the primary key of `Client_Interests`. Order of first appearance is kept.
pub fn parse_interests(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for token in text.split(DELIMITERS).map(str::trim) {
        if token.is_empty() || tokens.iter().any(|t| t == token) {
            continue;
        }
        tokens.push(token.to_string());
    }
    tokens
}

//! Tokenizer for command input.
//!
//! Turns a raw input line into clean tokens in two passes:
//! - Whitespace splitting (empty tokens dropped)
//! - Quote merging: `"hello world"` and `'hello world'` become one token
//!   with the quotes stripped, including values such as `-name="John Doe"`

/// Quote characters that group whitespace-separated words.
const QUOTES: [char; 2] = ['"', '\''];

/// Tokenizes a command line.
///
/// An unterminated quote is not an error: the partial tokens are kept as they are.
pub fn tokenize(input: &str) -> Vec<String> {
    merge_quoted(&sanitize(input))
}

/// Splits on runs of whitespace, dropping empty tokens.
pub fn sanitize(input: &str) -> Vec<String> {
    input.split_whitespace().map(str::to_string).collect()
}

/// Splits `text` on `separator`, trimming every piece and dropping empty ones.
pub fn split_clean(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        let trimmed = text.trim();
        return if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![trimmed.to_string()]
        };
    }

    text.split(separator)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// Rejoins tokens that belong to one quoted run.
pub fn merge_quoted(tokens: &[String]) -> Vec<String> {
    let mut merged = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];

        let Some((pos, quote)) = opening_quote(token) else {
            merged.push(token.clone());
            i += 1;
            continue;
        };

        let prefix = &token[..pos];
        let rest = &token[pos + quote.len_utf8()..];

        // Quoted run closes inside the same token: "word"
        if let Some(inner) = rest.strip_suffix(quote) {
            merged.push(format!("{prefix}{inner}"));
            i += 1;
            continue;
        }

        let closing = tokens[i + 1..]
            .iter()
            .position(|t| t.ends_with(quote))
            .map(|offset| i + 1 + offset);

        match closing {
            Some(end) => {
                let mut parts: Vec<&str> = Vec::with_capacity(end - i + 1);
                parts.push(rest);
                parts.extend(tokens[i + 1..end].iter().map(String::as_str));
                let last = &tokens[end];
                parts.push(&last[..last.len() - quote.len_utf8()]);

                merged.push(format!("{prefix}{}", parts.join(" ")));
                i = end + 1;
            }
            None => {
                merged.push(token.clone());
                i += 1;
            }
        }
    }

    merged
}

/// Finds a quote that opens a quoted run: at the start of the token or right after `=`.
fn opening_quote(token: &str) -> Option<(usize, char)> {
    let first = token.chars().next()?;
    if QUOTES.contains(&first) {
        return Some((0, first));
    }

    let eq = token.find('=')?;
    let after = token[eq + 1..].chars().next()?;
    QUOTES.contains(&after).then_some((eq + 1, after))
}

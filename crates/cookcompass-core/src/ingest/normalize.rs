//! Normalization of list-valued CSV fields
//!
//! Recipe datasets store ingredients, steps and tags as list literals such as
//! `['salt', "chef's knife"]`. These helpers turn them into plain text.

/// Parse a quoted list literal into its items
///
/// Returns `None` when the text is not a well-formed list of string literals.
pub fn parse_list_literal(text: &str) -> Option<Vec<String>> {
    let inner = text.trim().strip_prefix('[')?.strip_suffix(']')?;
    let mut chars = inner.chars().peekable();
    let mut items = Vec::new();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let Some(quote) = chars.next() else {
            break;
        };
        if quote != '\'' && quote != '"' {
            return None;
        }

        let mut item = String::new();
        let mut closed = false;
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next()? {
                    'n' => item.push('\n'),
                    't' => item.push('\t'),
                    other => item.push(other),
                },
                c if c == quote => {
                    closed = true;
                    break;
                }
                c => item.push(c),
            }
        }
        if !closed {
            return None;
        }
        items.push(item);

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            Some(',') => continue,
            None => break,
            Some(_) => return None,
        }
    }

    Some(items)
}

/// Render a list literal as `a, b, c`; anything else is returned unchanged
pub fn clean_list_string(text: &str) -> String {
    if !text.trim_start().starts_with('[') {
        return text.to_string();
    }
    match parse_list_literal(text) {
        Some(items) => items.join(", "),
        None => text.to_string(),
    }
}

/// Split a tag field into individual tags
///
/// Accepts a list literal or a comma-separated string.
pub fn parse_tags(text: &str) -> Vec<String> {
    let items = parse_list_literal(text)
        .unwrap_or_else(|| text.split(',').map(str::to_string).collect());

    items
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

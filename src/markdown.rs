use crate::search::SearchResults;

/// Escape characters that break Markdown link syntax: `[`, `]`, `(`, `)`.
pub(crate) fn escape_md_link(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '[' | ']' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Replaces newlines, which would end a heading or list item early.
pub(crate) fn single_line(s: &str) -> String {
    s.chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

pub fn format_results(results: &SearchResults, query: &str) -> String {
    let mut output = format!("# Results: {}\n\n", single_line(query));

    if results.is_empty() {
        output.push_str("No results.\n");
        return output;
    }

    output.push_str(&format!(
        "Showing {} of {} result(s).\n\n",
        results.len(),
        results.total()
    ));

    for (i, result) in results.results().iter().enumerate() {
        let title = if result.title().is_empty() {
            "untitled"
        } else {
            result.title()
        };
        output.push_str(&format!(
            "{}. [{}]({}) `{:.3}`\n",
            i + 1,
            escape_md_link(&single_line(title)),
            escape_md_link(result.path()),
            result.score()
        ));
        if !result.description().is_empty() {
            output.push_str(&format!("   {}\n", single_line(result.description())));
        }
    }

    output
}

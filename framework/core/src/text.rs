/// Bound `text` to at most `limit` characters for inclusion in error messages and reports.
pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let cut: String = text.chars().take(limit).collect();
        format!("{}...(truncated)", cut)
    }
}

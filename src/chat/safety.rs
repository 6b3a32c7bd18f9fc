use regex::RegexSet;
use std::sync::OnceLock;

const SQL_PATTERNS: &[&str] = &[
    r"(?i)\b(select|insert|update|delete|drop|alter|exec|union|create|where)\b.*\b(from|into|table|database|values)\b",
    r"'.*'.*;",
    r#"".*".*;"#,
    r"--",
    r"/\*",
    r";\s*$",
    r"(?i)\b(or|and)\b\s+\w+\s*(=|<|>|<=|>=)\s*\w+",
];

static SQL_GUARD: OnceLock<Option<RegexSet>> = OnceLock::new();

fn sql_guard() -> Option<&'static RegexSet> {
    SQL_GUARD
        .get_or_init(|| match RegexSet::new(SQL_PATTERNS) {
            Ok(set) => Some(set),
            Err(err) => {
                tracing::error!(error = %err, "sql guard patterns failed to compile");
                None
            }
        })
        .as_ref()
}

/// True when `input` carries none of the known injection shapes. Fails closed
/// if the guard could not be built.
pub fn is_sql_safe(input: &str) -> bool {
    if input.is_empty() {
        return true;
    }
    match sql_guard() {
        Some(guard) => !guard.is_match(input),
        None => false,
    }
}

/// HTML-escapes text bound for the network. Display copies are never passed
/// through here.
pub fn sanitize_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{is_sql_safe, sanitize_string};

    #[test]
    fn rejects_classic_injection() {
        assert!(!is_sql_safe("'; DROP TABLE users; --"));
        assert!(!is_sql_safe("admin' OR 1=1"));
        assert!(!is_sql_safe("select * from jobs"));
        assert!(!is_sql_safe("hello /* comment"));
        assert!(!is_sql_safe("show me jobs;"));
    }

    #[test]
    fn accepts_ordinary_questions() {
        assert!(is_sql_safe(""));
        assert!(is_sql_safe("Find remote data analyst roles in Pune"));
        assert!(is_sql_safe("What sessions are happening this week?"));
        assert!(is_sql_safe("user-1234"));
    }

    #[test]
    fn sanitize_escapes_html_and_ampersand_first() {
        assert_eq!(
            sanitize_string(r#"<b>"R&D" / it's</b>"#),
            "&lt;b&gt;&quot;R&amp;D&quot; &#x2F; it&#x27;s&lt;&#x2F;b&gt;"
        );
        assert_eq!(sanitize_string("plain text"), "plain text");
    }
}

//! Output helpers shared by the commands.

/// Pretty-print `raw` when it is JSON; otherwise return it as text.
pub fn render_payload(raw: &[u8]) -> String {
    match serde_json::from_slice::<serde_json::Value>(raw) {
        Ok(value) => serde_json::to_string_pretty(&value)
            .unwrap_or_else(|_| String::from_utf8_lossy(raw).into_owned()),
        Err(_) => String::from_utf8_lossy(raw).into_owned(),
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn split_csv(s: Option<&str>) -> Vec<String> {
    s.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_skips_empty() {
        assert!(split_csv(None).is_empty());
        assert!(split_csv(Some("")).is_empty());
        assert_eq!(
            split_csv(Some(" a.com, ,b.org,")),
            vec!["a.com".to_string(), "b.org".to_string()]
        );
    }

    #[test]
    fn render_pretty_json() {
        assert_eq!(render_payload(br#"{"a":1}"#), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn render_raw_when_not_json() {
        assert_eq!(render_payload(b"# plain markdown"), "# plain markdown");
    }
}

//! `list hostinfo`.

use super::{HostInfoRecord, ParseError, normalize_key};

/// `Host Information:` and the blank line after it.
const HEADER_LINES: usize = 2;

const SEPARATOR: &str = ": ";

const GRAMMAR: &str = "host info";

/// Skip the two header lines, then split every remaining non-blank line once
/// on `": "`. Host info has no sentinel handling: values are kept as trimmed
/// strings, empty ones included.
pub fn parse_host_info(text: &str) -> Result<HostInfoRecord, ParseError> {
    let mut info = HostInfoRecord::new();
    for (idx, line) in text.lines().enumerate().skip(HEADER_LINES) {
        if line.trim().is_empty() {
            continue;
        }
        let (key, value) = line
            .split_once(SEPARATOR)
            .ok_or_else(|| ParseError::malformed(GRAMMAR, idx + 1, line, "expected \"key: value\""))?;
        info.insert(normalize_key(key), value.trim().to_string());
    }
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_skipped() {
        let text = "Host Information:\n\nHost time: 2022-01-21T09:12:31.000000000Z\nProcessor#0 Speed: 3800 MHz\n";
        let info = parse_host_info(text).unwrap();
        assert_eq!(info.len(), 2);
        assert!(!info.contains_key("host_information:"));
        assert!(!info.contains_key("host_information"));
        assert_eq!(info["host_time"], "2022-01-21T09:12:31.000000000Z");
        assert_eq!(info["processor#0_speed"], "3800 MHz");
    }

    #[test]
    fn splits_on_first_separator_only() {
        let text = "Host Information:\n\nProcessor#0 description: CPU: fast: yes\n";
        let info = parse_host_info(text).unwrap();
        assert_eq!(info["processor#0_description"], "CPU: fast: yes");
    }

    #[test]
    fn header_only_or_empty_text_gives_nothing() {
        assert!(parse_host_info("").unwrap().is_empty());
        assert!(parse_host_info("Host Information:\n\n").unwrap().is_empty());
    }

    #[test]
    fn line_without_separator_is_malformed() {
        let text = "Host Information:\n\nProcessor count: 8\nnot a field\n";
        match parse_host_info(text).unwrap_err() {
            ParseError::MalformedLine { grammar, line, reason } => {
                assert_eq!(grammar, "host info");
                assert_eq!(line, 4);
                assert!(reason.contains("not a field"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

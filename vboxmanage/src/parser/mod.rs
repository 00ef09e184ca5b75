//! Parsers for the text `VBoxManage list` prints.
//!
//! Values are always kept as strings; nothing is coerced to a number even
//! when it looks like one (`"3800 MHz"` stays `"3800 MHz"`). Where the tool
//! prints the `<none>` sentinel or nothing at all, records store `None`.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

mod hostinfo;
mod records;
mod vms;

pub use hostinfo::parse_host_info;
pub use records::{parse_groups, parse_properties, parse_records};
pub use vms::{parse_long_list, parse_running_vms, parse_short_list, parse_vms};

/// Token `VBoxManage` prints for an unset field.
pub const NONE_SENTINEL: &str = "<none>";

/// Offending lines quoted in errors are cut to this many characters.
const MAX_QUOTED_CHARS: usize = 80;

/// Short form: UUID -> VM name.
pub type VmIndex = BTreeMap<String, String>;

/// Normalized field name -> value, `None` where the tool printed no value.
pub type Record = BTreeMap<String, Option<String>>;

/// One VM from `list -l vms`.
pub type VmRecord = Record;

/// Normalized field name -> value from `list hostinfo`.
pub type HostInfoRecord = BTreeMap<String, String>;

/// Parsed output of one directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ListOutput {
    VmIndex(VmIndex),
    VmRecords(BTreeMap<String, VmRecord>),
    HostInfo(HostInfoRecord),
    Properties(Record),
    Records(Vec<Record>),
    Groups(Vec<String>),
}

impl ListOutput {
    /// Number of top-level entries (VMs, fields, records or groups).
    pub fn len(&self) -> usize {
        match self {
            ListOutput::VmIndex(m) => m.len(),
            ListOutput::VmRecords(m) => m.len(),
            ListOutput::HostInfo(m) => m.len(),
            ListOutput::Properties(m) => m.len(),
            ListOutput::Records(v) => v.len(),
            ListOutput::Groups(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Text that does not follow the grammar selected for it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed {grammar} output at line {line}: {reason}")]
    MalformedLine {
        grammar: &'static str,
        /// 1-based line number within the parsed text.
        line: usize,
        reason: String,
    },
    #[error("vm block {block} has no uuid field")]
    MissingUuid {
        /// 1-based block index.
        block: usize,
    },
}

impl ParseError {
    pub(crate) fn malformed(grammar: &'static str, line: usize, text: &str, why: &str) -> Self {
        ParseError::MalformedLine {
            grammar,
            line,
            reason: format!("{why}: {:?}", quote(text)),
        }
    }
}

fn quote(text: &str) -> String {
    let text = text.trim();
    match text.char_indices().nth(MAX_QUOTED_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Canonical field name: trimmed, lowercase, spaces as underscores, and
/// `(`, `)`, `,`, `.` removed. Applying it twice changes nothing.
pub fn normalize_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | ',' | '.'))
        .collect()
}

/// `None` for the sentinel and for empty values.
fn field_value(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() || value == NONE_SENTINEL {
        None
    } else {
        Some(value.to_string())
    }
}

/// `<key>:<value>` where the key is made of word, space, `(`, `)`, `,`, `-`,
/// `.` and `/` characters. Anything else is not a field line.
fn field_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([\w\s(),./-]+):(.*)").expect("valid field regex"))
}

/// Split a field line into its normalized key and value.
fn field(line: &str) -> Option<(String, Option<String>)> {
    let caps = field_line_re().captures(line)?;
    Some((normalize_key(&caps[1]), field_value(&caps[2])))
}

/// Fold every field line into one record; later duplicates win.
fn collect_fields<'a>(lines: impl Iterator<Item = &'a str>) -> Record {
    let mut record = Record::new();
    for line in lines {
        if let Some((key, value)) = field(line) {
            record.insert(key, value);
        }
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_keys() {
        assert_eq!(normalize_key("  Guest OS "), "guest_os");
        assert_eq!(normalize_key("Paravirt. Provider"), "paravirt_provider");
        assert_eq!(normalize_key("SATA (0, 0)"), "sata_0_0");
        assert_eq!(normalize_key("NIC 1 Rule(0)"), "nic_1_rule0");
        assert_eq!(normalize_key("Processor#0 Speed"), "processor#0_speed");
        assert_eq!(normalize_key("Nested VT-x/AMD-V"), "nested_vt-x/amd-v");
    }

    #[test]
    fn normalization_is_a_fixed_point() {
        for raw in [
            "VT-x Unrestricted Exec.",
            "Storage Controller Max Port Count (1)",
            "Operating system version",
            "already_normal",
            "",
        ] {
            let once = normalize_key(raw);
            assert_eq!(normalize_key(&once), once);
        }
    }

    #[test]
    fn sentinel_and_empty_values_become_none() {
        assert_eq!(field_value(" <none> "), None);
        assert_eq!(field_value("   "), None);
        assert_eq!(field_value(""), None);
        assert_eq!(field_value(" 1024MB "), Some("1024MB".to_string()));
        // only the whole value is a sentinel
        assert_eq!(field_value("<none> yet"), Some("<none> yet".to_string()));
    }

    #[test]
    fn field_key_stops_at_first_colon() {
        let (key, value) = field("NIC 1 Settings:  MTU: 0, Socket (send: 64)").unwrap();
        assert_eq!(key, "nic_1_settings");
        assert_eq!(value.as_deref(), Some("MTU: 0, Socket (send: 64)"));
    }

    #[test]
    fn non_field_lines_are_not_fields() {
        assert!(field("Memory size                  1024MB").is_none());
        assert!(field("<none>").is_none());
        assert!(field("Processor#0 Speed: 3800 MHz").is_none());
        assert!(field("").is_none());
    }

    #[test]
    fn long_lines_are_cut_when_quoted() {
        let long = "x".repeat(200);
        let quoted = quote(&long);
        assert_eq!(quoted.len(), MAX_QUOTED_CHARS + 3);
        assert!(quoted.ends_with("..."));
        assert_eq!(quote("  short  "), "short");
    }

    #[test]
    fn list_output_serializes_without_tags() {
        let mut index = VmIndex::new();
        index.insert("uuid-1".into(), "box".into());
        let json = serde_json::to_value(ListOutput::VmIndex(index)).unwrap();
        assert_eq!(json, serde_json::json!({"uuid-1": "box"}));

        let groups = ListOutput::Groups(vec!["/".into(), "/dev".into()]);
        assert_eq!(serde_json::to_value(&groups).unwrap(), serde_json::json!(["/", "/dev"]));
        assert_eq!(groups.len(), 2);
        assert!(!groups.is_empty());

        let mut record = Record::new();
        record.insert("name".into(), None);
        let json = serde_json::to_value(ListOutput::Properties(record)).unwrap();
        assert_eq!(json, serde_json::json!({"name": null}));
    }
}

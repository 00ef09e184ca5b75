//! Interface, network, DHCP, group and system property listings.
//!
//! These share the `key: value` line grammar of `list -l vms` but are laid
//! out differently: interface-style listings separate entries with a single
//! blank line, `systemproperties` is one flat block, `groups` is one quoted
//! path per line.

use super::{ParseError, Record, collect_fields};

const GROUPS_GRAMMAR: &str = "groups";

/// Entries separated by one or more blank lines, in output order.
///
/// Used for `intnets`, `bridgedifs`, `hostonlyifs`, `natnets` and
/// `dhcpservers`. Lines that are not `key: value` fields are ignored; a block
/// with no fields at all produces no record.
pub fn parse_records(text: &str) -> Vec<Record> {
    let mut records = Vec::new();
    let mut block: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            flush_block(&mut block, &mut records);
        } else {
            block.push(line);
        }
    }
    flush_block(&mut block, &mut records);
    records
}

fn flush_block(block: &mut Vec<&str>, records: &mut Vec<Record>) {
    if block.is_empty() {
        return;
    }
    let record = collect_fields(block.drain(..));
    if !record.is_empty() {
        records.push(record);
    }
}

/// `systemproperties`: every field line folded into a single record.
pub fn parse_properties(text: &str) -> Record {
    collect_fields(text.lines())
}

/// `groups`: each non-blank line is a double-quoted group path.
pub fn parse_groups(text: &str) -> Result<Vec<String>, ParseError> {
    let mut groups = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let path = line
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .ok_or_else(|| {
                ParseError::malformed(GROUPS_GRAMMAR, idx + 1, line, "expected a quoted group")
            })?;
        groups.push(path.to_string());
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_split_on_blank_lines() {
        let text = "Name:            intnet\n\nName:            backend\n\n\n\nName:     dmz\nExtra:    <none>\n";
        let records = parse_records(text);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["name"].as_deref(), Some("intnet"));
        assert_eq!(records[1]["name"].as_deref(), Some("backend"));
        assert_eq!(records[2]["extra"], None);
    }

    #[test]
    fn records_skip_blocks_without_fields() {
        let records = parse_records("Port-forwarding (ipv4)\n\nName: natnet1\n");
        assert_eq!(records.len(), 1);
        assert!(parse_records("").is_empty());
        assert!(parse_records("\n \n").is_empty());
    }

    #[test]
    fn properties_form_one_record() {
        let text = "API version:                     6_1\nMinimum guest RAM size:          4 Megabytes\nDefault Guest Additions ISO:     \n";
        let props = parse_properties(text);
        assert_eq!(props.len(), 3);
        assert_eq!(props["api_version"].as_deref(), Some("6_1"));
        assert_eq!(props["minimum_guest_ram_size"].as_deref(), Some("4 Megabytes"));
        assert_eq!(props["default_guest_additions_iso"], None);
    }

    #[test]
    fn groups_are_unquoted() {
        assert_eq!(
            parse_groups("\"/\"\n\"/dev\"\n\n\"/dev/web\"\n").unwrap(),
            ["/", "/dev", "/dev/web"]
        );
        assert!(parse_groups("").unwrap().is_empty());
    }

    #[test]
    fn unquoted_group_is_malformed() {
        let err = parse_groups("\"/\"\n/dev\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::MalformedLine { grammar: "groups", line: 2, .. }
        ));
    }
}

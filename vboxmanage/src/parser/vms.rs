//! `list vms` and `list runningvms`, short and long form.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use super::{ListOutput, ParseError, VmIndex, VmRecord, collect_fields};

/// Blocks in `list -l vms` are separated by two fully blank lines.
const VM_BLOCK_SEPARATOR: &str = "\n\n\n";

const GRAMMAR: &str = "vm list";

fn short_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""([\w-]+)"\s+\{([\w-]+)\}"#).expect("valid vm line regex"))
}

/// `"<name>" {<uuid>}` per line into UUID -> name.
///
/// Blank lines are skipped, so empty or whitespace-only text gives an empty
/// index. Any other line that does not carry a quoted name and a braced UUID
/// fails the whole parse.
pub fn parse_short_list(text: &str) -> Result<VmIndex, ParseError> {
    let mut vms = VmIndex::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let caps = short_line_re()
            .captures(line)
            .ok_or_else(|| ParseError::malformed(GRAMMAR, idx + 1, line, "expected \"name\" {uuid}"))?;
        vms.insert(caps[2].to_string(), caps[1].to_string());
    }
    Ok(vms)
}

/// `list -l vms` blocks into UUID -> record.
///
/// Each block is keyed by the `uuid` field found inside it, so a block
/// without one cannot be indexed and fails the parse.
pub fn parse_long_list(text: &str) -> Result<BTreeMap<String, VmRecord>, ParseError> {
    let mut vms = BTreeMap::new();
    for (idx, block) in text.split(VM_BLOCK_SEPARATOR).enumerate() {
        if block.trim().is_empty() {
            continue;
        }
        let record = collect_fields(block.lines());
        let Some(Some(uuid)) = record.get("uuid").cloned() else {
            return Err(ParseError::MissingUuid { block: idx + 1 });
        };
        vms.insert(uuid, record);
    }
    Ok(vms)
}

/// `list [-l] vms`: the long grammar when `long` is set, the short one otherwise.
pub fn parse_vms(text: &str, long: bool) -> Result<ListOutput, ParseError> {
    if long {
        parse_long_list(text).map(ListOutput::VmRecords)
    } else {
        parse_short_list(text).map(ListOutput::VmIndex)
    }
}

/// `list [-l] runningvms` prints exactly what `list vms` prints, filtered.
pub fn parse_running_vms(text: &str, long: bool) -> Result<ListOutput, ParseError> {
    parse_vms(text, long)
}

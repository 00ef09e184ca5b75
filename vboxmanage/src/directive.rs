//! The closed set of `VBoxManage list` directives.
//!
//! Each directive owns exactly one output grammar, so resolving a name and
//! picking its parser is a `match`, never a lookup by string.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::parser::{self, ListOutput, ParseError};

/// A subcommand mode of `VBoxManage list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Directive {
    Vms,
    RunningVms,
    IntNets,
    HostInfo,
    Groups,
    SystemProperties,
    BridgedIfs,
    HostOnlyIfs,
    NatNets,
    DhcpServers,
}

/// Returned when a name is not one of the supported directives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a list directive.")]
pub struct UnknownDirective(pub String);

impl Directive {
    /// Every directive, in declaration order.
    pub const ALL: [Directive; 10] = [
        Directive::Vms,
        Directive::RunningVms,
        Directive::IntNets,
        Directive::HostInfo,
        Directive::Groups,
        Directive::SystemProperties,
        Directive::BridgedIfs,
        Directive::HostOnlyIfs,
        Directive::NatNets,
        Directive::DhcpServers,
    ];

    /// Token passed to `VBoxManage list`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Directive::Vms => "vms",
            Directive::RunningVms => "runningvms",
            Directive::IntNets => "intnets",
            Directive::HostInfo => "hostinfo",
            Directive::Groups => "groups",
            Directive::SystemProperties => "systemproperties",
            Directive::BridgedIfs => "bridgedifs",
            Directive::HostOnlyIfs => "hostonlyifs",
            Directive::NatNets => "natnets",
            Directive::DhcpServers => "dhcpservers",
        }
    }

    /// The grammar `VBoxManage` uses when printing this directive.
    pub fn grammar(&self) -> Grammar {
        match self {
            Directive::Vms | Directive::RunningVms => Grammar::VmList,
            Directive::HostInfo => Grammar::HostInfo,
            Directive::SystemProperties => Grammar::Properties,
            Directive::Groups => Grammar::Groups,
            Directive::IntNets
            | Directive::BridgedIfs
            | Directive::HostOnlyIfs
            | Directive::NatNets
            | Directive::DhcpServers => Grammar::Records,
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Directive {
    type Err = UnknownDirective;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Directive::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| UnknownDirective(s.to_string()))
    }
}

impl Serialize for Directive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Text layouts produced by `VBoxManage list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    /// `"name" {uuid}` lines, or `key: value` blocks split by two blank lines with `-l`.
    VmList,
    /// Two header lines, then `key: value` lines.
    HostInfo,
    /// A single block of `key: value` lines.
    Properties,
    /// `key: value` blocks split by blank lines.
    Records,
    /// One quoted group path per line.
    Groups,
}

impl Grammar {
    /// Short label used in error messages and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Grammar::VmList => "vm list",
            Grammar::HostInfo => "host info",
            Grammar::Properties => "properties",
            Grammar::Records => "records",
            Grammar::Groups => "groups",
        }
    }

    /// Parse `text` with this grammar. `long` only matters for [`Grammar::VmList`].
    pub fn parse(&self, text: &str, long: bool) -> Result<ListOutput, ParseError> {
        match self {
            Grammar::VmList => parser::parse_vms(text, long),
            Grammar::HostInfo => parser::parse_host_info(text).map(ListOutput::HostInfo),
            Grammar::Properties => Ok(ListOutput::Properties(parser::parse_properties(text))),
            Grammar::Records => Ok(ListOutput::Records(parser::parse_records(text))),
            Grammar::Groups => parser::parse_groups(text).map(ListOutput::Groups),
        }
    }
}

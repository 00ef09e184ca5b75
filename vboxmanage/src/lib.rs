//! Command builder and output parsers for `VBoxManage list`.
//!
//! Rather than talking to VirtualBox over its COM/XPCOM API, this crate builds
//! the argument vector for the `VBoxManage` command line tool and parses the
//! text it prints back into typed maps.
//!
//! ```
//! use vboxmanage::{CommandBuilder, Directive, ListOptions};
//!
//! let argv = CommandBuilder::default().build(Directive::Vms, ListOptions::new(true, false));
//! assert_eq!(argv.as_slice(), ["VBoxManage", "list", "-s", "vms"]);
//!
//! let out = Directive::Vms
//!     .grammar()
//!     .parse("\"box-1\" {77bd1e0e-edc6-47fc-807a-987c296c64dd}\n", false)
//!     .unwrap();
//! assert_eq!(out.len(), 1);
//! ```
//!
//! Everything here is pure: no process spawning, no I/O, no shared state.

mod builder;
mod directive;
pub mod parser;

pub use builder::{CommandBuilder, CommandVector, DEFAULT_PROGRAM, LIST_SUBCOMMAND, ListOptions};
pub use directive::{Directive, Grammar, UnknownDirective};
pub use parser::{
    HostInfoRecord, ListOutput, ParseError, Record, VmIndex, VmRecord, normalize_key,
};

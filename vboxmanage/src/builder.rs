//! Argument vectors for `VBoxManage list`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::directive::{Directive, UnknownDirective};

/// Program name used when no explicit path is configured.
pub const DEFAULT_PROGRAM: &str = "VBoxManage";

/// Subcommand every vector built here starts with.
pub const LIST_SUBCOMMAND: &str = "list";

/// Flags for `VBoxManage list`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    /// Append `-s` (sorted output).
    #[serde(default)]
    pub sort: bool,
    /// Append `-l` (long output); also selects the long grammar for VM lists.
    #[serde(default)]
    pub long: bool,
}

impl ListOptions {
    pub fn new(sort: bool, long: bool) -> Self {
        Self { sort, long }
    }
}

/// A ready-to-spawn argv: program first, arguments after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommandVector(Vec<String>);

impl CommandVector {
    pub fn program(&self) -> &str {
        // Only `CommandBuilder` constructs these, and it always pushes the program first.
        &self.0[0]
    }

    pub fn args(&self) -> &[String] {
        &self.0[1..]
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl fmt::Display for CommandVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

/// Stateless builder for `VBoxManage list` command lines.
///
/// Cheap to clone; holds nothing but the program path, so build as many as
/// you like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBuilder {
    program: String,
}

impl Default for CommandBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl CommandBuilder {
    /// Builder targeting a specific `VBoxManage` executable.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// `[program, "list", "-s"?, "-l"?, directive]`
    pub fn build(&self, directive: Directive, options: ListOptions) -> CommandVector {
        let mut argv = Vec::with_capacity(5);
        argv.push(self.program.clone());
        argv.push(LIST_SUBCOMMAND.to_string());
        if options.sort {
            argv.push("-s".to_string());
        }
        if options.long {
            argv.push("-l".to_string());
        }
        argv.push(directive.as_str().to_string());
        CommandVector(argv)
    }

    /// Resolve `name` and build its vector.
    pub fn build_named(
        &self,
        name: &str,
        options: ListOptions,
    ) -> Result<CommandVector, UnknownDirective> {
        let directive = name.parse::<Directive>()?;
        Ok(self.build(directive, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn list_vms() {
        let cmd = CommandBuilder::default().build(Directive::Vms, ListOptions::default());
        assert_eq!(cmd.into_inner(), argv("VBoxManage list vms"));
    }

    #[test]
    fn list_sorted_vms() {
        let cmd = CommandBuilder::default().build(Directive::Vms, ListOptions::new(true, false));
        assert_eq!(cmd.into_inner(), argv("VBoxManage list -s vms"));
    }

    #[test]
    fn list_sort_long_vms() {
        let cmd = CommandBuilder::default().build(Directive::Vms, ListOptions::new(true, true));
        assert_eq!(cmd.into_inner(), argv("VBoxManage list -s -l vms"));
    }

    #[test]
    fn list_runningvms() {
        let builder = CommandBuilder::default();
        assert_eq!(
            builder
                .build(Directive::RunningVms, ListOptions::default())
                .into_inner(),
            argv("VBoxManage list runningvms")
        );
        assert_eq!(
            builder
                .build(Directive::RunningVms, ListOptions::new(true, false))
                .into_inner(),
            argv("VBoxManage list -s runningvms")
        );
    }

    #[test]
    fn long_only_flags() {
        let builder = CommandBuilder::default();
        assert_eq!(
            builder
                .build(Directive::IntNets, ListOptions::new(false, true))
                .into_inner(),
            argv("VBoxManage list -l intnets")
        );
        assert_eq!(
            builder
                .build(Directive::HostInfo, ListOptions::new(false, true))
                .into_inner(),
            argv("VBoxManage list -l hostinfo")
        );
    }

    #[test]
    fn every_directive_and_flag_combination() {
        let builder = CommandBuilder::default();
        for directive in Directive::ALL {
            for (sort, long) in [(false, false), (true, false), (false, true), (true, true)] {
                let cmd = builder.build(directive, ListOptions::new(sort, long));
                let v = cmd.as_slice();
                assert_eq!(&v[..2], ["VBoxManage", "list"]);
                assert_eq!(v.last().map(String::as_str), Some(directive.as_str()));
                assert_eq!(v.iter().any(|a| a == "-s"), sort);
                assert_eq!(v.iter().any(|a| a == "-l"), long);
                if sort && long {
                    assert_eq!(&v[2..4], ["-s", "-l"]);
                }
                assert_eq!(v.len(), 3 + usize::from(sort) + usize::from(long));
            }
        }
    }

    #[test]
    fn build_named_rejects_unknown_directive() {
        let builder = CommandBuilder::default();
        assert_eq!(
            builder.build_named("not-a-directive", ListOptions::default()),
            Err(UnknownDirective("not-a-directive".into()))
        );
        assert_eq!(
            builder
                .build_named("dhcpservers", ListOptions::default())
                .map(CommandVector::into_inner),
            Ok(argv("VBoxManage list dhcpservers"))
        );
    }

    #[test]
    fn custom_program_path() {
        let builder = CommandBuilder::new("/usr/lib/virtualbox/VBoxManage");
        let cmd = builder.build(Directive::Groups, ListOptions::default());
        assert_eq!(cmd.program(), "/usr/lib/virtualbox/VBoxManage");
        assert_eq!(cmd.args(), ["list", "groups"]);
        assert_eq!(cmd.to_string(), "/usr/lib/virtualbox/VBoxManage list groups");
    }
}

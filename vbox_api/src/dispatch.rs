//! Resolve requested directives, run them, parse what comes back.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use vboxmanage::{CommandBuilder, Directive, ListOptions, ListOutput, ParseError, UnknownDirective};

use crate::runner::{CommandRunner, ExecError};

/// Why a `/vbox` request could not be answered.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    UnknownDirective(#[from] UnknownDirective),
    #[error("running `{directive}` failed: {source}")]
    Execution {
        directive: Directive,
        #[source]
        source: ExecError,
    },
    #[error("parsing `{directive}` output failed: {source}")]
    Parse {
        directive: Directive,
        #[source]
        source: ParseError,
    },
}

impl DispatchError {
    /// The caller asked for something that does not exist.
    pub fn is_client_error(&self) -> bool {
        matches!(self, DispatchError::UnknownDirective(_))
    }

    /// Which step failed: `resolve`, `execute` or `parse`.
    pub fn stage(&self) -> &'static str {
        match self {
            DispatchError::UnknownDirective(_) => "resolve",
            DispatchError::Execution { .. } => "execute",
            DispatchError::Parse { .. } => "parse",
        }
    }

    /// The directive involved, as the caller spelled it.
    pub fn directive(&self) -> String {
        match self {
            DispatchError::UnknownDirective(UnknownDirective(name)) => name.clone(),
            DispatchError::Execution { directive, .. } | DispatchError::Parse { directive, .. } => {
                directive.to_string()
            }
        }
    }
}

/// Every parsed directive plus the flags the batch ran with.
///
/// Serializes flat: `{"sort": .., "long": .., "<directive>": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponsePayload {
    pub sort: bool,
    pub long: bool,
    #[serde(flatten)]
    pub results: BTreeMap<Directive, ListOutput>,
}

impl ResponsePayload {
    pub fn new(options: ListOptions) -> Self {
        Self {
            sort: options.sort,
            long: options.long,
            results: BTreeMap::new(),
        }
    }
}

/// Turns a list of directive names into one [`ResponsePayload`].
///
/// Stateless apart from its builder and runner; one instance serves every
/// request.
#[derive(Debug, Clone)]
pub struct Dispatcher<R> {
    builder: CommandBuilder,
    runner: R,
}

impl<R: CommandRunner> Dispatcher<R> {
    pub fn new(builder: CommandBuilder, runner: R) -> Self {
        Self { builder, runner }
    }

    pub fn builder(&self) -> &CommandBuilder {
        &self.builder
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Resolve every name up front so a bad one fails the request before any
    /// process is started.
    pub fn resolve(names: &[String]) -> Result<Vec<Directive>, DispatchError> {
        names
            .iter()
            .map(|name| {
                name.parse::<Directive>().map_err(|e| {
                    warn!(directive = %name, "bad list directive");
                    DispatchError::from(e)
                })
            })
            .collect()
    }

    /// Run one directive and parse its output with the grammar it owns.
    pub async fn run_directive(
        &self,
        directive: Directive,
        options: ListOptions,
    ) -> Result<ListOutput, DispatchError> {
        let command = self.builder.build(directive, options);
        debug!(%directive, command = %command, "running list directive");

        let output = self
            .runner
            .run(&command)
            .await
            .map_err(|source| {
                error!(%directive, error = %source, "list command failed");
                DispatchError::Execution { directive, source }
            })?;

        directive
            .grammar()
            .parse(&output, options.long)
            .map_err(|source| {
                error!(%directive, error = %source, "unexpected list output");
                DispatchError::Parse { directive, source }
            })
    }

    /// Resolve, run and parse `names` in order.
    ///
    /// A repeated directive runs again and its latest result replaces the
    /// earlier one. An empty request still echoes `sort` and `long`.
    pub async fn handle(
        &self,
        names: &[String],
        options: ListOptions,
    ) -> Result<ResponsePayload, DispatchError> {
        let directives = Self::resolve(names)?;
        info!(sort = options.sort, long = options.long, count = directives.len(), "listing");

        let mut payload = ResponsePayload::new(options);
        for directive in directives {
            let parsed = self.run_directive(directive, options).await?;
            info!(%directive, entries = parsed.len(), "directive parsed");
            payload.results.insert(directive, parsed);
        }
        Ok(payload)
    }
}

//! # vbox-api - HTTP front end for `VBoxManage list`
//!
//! Takes `GET /vbox?query=<directive>&sort=<bool>&long=<bool>`, runs
//! `VBoxManage list [-s] [-l] <directive>` for every requested directive and
//! answers with the parsed output as JSON.
//!
//! ## Features
//!
//! - **Closed directive set**: unknown names are rejected before anything runs
//! - **Typed parsing**: short and long VM lists, host info, properties, records, groups
//! - **Bounded execution**: every `VBoxManage` call is killed after a timeout
//! - **Distinct failures**: bad directive, failed command and unparsable output map to different statuses
//!
//! ## Usage as Library
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use tokio_util::sync::CancellationToken;
//! use vbox_api::{Dispatcher, ProcessRunner, serve_on};
//! use vboxmanage::CommandBuilder;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let dispatcher = Arc::new(Dispatcher::new(
//!         CommandBuilder::new("/usr/bin/VBoxManage"),
//!         ProcessRunner::new(Duration::from_secs(10)),
//!     ));
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//!     serve_on(listener, dispatcher, CancellationToken::new()).await
//! }
//! ```

// ─────────────────────────────────────────────────────────────────────────────
// Public modules
// ─────────────────────────────────────────────────────────────────────────────

pub mod config;
pub mod dispatch;
pub mod runner;
pub mod server;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports for convenience
// ─────────────────────────────────────────────────────────────────────────────

pub use config::{CliOptions, Config, ResolvedParams, expand_path, load_config, resolve_params};
pub use dispatch::{DispatchError, Dispatcher, ResponsePayload};
pub use runner::{CommandRunner, ExecError, ProcessRunner};
pub use server::{ApiError, ListResponse, router, run, serve, serve_on};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

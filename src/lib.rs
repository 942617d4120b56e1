//! # p4triage
//!
//! Interactive triage of a Perforce workspace. Files are sorted into three
//! buckets: opened with real changes, opened without changes ("hijacked"),
//! and modified on disk without being opened. The operator can then check
//! out, reconcile, or force-sync the files they pick.
//!
//! Every version-control effect is a `p4` subprocess call; its text output is
//! the only contract.
//!
//! ## Modules
//!
//! - `subprocess` - Process abstraction, tokio runner, mock runner, and the typed `p4` wrapper
//! - `classify` - Output parsers and the three-bucket scanner, hijacked analysis, changelists
//! - `selection` - Selection expressions (`all`, `2,4`, `1-5`) and action filters
//! - `actions` - Checkout, reconcile, and confirmed force sync
//! - `storage` - Recent folders and baseline snapshot under `~/.p4triage`
//! - `config` - `~/.p4triage/config.yml` settings
//! - `console` - Prompts, spinner, rendering, pickers, and the main menu
//! - `app` - Command-line options, logging, and fatal error reporting
pub mod actions;
pub mod app;
pub mod classify;
pub mod config;
pub mod console;
pub mod error;
pub mod selection;
pub mod storage;
pub mod subprocess;

pub use error::{Error, Result};

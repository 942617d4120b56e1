//! Workspace classification.
//!
//! Each query maps to one bucket of a [`ScanResult`]:
//! - `p4 diff -se` finds opened files with content changes
//! - `p4 diff -sr` finds opened files without changes (hijacked)
//! - `p4 reconcile -n` finds files modified on disk that are not opened

pub mod changelists;
pub mod hijacked;
pub mod parser;
pub mod scanner;
pub mod types;

pub use changelists::{list_changelists, Changelist};
pub use hijacked::{hijacked_status, HijackedReport};
pub use scanner::Scanner;
pub use types::{ClientInfo, FileAction, ModifiedFile, ScanOptions, ScanResult};

use std::path::Path;

use crate::error::{Error, Result};
use crate::subprocess::P4Runner;

/// Query `p4 info` and resolve the client it describes
pub async fn fetch_client_info(p4: &dyn P4Runner, current_dir: &Path) -> Result<ClientInfo> {
    let output = p4.info().await.map_err(|e| {
        if e.is_unavailable() {
            Error::NotConnected(e.to_string())
        } else {
            Error::Process(e)
        }
    })?;

    if !output.status.success() {
        let reason = output.stderr.trim();
        return Err(Error::NotConnected(if reason.is_empty() {
            "p4 info failed".to_string()
        } else {
            reason.to_string()
        }));
    }

    parser::parse_client_info(&output.stdout, current_dir)
}

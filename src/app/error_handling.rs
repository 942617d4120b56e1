use tracing::error;

use crate::error::Error;

/// Report a fatal error and exit with status 1.
///
/// A lost connection prints the `NOT CONNECTED` status line; with `-v` the
/// full cause chain follows the message.
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {}", error);

    match error.downcast_ref::<Error>() {
        Some(Error::NotConnected(reason)) => {
            eprintln!("Status: NOT CONNECTED");
            eprintln!("  {reason}");
            eprintln!("Make sure p4 is installed and P4PORT, P4USER and P4CLIENT are set.");
        }
        _ => eprintln!("Error: {error}"),
    }

    if verbose >= 1 {
        eprintln!("\nError chain:");
        for (i, cause) in error.chain().enumerate() {
            eprintln!("  {}: {}", i, cause);
        }
    }

    std::process::exit(1)
}

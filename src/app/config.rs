//! Process-level options taken from the command line

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Verbosity level for logging
    pub verbose: u8,
    /// Directory the session starts in
    pub working_dir: PathBuf,
}

impl AppConfig {
    pub fn new(verbose: u8) -> anyhow::Result<Self> {
        let working_dir = std::env::current_dir()
            .map_err(|e| anyhow::anyhow!("Failed to get current directory: {}", e))?;

        Ok(Self {
            verbose,
            working_dir,
        })
    }

    /// Tracing filter for the verbosity level
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// The elapsed-time spinner is only worth showing with `-v` or more
    pub fn verbose_scan(&self) -> bool {
        self.verbose >= 1
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            verbose: 0,
            working_dir: PathBuf::from("."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_mapping() {
        let level = |verbose| AppConfig {
            verbose,
            ..Default::default()
        }
        .log_level();

        assert_eq!(level(0), "info");
        assert_eq!(level(1), "debug");
        assert_eq!(level(2), "trace");
        assert_eq!(level(5), "trace");
    }
}

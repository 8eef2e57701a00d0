//! Progress reporting for long-running extractions

use crate::error::Result;
use std::io::{self, Write};

/// Receives `(percent, message)` updates from the extractor
///
/// Failures are reported back but never abort an extraction.
pub trait ProgressReporter {
    fn report(&self, percent: u8, message: &str) -> Result<()>;
}

/// Progress indicator printing to stderr
pub struct ProgressIndicator {
    enabled: bool,
}

impl ProgressIndicator {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl ProgressReporter for ProgressIndicator {
    fn report(&self, percent: u8, message: &str) -> Result<()> {
        if self.enabled {
            let mut stderr = io::stderr().lock();
            writeln!(stderr, "[{:>3}%] {}", percent.min(100), message)?;
        }
        log::debug!("progress {}%: {}", percent, message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_indicator_reports_nothing_and_succeeds() {
        let indicator = ProgressIndicator::new(false);
        assert!(indicator.report(50, "Checking Chromium...").is_ok());
    }
}

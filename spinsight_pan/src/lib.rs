//! Parser for the verification logs written by SPIN-generated `pan` verifiers.
//!
//! ```
//! let log = spinsight_pan::PanLog::parse(
//!     "pan:1: assertion violated (x == 3) (at depth 4)\n\
//!      State-vector 28 byte, depth reached 4, errors: 1\n",
//! );
//! assert_eq!(log.statistics.depth_reached, 4);
//! assert_eq!(log.failures()[0].condition(), Some("x == 3"));
//! ```

mod classifier;
mod failure;
mod stats;

pub use classifier::{LogLine, classify_line};
pub use failure::{classify_failures, reports_no_errors};
pub use stats::{ErrorLine, parse_statistics};

use log::{info, warn};
use serde::Serialize;
use spinsight_core::{FailureEvent, Verdict, VerificationStatistics};

/// Everything recovered from one verification log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanLog {
    /// Statistics and settings of the verification run.
    pub statistics: VerificationStatistics,
    /// Lines mentioning an error, in log order.
    pub error_lines: Vec<ErrorLine>,
    /// Failures recognized in the log.
    pub verdict: Verdict,
}

impl PanLog {
    /// Parses the full text of a verification log.
    ///
    /// Parsing never fails: unrecognized lines are ignored
    /// and unreported fields keep their default value.
    pub fn parse(text: &str) -> Self {
        let time = std::time::Instant::now();
        info!(target: "parser", "parsing verification log");
        let (statistics, error_lines) = parse_statistics(text);
        let verdict = Verdict::new(classify_failures(text), reports_no_errors(text));
        if verdict == Verdict::ParseCouldNotClassify {
            warn!("verification log reports neither a known failure nor success");
        }
        info!("parsing verification log completed in {:?}", time.elapsed());
        Self {
            statistics,
            error_lines,
            verdict,
        }
    }

    /// Failures recognized in the log.
    pub fn failures(&self) -> &[FailureEvent] {
        self.verdict.failures()
    }
}

//! Readers for the outputs of SPIN simulation runs:
//! execution trails, guided-simulation listings and simulation transcripts.
//!
//! ```
//! # use spinsight_sim::{SimConfig, parse_transcript};
//! let transcript = "===start Sim===\n\
//!                   proc 0 (:init::1) [f!operator,43]\n\
//!                   ===end Sim===\n";
//! let events = parse_transcript(transcript, &SimConfig::default()).unwrap();
//! assert_eq!(events[0].label(), "f!operator,43");
//! ```

mod classify;
mod error;
mod labels;
mod trail;
mod transcript;

pub use classify::{EventClassifier, SimConfig, parse_transcript};
pub use error::{Marker, SimError};
pub use labels::{ProcessLabeler, base_name};
pub use trail::{parse_trail, parse_trail_listing};
pub use transcript::extract_block;

//! Format-independent model of a SPIN verification run,
//! reconstructed from the textual artifacts the model checker leaves behind.
//!
//! The model covers:
//!
//! - the statistics and checks reported by a verification log ([`VerificationStatistics`]);
//! - the failures the log reports ([`FailureEvent`], summarized by a [`Verdict`]);
//! - the transitions of an execution trail ([`Transition`], [`TrailStep`]),
//!   optionally next to the model source lines they executed ([`ModelSource`]);
//! - the per-process actions of a simulated run ([`ActionEvent`]);
//! - the message exchanges between processes ([`MessageSequenceChart`]);
//! - the transcript lines relevant to a failed assertion ([`CausalSlice`]).
//!
//! Parsing the concrete text formats is left to the format crates;
//! this crate only knows about the parsed values and how to relate them.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod equivalence;
mod event;
mod failure;
mod msc;
mod slice;
mod stats;
mod trail;

pub use equivalence::ChannelEquivalence;
pub use event::{ActionEvent, Direction, EventKind, Pid, spawn_depths};
pub use failure::{FailureEvent, Verdict};
pub use msc::{
    CommunicationEdge, CommunicationMatcher, MatchKind, MessageSequenceChart, UnmatchedReceive,
};
pub use slice::{CausalSlice, SliceRole, SliceStep, implicated_variable};
pub use stats::VerificationStatistics;
pub use trail::{AnnotatedTransition, INVALID_LINE, ModelSource, TrailStep, Transition};

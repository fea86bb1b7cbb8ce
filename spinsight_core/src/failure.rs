use serde::Serialize;
use std::fmt::Display;

/// A verification failure reported by a log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureEvent {
    /// An assertion was violated.
    AssertionViolated {
        /// Literal text of the asserted condition.
        condition: String,
        /// Model line of the assertion, when the log reports it.
        line: Option<u32>,
    },
    /// No process could proceed.
    Deadlock,
    /// The run ended with processes outside of a valid end state.
    InvalidEndState {
        /// Search depth at which the state was reached, when reported.
        depth: Option<u64>,
    },
    /// A send or receive had no partner.
    UnmatchedCommunication,
    /// A never claim (liveness property) was violated.
    NeverClaimViolated,
}

impl FailureEvent {
    /// Short title of the failure.
    pub fn title(&self) -> String {
        match self {
            FailureEvent::AssertionViolated {
                condition,
                line: Some(line),
            } => format!("Assertion failed: {condition} at line {line}"),
            FailureEvent::AssertionViolated {
                condition,
                line: None,
            } => format!("Assertion failed: {condition}"),
            FailureEvent::Deadlock => "Deadlock detected".to_string(),
            FailureEvent::InvalidEndState { depth: Some(depth) } => {
                format!("Invalid end state (depth {depth})")
            }
            FailureEvent::InvalidEndState { depth: None } => "Invalid end state".to_string(),
            FailureEvent::UnmatchedCommunication => "Unmatched send/receive detected".to_string(),
            FailureEvent::NeverClaimViolated => "Never claim violated".to_string(),
        }
    }

    /// What the failure means for the model.
    pub fn explanation(&self) -> &'static str {
        match self {
            FailureEvent::AssertionViolated { .. } => {
                "An assertion failed during the run: a condition specified in the model was violated, indicating a potential bug or invalid state."
            }
            FailureEvent::Deadlock => {
                "The system reached a state where no further progress is possible because processes are waiting indefinitely."
            }
            FailureEvent::InvalidEndState { .. } => {
                "The model ended in a state where not all processes were properly terminated. The depth tells how deep in the state space this occurred."
            }
            FailureEvent::UnmatchedCommunication => {
                "A message was sent or expected but never properly received, leading to a communication mismatch."
            }
            FailureEvent::NeverClaimViolated => {
                "A behavior the never claim forbids was observed, breaking a specified safety or liveness property."
            }
        }
    }

    /// The asserted condition, for assertion violations.
    pub fn condition(&self) -> Option<&str> {
        match self {
            FailureEvent::AssertionViolated { condition, .. } => Some(condition),
            _ => None,
        }
    }
}

impl Display for FailureEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Overall outcome of classifying a verification log.
///
/// The absence of recognized failures does not by itself mean that verification succeeded:
/// the log may use a phrasing no classifier knows about.
/// The two situations are kept apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "failures", rename_all = "snake_case")]
pub enum Verdict {
    /// At least one failure was recognized.
    Failed(Vec<FailureEvent>),
    /// No failure was recognized and the log explicitly reports zero errors.
    NoFailureDetected,
    /// No failure was recognized, but the log does not report success either.
    ParseCouldNotClassify,
}

impl Verdict {
    /// Builds the verdict from the recognized failures
    /// and whether the log explicitly reports zero errors.
    pub fn new(failures: Vec<FailureEvent>, reports_no_errors: bool) -> Self {
        if !failures.is_empty() {
            Verdict::Failed(failures)
        } else if reports_no_errors {
            Verdict::NoFailureDetected
        } else {
            Verdict::ParseCouldNotClassify
        }
    }

    /// The recognized failures (empty unless [`Verdict::Failed`]).
    pub fn failures(&self) -> &[FailureEvent] {
        match self {
            Verdict::Failed(failures) => failures,
            _ => &[],
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Failed(failures) => write!(f, "{} failure(s) detected", failures.len()),
            Verdict::NoFailureDetected => write!(f, "no failure detected"),
            Verdict::ParseCouldNotClassify => {
                write!(f, "no recognized failure (log could not be classified)")
            }
        }
    }
}

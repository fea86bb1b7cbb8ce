use serde::Serialize;
use std::collections::BTreeMap;

/// Statistics and settings reported by a verification log.
///
/// Fields the log does not report keep their default value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VerificationStatistics {
    /// Version banner of the verifier, if printed.
    pub spin_version: Option<String>,
    /// Size of the state vector, in bytes.
    pub state_vector_bytes: u64,
    /// Maximum search depth reached.
    pub depth_reached: u64,
    /// Number of errors the verifier reports.
    pub errors: u64,
    /// States stored in the state space.
    pub states_stored: u64,
    /// States visited during search.
    pub states_visited: u64,
    /// States matched against already-stored ones.
    pub states_matched: u64,
    /// Transitions explored.
    pub transitions: u64,
    /// Atomic steps executed.
    pub atomic_steps: u64,
    /// Hash conflicts encountered.
    pub hash_conflicts: u64,
    /// Memory usage (megabytes) per component.
    pub memory_usage: BTreeMap<String, f64>,
    /// Elapsed time of the verification run, in seconds.
    pub elapsed_seconds: f64,
    /// Final status line (e.g. `No errors found -- did you verify all claims?`).
    pub final_status: String,
    /// Lines reporting unreached code.
    pub unreached: Vec<String>,
    /// Commands used to generate, compile and run the verifier.
    pub compilation_commands: Vec<String>,
    /// Search settings that were enabled.
    pub settings: Vec<String>,
    /// Whether each check (e.g. `assertion_violations`) was enabled.
    pub checks: BTreeMap<String, bool>,
}

impl VerificationStatistics {
    /// Total memory reported across all components, in megabytes.
    pub fn total_memory(&self) -> f64 {
        self.memory_usage.values().sum()
    }
}

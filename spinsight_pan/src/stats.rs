use crate::{LogLine, classify_line};
use log::debug;
use serde::Serialize;
use spinsight_core::VerificationStatistics;

/// A log line mentioning an assertion violation, an invalid end state or a deadlock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorLine {
    /// The matched error keyword, lowercased.
    pub kind: String,
    /// The trimmed line.
    pub message: String,
    /// Depth reported as `at depth N`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<u64>,
    /// Step reported as `step N`, when no depth is given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<u64>,
}

/// Folds the facts of every line of `text` into statistics and error lines.
///
/// Scalar fields take the value of the last line reporting them.
pub fn parse_statistics(text: &str) -> (VerificationStatistics, Vec<ErrorLine>) {
    let mut stats = VerificationStatistics::default();
    let mut errors = Vec::new();
    for line in text.lines() {
        for fact in classify_line(line) {
            apply(&mut stats, &mut errors, fact);
        }
    }
    debug!(
        "statistics: {} states stored, {} transitions, {} error lines",
        stats.states_stored,
        stats.transitions,
        errors.len()
    );
    (stats, errors)
}

fn apply(stats: &mut VerificationStatistics, errors: &mut Vec<ErrorLine>, fact: LogLine) {
    match fact {
        LogLine::Version(version) => stats.spin_version = Some(version),
        LogLine::CompilationCommand(command) => stats.compilation_commands.push(command),
        LogLine::Setting(setting) => stats.settings.push(setting.to_owned()),
        LogLine::Check { name, enabled } => {
            stats.checks.insert(name.to_owned(), enabled);
        }
        LogLine::StateVector {
            bytes,
            depth,
            errors,
        } => {
            stats.state_vector_bytes = bytes;
            stats.depth_reached = depth;
            stats.errors = errors;
        }
        LogLine::StatesStored { stored, visited } => {
            if let Some(stored) = stored {
                stats.states_stored = stored;
            }
            if let Some(visited) = visited {
                stats.states_visited = visited;
            }
        }
        LogLine::StatesMatched(matched) => stats.states_matched = matched,
        LogLine::Transitions(transitions) => stats.transitions = transitions,
        LogLine::AtomicSteps(steps) => stats.atomic_steps = steps,
        LogLine::HashConflicts(conflicts) => stats.hash_conflicts = conflicts,
        LogLine::Memory(pairs) => stats.memory_usage.extend(pairs),
        LogLine::Unreached(report) => stats.unreached.push(report),
        LogLine::ElapsedTime(seconds) => stats.elapsed_seconds = seconds,
        LogLine::FinalStatus(status) => stats.final_status = status,
        LogLine::Error(error) => errors.push(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn later_lines_override() {
        let (stats, _) = parse_statistics("   12 transitions (= stored+matched)\n  40 transitions\n");
        assert_eq!(stats.transitions, 40);
    }

    #[test]
    fn stored_without_visited() {
        let (stats, _) = parse_statistics("       20 states, stored\n");
        assert_eq!(stats.states_stored, 20);
        assert_eq!(stats.states_visited, 0);

        let (stats, _) = parse_statistics("       20 states, stored (31 visited)\n");
        assert_eq!(stats.states_visited, 31);
    }

    #[test]
    fn memory_by_label() {
        let (stats, _) = parse_statistics(
            "1.0 memory used for a (x) 2.0 memory used for b\n3.0 memory used for a (y)\n",
        );
        assert_eq!(
            stats.memory_usage,
            BTreeMap::from([("a".to_string(), 3.0), ("b".to_string(), 2.0)])
        );
    }

    #[test]
    fn empty_log() {
        let (stats, errors) = parse_statistics("");
        assert_eq!(stats, VerificationStatistics::default());
        assert!(errors.is_empty());
    }
}

use crate::ErrorLine;
use log::trace;
use regex::Regex;
use smallvec::SmallVec;
use std::sync::LazyLock;

/// A fact recognized on a single log line.
#[derive(Debug, Clone, PartialEq)]
pub enum LogLine {
    /// Verifier version banner.
    Version(String),
    /// A command used to generate, compile or run the verifier.
    CompilationCommand(String),
    /// An enabled search setting.
    Setting(&'static str),
    /// Whether a check was enabled.
    Check {
        /// Name of the check.
        name: &'static str,
        /// Whether the line marks the check as enabled (`+`).
        enabled: bool,
    },
    /// The state-vector summary line.
    StateVector {
        /// State-vector size in bytes.
        bytes: u64,
        /// Depth reached.
        depth: u64,
        /// Number of errors.
        errors: u64,
    },
    /// Stored (and possibly visited) states.
    StatesStored {
        /// First integer on the line.
        stored: Option<u64>,
        /// Second integer on the line.
        visited: Option<u64>,
    },
    /// Matched states.
    StatesMatched(u64),
    /// Explored transitions.
    Transitions(u64),
    /// Executed atomic steps.
    AtomicSteps(u64),
    /// Hash conflicts.
    HashConflicts(u64),
    /// (label, megabytes) pairs of memory usage.
    Memory(Vec<(String, f64)>),
    /// An unreached-code report.
    Unreached(String),
    /// Elapsed seconds.
    ElapsedTime(f64),
    /// The final status line.
    FinalStatus(String),
    /// A line mentioning an error.
    Error(ErrorLine),
}

type Facts = SmallVec<[LogLine; 2]>;

#[derive(Clone, Copy)]
enum Classifier {
    /// At most one fact per line.
    One(fn(&str) -> Option<LogLine>),
    /// One fact per match on the line.
    Each(fn(&str) -> Facts),
}

// Every classifier sees every line, in this order.
const CLASSIFIERS: &[(&str, Classifier)] = &[
    ("version", Classifier::One(version)),
    ("compilation", Classifier::One(compilation)),
    ("setting", Classifier::Each(settings)),
    ("check", Classifier::Each(checks)),
    ("state-vector", Classifier::One(state_vector)),
    ("states-stored", Classifier::One(states_stored)),
    ("states-matched", Classifier::One(states_matched)),
    ("transitions", Classifier::One(transitions)),
    ("atomic-steps", Classifier::One(atomic_steps)),
    ("hash-conflicts", Classifier::One(hash_conflicts)),
    ("memory", Classifier::One(memory)),
    ("unreached", Classifier::One(unreached)),
    ("elapsed-time", Classifier::One(elapsed_time)),
    ("final-status", Classifier::One(final_status)),
    ("error", Classifier::One(error)),
];

const SETTINGS: &[(&str, &str)] = &[
    ("Partial Order Reduction", "Partial Order Reduction enabled"),
    ("Compression", "Compression enabled"),
    ("Breadth-First Search", "Breadth-First Search enabled"),
];

static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Spin Version (\S+)").expect("valid regex"));
static CHECKS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"never claim", "never_claim"),
        (r"assertion violations", "assertion_violations"),
        (r"non-progress cycles", "non_progress_cycles"),
        (r"acceptance\s+cycles", "acceptance_cycles"),
        (r"invalid end states", "invalid_end_states"),
    ]
    .into_iter()
    .map(|(pattern, name)| (Regex::new(pattern).expect("valid regex"), name))
    .collect()
});
static STATE_VECTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"State-vector (\d+) byte, depth reached (\d+), errors: (\d+)").expect("valid regex")
});
static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));
static MEMORY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9.]+)\s+memory used for ([^(]+)").expect("valid regex"));
static ELAPSED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"elapsed time ([\d.]+) seconds").expect("valid regex"));
static ERROR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(assertion violated|invalid end states?|deadlock)").expect("valid regex")
});
static AT_DEPTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)at depth (\d+)").expect("valid regex"));
static STEP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)step\s*(\d+)").expect("valid regex"));

/// Recognizes all facts carried by one log line.
///
/// A line can carry any number of facts, including none.
pub fn classify_line(line: &str) -> SmallVec<[LogLine; 2]> {
    let mut facts = Facts::new();
    for &(name, classifier) in CLASSIFIERS {
        let known = facts.len();
        match classifier {
            Classifier::One(classify) => facts.extend(classify(line)),
            Classifier::Each(classify) => facts.extend(classify(line)),
        }
        if facts.len() > known {
            trace!("{name}: {line}");
        }
    }
    facts
}

fn integers(line: &str) -> impl Iterator<Item = u64> + '_ {
    INTEGER
        .find_iter(line)
        .filter_map(|m| m.as_str().parse().ok())
}

fn first_integer(line: &str) -> Option<u64> {
    integers(line).next()
}

fn version(line: &str) -> Option<LogLine> {
    let caps = VERSION.captures(line)?;
    Some(LogLine::Version(caps[1].to_owned()))
}

fn compilation(line: &str) -> Option<LogLine> {
    (line.trim_start().starts_with("spin -a") || line.contains("gcc") || line.contains("./pan"))
        .then(|| LogLine::CompilationCommand(line.trim().to_owned()))
}

fn settings(line: &str) -> Facts {
    SETTINGS
        .iter()
        .filter(|(needle, _)| line.contains(needle))
        .map(|&(_, setting)| LogLine::Setting(setting))
        .collect()
}

fn checks(line: &str) -> Facts {
    CHECKS
        .iter()
        .filter(|(pattern, _)| pattern.is_match(line))
        .map(|&(_, name)| LogLine::Check {
            name,
            enabled: line.contains('+'),
        })
        .collect()
}

fn state_vector(line: &str) -> Option<LogLine> {
    let caps = STATE_VECTOR.captures(line)?;
    Some(LogLine::StateVector {
        bytes: caps[1].parse().ok()?,
        depth: caps[2].parse().ok()?,
        errors: caps[3].parse().ok()?,
    })
}

fn states_stored(line: &str) -> Option<LogLine> {
    if !line.contains("states, stored") {
        return None;
    }
    let mut values = integers(line);
    Some(LogLine::StatesStored {
        stored: values.next(),
        visited: values.next(),
    })
}

fn states_matched(line: &str) -> Option<LogLine> {
    line.contains("states, matched")
        .then(|| first_integer(line))
        .flatten()
        .map(LogLine::StatesMatched)
}

fn transitions(line: &str) -> Option<LogLine> {
    line.contains("transitions")
        .then(|| first_integer(line))
        .flatten()
        .map(LogLine::Transitions)
}

fn atomic_steps(line: &str) -> Option<LogLine> {
    line.contains("atomic steps")
        .then(|| first_integer(line))
        .flatten()
        .map(LogLine::AtomicSteps)
}

fn hash_conflicts(line: &str) -> Option<LogLine> {
    line.contains("hash conflicts")
        .then(|| first_integer(line))
        .flatten()
        .map(LogLine::HashConflicts)
}

fn memory(line: &str) -> Option<LogLine> {
    if !(line.contains("memory used") || line.contains("memory usage")) {
        return None;
    }
    let pairs: Vec<(String, f64)> = MEMORY
        .captures_iter(line)
        .filter_map(|caps| Some((caps[2].trim().to_owned(), caps[1].parse().ok()?)))
        .collect();
    (!pairs.is_empty()).then_some(LogLine::Memory(pairs))
}

fn unreached(line: &str) -> Option<LogLine> {
    (line.contains("unreached in proctype") || line.contains("unreached in init"))
        .then(|| LogLine::Unreached(line.trim().to_owned()))
}

fn elapsed_time(line: &str) -> Option<LogLine> {
    let caps = ELAPSED.captures(line)?;
    Some(LogLine::ElapsedTime(caps[1].parse().ok()?))
}

fn final_status(line: &str) -> Option<LogLine> {
    line.contains("errors found")
        .then(|| LogLine::FinalStatus(line.trim().to_owned()))
}

fn error(line: &str) -> Option<LogLine> {
    let message = line.trim();
    let caps = ERROR.captures(message)?;
    let kind = caps[1].to_lowercase();
    // The plural is the check table entry.
    if kind == "invalid end states" {
        return None;
    }
    let depth = AT_DEPTH
        .captures(message)
        .and_then(|caps| caps[1].parse().ok());
    let step = if depth.is_none() {
        STEP.captures(message).and_then(|caps| caps[1].parse().ok())
    } else {
        None
    };
    Some(LogLine::Error(ErrorLine {
        kind,
        message: message.to_owned(),
        depth,
        step,
    }))
}

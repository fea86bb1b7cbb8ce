use crate::transcript::TranscriptLine;
use crate::{ProcessLabeler, SimError, extract_block};
use log::{debug, info, trace};
use regex::Regex;
use spinsight_core::{ActionEvent, Direction, EventKind, Pid};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static CHANNEL_OP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\w+)\s*([!?])\s*([^,\]\s]+)\s*,?\s*(.*)$").expect("valid regex")
});

/// How transcript events are normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Channel names to replace, e.g. a local alias by the numeric channel id.
    pub aliases: BTreeMap<String, String>,
    /// Proctypes whose instances are numbered.
    pub ordinal_templates: Vec<String>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            aliases: BTreeMap::new(),
            ordinal_templates: vec!["calc".to_string()],
        }
    }
}

/// Turns the lines of a simulation block into [`ActionEvent`]s.
///
/// Process labels and the owner of the last event are carried across lines,
/// so lines must be fed in block order.
#[derive(Debug, Clone)]
pub struct EventClassifier {
    aliases: BTreeMap<String, String>,
    labeler: ProcessLabeler,
    last_owner: Option<Pid>,
}

impl EventClassifier {
    /// Creates an [`EventClassifier`] from the given configuration.
    pub fn new(config: &SimConfig) -> Self {
        Self {
            aliases: config.aliases.clone(),
            labeler: ProcessLabeler::new(config.ordinal_templates.iter().cloned()),
            last_owner: None,
        }
    }

    /// Classifies the line at `source_line` of the block, if it is an event.
    pub fn classify(&mut self, source_line: usize, line: &str) -> Option<ActionEvent> {
        let Some(shape) = TranscriptLine::recognize(line) else {
            trace!("line {source_line} is not an event");
            return None;
        };
        let event = match shape {
            TranscriptLine::Create {
                from,
                descriptor,
                to,
                name,
            } => {
                self.labeler.register(to, name);
                let spawned_label = self.labeler.label(to, Some(name));
                ActionEvent {
                    process_id: from,
                    process_label: self.labeler.label(from, Some(descriptor)),
                    action: format!("run {name}"),
                    kind: EventKind::Create {
                        from,
                        to,
                        spawned_label,
                    },
                    source_line,
                }
            }
            TranscriptLine::Terminate { pid, descriptor } => ActionEvent {
                process_id: pid,
                process_label: self.labeler.label(pid, descriptor),
                action: "terminates".to_string(),
                kind: EventKind::Termination,
                source_line,
            },
            TranscriptLine::AssertionFailure {
                pid,
                descriptor,
                text,
            } => {
                let pid = pid.or(self.last_owner).unwrap_or_default();
                ActionEvent {
                    process_id: pid,
                    process_label: self.labeler.label(pid, descriptor),
                    action: text.to_owned(),
                    kind: EventKind::AssertionFailure,
                    source_line,
                }
            }
            TranscriptLine::Action {
                pid,
                descriptor,
                text,
            } => ActionEvent {
                process_id: pid,
                process_label: self.labeler.label(pid, Some(descriptor)),
                action: text.to_owned(),
                kind: self.action_kind(text),
                source_line,
            },
        };
        debug!(
            "line {source_line}: {} {}",
            event.process_label,
            event.label()
        );
        self.last_owner = Some(event.process_id);
        Some(event)
    }

    fn action_kind(&self, text: &str) -> EventKind {
        let Some(caps) = CHANNEL_OP.captures(text) else {
            return EventKind::PlainAction;
        };
        // `x != 3` is a comparison.
        if caps[3].starts_with('=') {
            return EventKind::PlainAction;
        }
        let Some(direction) = caps[2].chars().next().and_then(Direction::from_op) else {
            return EventKind::PlainAction;
        };
        let channel = &caps[1];
        EventKind::ChannelOp {
            direction,
            channel: self
                .aliases
                .get(channel)
                .map_or(channel, String::as_str)
                .to_owned(),
            message_type: caps[3].to_owned(),
            payload: caps[4].trim().to_owned(),
        }
    }

    /// Classifies every line of a simulation block.
    pub fn classify_block<S: AsRef<str>>(mut self, lines: &[S]) -> Vec<ActionEvent> {
        lines
            .iter()
            .enumerate()
            .filter_map(|(idx, line)| self.classify(idx, line.as_ref()))
            .collect()
    }
}

/// Extracts the simulation block of a transcript and classifies its events.
pub fn parse_transcript(text: &str, config: &SimConfig) -> Result<Vec<ActionEvent>, SimError> {
    let time = std::time::Instant::now();
    info!(target: "parser", "parsing simulation transcript");
    let block = extract_block(text)?;
    let events = EventClassifier::new(config).classify_block(&block);
    info!(
        "parsing simulation transcript completed in {:?}: {} events",
        time.elapsed(),
        events.len()
    );
    Ok(events)
}

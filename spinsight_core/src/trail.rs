use crate::Pid;
use serde::Serialize;

/// A single transition of an execution trail:
/// at `step`, process `process_id` executed source line `line_number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Transition {
    /// Position of the transition in the trail.
    pub step: u32,
    /// The process executing the transition.
    pub process_id: Pid,
    /// Line of the model source being executed.
    pub line_number: u32,
}

impl Transition {
    /// Creates a new [`Transition`].
    pub fn new(step: u32, process_id: Pid, line_number: u32) -> Self {
        Self {
            step,
            process_id,
            line_number,
        }
    }

    /// Display name of the executing process.
    ///
    /// Raw trails carry no process names, only ids.
    pub fn process_name(&self) -> String {
        format!("Process_{}", self.process_id)
    }

    /// Human-readable description of the executed action.
    pub fn action(&self) -> String {
        format!("Executed line {}", self.line_number)
    }
}

/// A step of a guided-simulation listing,
/// which, unlike a raw trail, names the process and the executed statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrailStep {
    /// The process executing the step.
    pub process_id: Pid,
    /// The name the listing gives to the process.
    pub process_name: String,
    /// Line of the model source being executed.
    pub line_number: u32,
    /// The executed statement, as printed by the listing.
    pub action: String,
}

/// Placeholder text for a line number outside of the model source.
pub const INVALID_LINE: &str = "[Invalid line number]";

/// The lines of a model source, numbered from 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelSource {
    lines: Vec<String>,
}

impl ModelSource {
    /// Splits the text of a model source into lines.
    pub fn new(text: &str) -> Self {
        Self {
            lines: text.lines().map(|line| line.trim().to_owned()).collect(),
        }
    }

    /// Number of lines of the source.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the source has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The trimmed text of line `number`, or [`INVALID_LINE`] if there is no such line.
    pub fn line(&self, number: u32) -> &str {
        number
            .checked_sub(1)
            .and_then(|idx| self.lines.get(idx as usize))
            .map_or(INVALID_LINE, String::as_str)
    }

    /// Pairs each transition with the source line it executed.
    pub fn annotate(&self, transitions: &[Transition]) -> Vec<AnnotatedTransition> {
        transitions
            .iter()
            .map(|&transition| AnnotatedTransition {
                transition,
                source: Some(self.line(transition.line_number).to_owned()),
            })
            .collect()
    }
}

/// A [`Transition`], with the text of its source line when the model source is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedTransition {
    /// The transition.
    #[serde(flatten)]
    pub transition: Transition,
    /// Text of the executed source line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl From<Transition> for AnnotatedTransition {
    fn from(transition: Transition) -> Self {
        Self {
            transition,
            source: None,
        }
    }
}

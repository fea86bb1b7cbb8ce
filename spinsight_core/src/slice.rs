use log::debug;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").expect("valid regex"));

/// Why a transcript line belongs to a [`CausalSlice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceRole {
    /// The line assigns the implicated variable.
    Assignment,
    /// The line transfers a value into the implicated variable (`var ... from`).
    Transfer,
    /// The line is about an assertion or a failure.
    Assertion,
}

/// A transcript line retained by a [`CausalSlice`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SliceStep {
    /// Index of the line in the transcript.
    pub index: usize,
    /// The raw line.
    pub line: String,
    /// Why the line was retained.
    pub role: SliceRole,
}

/// The transcript lines relevant to a failed assertion.
///
/// This is a textual, single-variable approximation of program dependence:
/// it keeps the lines assigning or receiving into the first variable of the condition,
/// plus any line mentioning `assert` or `FAIL`.
/// It is not a sound backward slice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CausalSlice {
    /// The variable the condition is about, if one could be identified.
    pub variable: Option<String>,
    /// The value most recently assigned to the variable.
    pub last_value: Option<String>,
    /// The retained lines, in transcript order.
    pub steps: Vec<SliceStep>,
}

/// The first identifier-shaped token of an assertion condition.
pub fn implicated_variable(condition: &str) -> Option<&str> {
    IDENTIFIER.find(condition).map(|m| m.as_str())
}

impl CausalSlice {
    /// Extracts the slice of `lines` relevant to the assertion `condition`.
    pub fn extract<S: AsRef<str>>(lines: &[S], condition: &str) -> Self {
        let variable = implicated_variable(condition);
        debug!("causal slice for '{condition}': variable {variable:?}");
        // Identifiers need no escaping, so the patterns are always valid.
        let patterns = variable.map(|var| {
            (
                Regex::new(&format!(r"\b{var}\b\s*=(?:[^=]|$)")).expect("valid regex"),
                Regex::new(&format!(r"\b{var}\b\s*=\s*([^=\s;\]\)][^\s;\]\)]*)"))
                    .expect("valid regex"),
                Regex::new(&format!(r"\b{var}\b\s+from\b")).expect("valid regex"),
            )
        });

        let mut slice = CausalSlice {
            variable: variable.map(str::to_owned),
            ..Default::default()
        };
        for (index, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            let role = match &patterns {
                Some((assign, _, _)) if assign.is_match(line) => Some(SliceRole::Assignment),
                Some((_, _, transfer)) if transfer.is_match(line) => Some(SliceRole::Transfer),
                _ if line.contains("assert") || line.contains("FAIL") => Some(SliceRole::Assertion),
                _ => None,
            };
            let Some(role) = role else {
                continue;
            };
            if role == SliceRole::Assignment
                && let Some((_, value, _)) = &patterns
                && let Some(caps) = value.captures(line)
            {
                slice.last_value = Some(caps[1].to_owned());
            }
            slice.steps.push(SliceStep {
                index,
                line: line.to_owned(),
                role,
            });
        }
        slice
    }

    /// The retained lines, in transcript order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|step| step.line.as_str())
    }

    /// Whether no line was retained.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignments_and_assertion() {
        let lines = ["x = 1", "y = 7", "x = 2", "x = 4", "assert failed"];
        let slice = CausalSlice::extract(&lines, "x == 3");
        assert_eq!(slice.variable.as_deref(), Some("x"));
        assert_eq!(slice.last_value.as_deref(), Some("4"));
        assert_eq!(
            slice.lines().collect::<Vec<_>>(),
            vec!["x = 1", "x = 2", "x = 4", "assert failed"]
        );
        assert_eq!(slice.steps[3].role, SliceRole::Assertion);
        assert_eq!(slice.steps[3].index, 4);
    }

    #[test]
    fn comparison_is_not_assignment() {
        let lines = ["proc 0 (:init::1) t.pml:5 (state 2)\t[((x==3))]", "xs = 5"];
        let slice = CausalSlice::extract(&lines, "x==3");
        assert!(slice.is_empty());
        assert_eq!(slice.last_value, None);
    }

    #[test]
    fn bracketed_value_and_transfer() {
        let lines = [
            "  3:\tproc  1 (calc:1) calc.pml:9 (state 3)\t[x = 2]",
            "  4:\tproc  1 (calc:1) calc.pml:10 (state 4)\t[f?x from 4]",
            "x from queue",
        ];
        let slice = CausalSlice::extract(&lines, "(x > 2)");
        assert_eq!(slice.last_value.as_deref(), Some("2"));
        assert_eq!(slice.steps[0].role, SliceRole::Assignment);
        assert_eq!(slice.steps[1].role, SliceRole::Transfer);
        assert_eq!(slice.steps[2].role, SliceRole::Transfer);
    }

    #[test]
    fn no_variable() {
        let lines = ["x = 1", "spin: FAIL here"];
        let slice = CausalSlice::extract(&lines, "1 == 0");
        assert_eq!(slice.variable, None);
        assert_eq!(slice.lines().collect::<Vec<_>>(), vec!["spin: FAIL here"]);
    }
}

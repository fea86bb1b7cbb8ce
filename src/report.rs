use anyhow::Context;
use serde::Serialize;
use spinsight_core::{
    ActionEvent, AnnotatedTransition, CausalSlice, FailureEvent, MessageSequenceChart, Pid,
    TrailStep, Verdict, VerificationStatistics,
};
use spinsight_pan::ErrorLine;
use std::{collections::BTreeMap, fmt::Display};

/// Why a failure happened, and which transcript lines explain it.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Explanation {
    pub(crate) failure: FailureEvent,
    pub(crate) title: String,
    pub(crate) explanation: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) slice: Option<CausalSlice>,
}

impl Explanation {
    pub(crate) fn new(failure: FailureEvent, transcript: Option<&[&str]>) -> Self {
        let slice = failure
            .condition()
            .zip(transcript)
            .map(|(condition, lines)| CausalSlice::extract(lines, condition));
        Self {
            title: failure.title(),
            explanation: failure.explanation(),
            failure,
            slice,
        }
    }
}

/// Whatever could be recovered from the given artifacts.
///
/// Sections for artifacts that were not given are left out.
#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct Analysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) statistics: Option<VerificationStatistics>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) error_lines: Vec<ErrorLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) verdict: Option<Verdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) transitions: Option<Vec<AnnotatedTransition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) listing: Option<Vec<TrailStep>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) events: Option<Vec<ActionEvent>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) spawn_depths: BTreeMap<Pid, u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) chart: Option<MessageSequenceChart>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) explanations: Vec<Explanation>,
}

impl Analysis {
    pub(crate) fn print(&self, json: bool) -> anyhow::Result<()> {
        if json {
            let report =
                serde_json::ser::to_string_pretty(&self).context("failed to serialize report")?;
            println!("{report}");
        } else {
            println!("{self}");
        }
        Ok(())
    }

    fn write_statistics(
        f: &mut std::fmt::Formatter<'_>,
        stats: &VerificationStatistics,
    ) -> std::fmt::Result {
        writeln!(f, "Verification statistics")?;
        if let Some(version) = &stats.spin_version {
            writeln!(f, "  Spin version:       {version}")?;
        }
        writeln!(f, "  State vector:       {} byte", stats.state_vector_bytes)?;
        writeln!(f, "  Depth reached:      {}", stats.depth_reached)?;
        writeln!(f, "  Errors:             {}", stats.errors)?;
        writeln!(
            f,
            "  States:             {} stored, {} visited, {} matched",
            stats.states_stored, stats.states_visited, stats.states_matched
        )?;
        writeln!(f, "  Transitions:        {}", stats.transitions)?;
        writeln!(f, "  Atomic steps:       {}", stats.atomic_steps)?;
        writeln!(f, "  Hash conflicts:     {}", stats.hash_conflicts)?;
        if !stats.memory_usage.is_empty() {
            writeln!(f, "  Memory:             {:.3} MB", stats.total_memory())?;
            for (component, megabytes) in &stats.memory_usage {
                writeln!(f, "    {component}: {megabytes:.3} MB")?;
            }
        }
        writeln!(f, "  Elapsed time:       {} s", stats.elapsed_seconds)?;
        if !stats.final_status.is_empty() {
            writeln!(f, "  Status:             {}", stats.final_status)?;
        }
        for setting in &stats.settings {
            writeln!(f, "  + {setting}")?;
        }
        for (check, enabled) in &stats.checks {
            writeln!(f, "  {} {check}", if *enabled { "+" } else { "-" })?;
        }
        for line in &stats.unreached {
            writeln!(f, "  {line}")?;
        }
        Ok(())
    }

    fn write_chart(
        f: &mut std::fmt::Formatter<'_>,
        events: &[ActionEvent],
        chart: &MessageSequenceChart,
    ) -> std::fmt::Result {
        writeln!(f, "Message sequence chart")?;
        for edge in &chart.edges {
            let label = |idx: usize| events.get(idx).map_or("?", |event| event.process_label.as_str());
            writeln!(
                f,
                "  [{}] {} --{}:{}--> {} [{}] ({:?})",
                edge.send,
                label(edge.send),
                edge.channel,
                edge.message_type,
                label(edge.receive),
                edge.receive,
                edge.kind,
            )?;
        }
        for unmatched in &chart.unmatched_receives {
            writeln!(
                f,
                "  [{}] {} waits on {}?{} with no matching send",
                unmatched.receive, unmatched.process_label, unmatched.channel, unmatched.message_type
            )?;
        }
        for send in &chart.dangling_sends {
            if let Some(event) = events.get(*send) {
                writeln!(
                    f,
                    "  [{send}] {} {} was never received",
                    event.process_label,
                    event.label()
                )?;
            }
        }
        for (a, b) in &chart.inferred_equivalences {
            writeln!(f, "  channel '{a}' inferred equivalent to '{b}'")?;
        }
        Ok(())
    }
}

impl Display for Analysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(stats) = &self.statistics {
            Self::write_statistics(f, stats)?;
        }
        for error in &self.error_lines {
            writeln!(f, "  ! {}", error.message)?;
        }
        if let Some(verdict) = &self.verdict {
            writeln!(f, "Verdict: {verdict}")?;
        }
        for explanation in &self.explanations {
            writeln!(f, "{}", explanation.title)?;
            writeln!(f, "  {}", explanation.explanation)?;
            let Some(slice) = &explanation.slice else {
                continue;
            };
            match (&slice.variable, &slice.last_value) {
                (Some(var), Some(value)) => writeln!(f, "  '{var}' was last set to {value}")?,
                (Some(var), None) => writeln!(f, "  no assignment to '{var}' found")?,
                (None, _) => writeln!(f, "  no variable found in the condition")?,
            }
            for step in &slice.steps {
                writeln!(f, "  {:>4}: {}", step.index, step.line.trim())?;
            }
        }
        if let Some(transitions) = &self.transitions {
            writeln!(f, "Trail: {} transitions", transitions.len())?;
            for AnnotatedTransition { transition, source } in transitions {
                write!(
                    f,
                    "  {:>4}: {} {}",
                    transition.step,
                    transition.process_name(),
                    transition.action()
                )?;
                match source {
                    Some(source) => writeln!(f, ": {source}")?,
                    None => writeln!(f)?,
                }
            }
        }
        if let Some(listing) = &self.listing {
            writeln!(f, "Trail: {} steps", listing.len())?;
            for step in listing {
                writeln!(
                    f,
                    "  {} ({}) line {}: {}",
                    step.process_name, step.process_id, step.line_number, step.action
                )?;
            }
        }
        if let Some(events) = &self.events {
            writeln!(f, "Simulation: {} events", events.len())?;
            for (idx, event) in events.iter().enumerate() {
                let depth = self.spawn_depths.get(&event.process_id).copied().unwrap_or_default();
                writeln!(
                    f,
                    "  {idx:>4}: {}{} {}",
                    "  ".repeat(depth as usize),
                    event.process_label,
                    event.label()
                )?;
            }
            if let Some(chart) = &self.chart {
                Self::write_chart(f, events, chart)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explanation_with_slice() {
        let failure = FailureEvent::AssertionViolated {
            condition: "x == 3".to_string(),
            line: None,
        };
        let lines = ["x = 1", "x = 2", "x = 4", "assert failed"];
        let explanation = Explanation::new(failure, Some(&lines[..]));
        let slice = explanation.slice.as_ref().expect("slice");
        assert_eq!(slice.steps.len(), 4);
        assert_eq!(slice.last_value.as_deref(), Some("4"));
        assert!(explanation.title.starts_with("Assertion failed"));
    }

    #[test]
    fn explanation_without_condition() {
        let explanation = Explanation::new(FailureEvent::Deadlock, Some(&["x = 1"][..]));
        assert!(explanation.slice.is_none());
    }

    #[test]
    fn transitions_with_source() {
        let model = spinsight_core::ModelSource::new("init {\n  f = 2\n}\n");
        let transitions = [
            spinsight_core::Transition::new(1, 0, 2),
            spinsight_core::Transition::new(2, 0, 9),
        ];
        let analysis = Analysis {
            transitions: Some(model.annotate(&transitions)),
            ..Default::default()
        };
        assert_eq!(
            analysis.to_string(),
            "Trail: 2 transitions\n\
             \x20    1: Process_0 Executed line 2: f = 2\n\
             \x20    2: Process_0 Executed line 9: [Invalid line number]\n"
        );
        let json = serde_json::to_value(&analysis).expect("serialize");
        assert_eq!(json["transitions"][0]["line_number"], 2);
        assert_eq!(json["transitions"][0]["source"], "f = 2");
    }

    #[test]
    fn empty_sections_are_skipped() {
        let analysis = Analysis {
            verdict: Some(Verdict::NoFailureDetected),
            ..Default::default()
        };
        let json = serde_json::to_value(&analysis).expect("serialize");
        assert_eq!(json, serde_json::json!({ "verdict": { "verdict": "no_failure_detected" } }));
        assert_eq!(analysis.to_string(), "Verdict: no failure detected\n");
    }
}

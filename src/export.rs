use anyhow::Context;
use log::info;
use serde::Serialize;
use spinsight_core::{ActionEvent, AnnotatedTransition, MessageSequenceChart, Pid, TrailStep};
use std::{io::Write, path::Path};

#[derive(Serialize)]
struct TransitionRow<'a> {
    step: u32,
    process_id: Pid,
    process_name: String,
    line_number: u32,
    action: String,
    source: Option<&'a str>,
}

#[derive(Serialize)]
struct EventRow<'a> {
    step: usize,
    process_id: Pid,
    process: &'a str,
    action: String,
    matched_send: Option<usize>,
    unmatched: bool,
}

fn write_rows<W: Write, R: Serialize>(
    writer: W,
    rows: impl IntoIterator<Item = R>,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn create(path: &Path) -> anyhow::Result<std::fs::File> {
    info!(target: "export", "writing CSV file '{}'", path.display());
    std::fs::File::create(path)
        .with_context(|| format!("failed to create file '{}'", path.display()))
}

pub(crate) fn write_transitions<W: Write>(
    writer: W,
    transitions: &[AnnotatedTransition],
) -> Result<(), csv::Error> {
    write_rows(
        writer,
        transitions
            .iter()
            .map(|AnnotatedTransition { transition, source }| TransitionRow {
                step: transition.step,
                process_id: transition.process_id,
                process_name: transition.process_name(),
                line_number: transition.line_number,
                action: transition.action(),
                source: source.as_deref(),
            }),
    )
}

pub(crate) fn write_listing<W: Write>(writer: W, steps: &[TrailStep]) -> Result<(), csv::Error> {
    write_rows(writer, steps)
}

/// One row per event, pointing receives at the send they were matched with.
pub(crate) fn write_chart<W: Write>(
    writer: W,
    events: &[ActionEvent],
    chart: &MessageSequenceChart,
) -> Result<(), csv::Error> {
    write_rows(
        writer,
        events.iter().enumerate().map(|(step, event)| EventRow {
            step,
            process_id: event.process_id,
            process: &event.process_label,
            action: event.label(),
            matched_send: chart.edge_into(step).map(|edge| edge.send),
            unmatched: chart
                .unmatched_receives
                .iter()
                .any(|unmatched| unmatched.receive == step),
        }),
    )
}

pub(crate) fn transitions_to_file(
    path: &Path,
    transitions: &[AnnotatedTransition],
) -> anyhow::Result<()> {
    write_transitions(create(path)?, transitions)
        .with_context(|| format!("failed to write CSV file '{}'", path.display()))
}

pub(crate) fn listing_to_file(path: &Path, steps: &[TrailStep]) -> anyhow::Result<()> {
    write_listing(create(path)?, steps)
        .with_context(|| format!("failed to write CSV file '{}'", path.display()))
}

pub(crate) fn chart_to_file(
    path: &Path,
    events: &[ActionEvent],
    chart: &MessageSequenceChart,
) -> anyhow::Result<()> {
    write_chart(create(path)?, events, chart)
        .with_context(|| format!("failed to write CSV file '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use spinsight_core::{CommunicationMatcher, Direction, EventKind, ModelSource, Transition};

    #[test]
    fn transitions_csv() {
        let mut out = Vec::new();
        let transition = AnnotatedTransition::from(Transition::new(3, 1, 10));
        write_transitions(&mut out, &[transition]).expect("csv");
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "step,process_id,process_name,line_number,action,source\n\
             3,1,Process_1,10,Executed line 10,\n"
        );
    }

    #[test]
    fn transitions_csv_with_source() {
        let model = ModelSource::new("active proctype p() {\n  x = 1\n}\n");
        let transitions = model.annotate(&[Transition::new(1, 0, 2), Transition::new(2, 0, 0)]);
        let mut out = Vec::new();
        write_transitions(&mut out, &transitions).expect("csv");
        let text = String::from_utf8(out).expect("utf8");
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[1], "1,0,Process_0,2,Executed line 2,x = 1");
        assert_eq!(lines[2], "2,0,Process_0,0,Executed line 0,[Invalid line number]");
    }

    #[test]
    fn chart_csv() {
        let op = |pid, direction| ActionEvent {
            process_id: pid,
            process_label: format!("proc_{pid}"),
            action: String::new(),
            kind: EventKind::ChannelOp {
                direction,
                channel: "f".to_string(),
                message_type: "operator".to_string(),
                payload: "43".to_string(),
            },
            source_line: 0,
        };
        let events = [
            op(0, Direction::Send),
            op(1, Direction::Receive),
            op(1, Direction::Receive),
        ];
        let chart = CommunicationMatcher::new().build(&events);
        let mut out = Vec::new();
        write_chart(&mut out, &events, &chart).expect("csv");
        let text = String::from_utf8(out).expect("utf8");
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "step,process_id,process,action,matched_send,unmatched");
        assert_eq!(lines[1], "0,0,proc_0,\"f!operator,43\",,false");
        assert_eq!(lines[2], "1,1,proc_1,\"f?operator,43\",0,false");
        assert_eq!(lines[3], "2,1,proc_1,\"f?operator,43\",,true");
    }
}

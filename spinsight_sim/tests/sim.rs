use spinsight_core::{
    CausalSlice, CommunicationMatcher, Direction, EventKind, MatchKind, SliceRole, Transition,
    spawn_depths,
};
use spinsight_sim::{
    Marker, SimConfig, SimError, extract_block, parse_trail, parse_trail_listing, parse_transcript,
};
use std::path::Path;

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("read fixture")
}

#[test]
fn calc_trail() {
    let transitions = parse_trail(&read(Path::new("./tests/data/calc.trail")));
    assert_eq!(
        transitions,
        vec![
            Transition::new(1, 0, 20),
            Transition::new(2, 0, 21),
            Transition::new(3, 0, 22),
            Transition::new(4, 0, 24),
            Transition::new(5, 2, 9),
        ]
    );
    assert_eq!(transitions[4].process_name(), "Process_2");
    assert_eq!(transitions[4].action(), "Executed line 9");
}

#[test]
fn calc_listing() {
    let steps = parse_trail_listing(&read(Path::new("./tests/data/listing.txt")));
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[2].process_id, 2);
    assert_eq!(steps[2].process_name, "calc:1");
    assert_eq!(steps[2].line_number, 9);
    assert_eq!(steps[2].action, "f?operator,43");
}

#[test]
fn calc_transcript() {
    let events = parse_transcript(
        &read(Path::new("./tests/data/calc.txt")),
        &SimConfig::default(),
    )
    .expect("transcript");
    assert_eq!(events.len(), 13);
    assert_eq!(
        events[1].kind,
        EventKind::Create {
            from: 0,
            to: 1,
            spawned_label: "calc[1]".to_string(),
        }
    );
    assert_eq!(events[5].process_label, "init");
    assert_eq!(events[5].channel_op(Direction::Send), Some(("f", "operator")));
    assert_eq!(events[6].process_label, "calc[2]");
    assert_eq!(events[10].process_label, "calc[1]");
    assert_eq!(events[11].kind, EventKind::AssertionFailure);
    assert_eq!(events[11].process_id, 1);
    assert_eq!(events[12].kind, EventKind::Termination);
    assert_eq!(events[12].source_line, 13);

    let depths = spawn_depths(&events);
    assert_eq!(depths[&0], 0);
    assert_eq!(depths[&1], 1);
    assert_eq!(depths[&2], 1);
}

#[test]
fn calc_chart() {
    let events = parse_transcript(
        &read(Path::new("./tests/data/calc.txt")),
        &SimConfig::default(),
    )
    .expect("transcript");
    let msc = CommunicationMatcher::new().build(&events);
    assert_eq!(msc.edges.len(), 2);
    assert_eq!((msc.edges[0].send, msc.edges[0].receive), (5, 6));
    assert_eq!(msc.edges[0].message_type, "operator");
    assert_eq!(msc.edges[0].kind, MatchKind::Exact);
    assert_eq!((msc.edges[1].send, msc.edges[1].receive), (8, 9));
    assert_eq!(msc.edges[1].kind, MatchKind::Inferred);
    assert_eq!(
        msc.inferred_equivalences,
        vec![("me".to_string(), "you".to_string())]
    );
    assert_eq!(msc.unmatched_receives.len(), 1);
    assert_eq!(msc.unmatched_receives[0].receive, 10);
    assert_eq!(msc.unmatched_receives[0].process_label, "calc[1]");
    assert!(msc.dangling_sends.is_empty());
}

#[test]
fn calc_slice() {
    let text = read(Path::new("./tests/data/calc.txt"));
    let block = extract_block(&text).expect("block");
    let slice = CausalSlice::extract(&block, "(x==3)");
    assert_eq!(slice.variable.as_deref(), Some("x"));
    assert_eq!(slice.last_value.as_deref(), Some("4"));
    let roles: Vec<_> = slice.steps.iter().map(|step| (step.index, step.role)).collect();
    assert_eq!(
        roles,
        vec![
            (7, SliceRole::Assignment),
            (11, SliceRole::Assertion),
            (12, SliceRole::Assertion),
        ]
    );
}

#[test]
fn send_receive_scenario() {
    let transcript = "===start Sim===\n\
                      proc 0 (:init::1) run calc [f!operator,43]\n\
                      proc 0 (:init::1) t.pml:5 (state 2)\t[x = 1]\n\
                      proc 1 (calc:1) calc.pml:9 (state 1)\t[f?operator,43]\n\
                      ===end Sim===\n";
    let events = parse_transcript(transcript, &SimConfig::default()).expect("transcript");
    let msc = CommunicationMatcher::new().build(&events);
    assert_eq!(msc.edges.len(), 1);
    assert_eq!((msc.edges[0].send, msc.edges[0].receive), (0, 2));
    assert_eq!(msc.edges[0].message_type, "operator");
}

#[test]
fn empty_block_is_not_an_error() {
    let events = parse_transcript("===start Sim===\n===end Sim===\n", &SimConfig::default())
        .expect("transcript");
    assert!(events.is_empty());
}

#[test]
fn missing_block_is_an_error() {
    let error = parse_transcript("proc 0 (:init::1) [x = 1]\n", &SimConfig::default())
        .expect_err("no block");
    assert_eq!(error, SimError::BlockNotFound(Marker::Start));
    assert_eq!(
        error.to_string(),
        "simulation block not found: no `===start Sim===` line"
    );
}

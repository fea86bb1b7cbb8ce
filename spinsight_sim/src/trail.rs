use log::{debug, trace};
use regex::Regex;
use spinsight_core::{TrailStep, Transition};
use std::sync::LazyLock;

static LISTING_STEP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"proc (\d+) \((.*?)\):line (\d+) "(.*?)""#).expect("valid regex")
});

fn parse_transition(line: &str) -> Option<Transition> {
    let mut fields = line.split(':');
    let step = fields.next()?.trim().parse().ok()?;
    let process_id = fields.next()?.trim().parse().ok()?;
    let line_number = fields.next()?.trim().parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some(Transition::new(step, process_id, line_number))
}

/// Parses a trail made of `step:process:line` lines.
///
/// Blank lines, sentinel lines (starting with `-`) and lines
/// that are not exactly three non-negative integers are skipped.
/// The result is sorted by step.
pub fn parse_trail(text: &str) -> Vec<Transition> {
    let mut transitions: Vec<Transition> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('-'))
        .filter_map(|line| {
            let transition = parse_transition(line);
            if transition.is_none() {
                trace!("skipping trail line '{line}'");
            }
            transition
        })
        .collect();
    transitions.sort_by_key(|transition| transition.step);
    debug!("trail: {} transitions", transitions.len());
    transitions
}

/// Parses a guided-simulation listing,
/// made of `proc <id> (<name>):line <n> "<action>"` lines, in source order.
pub fn parse_trail_listing(text: &str) -> Vec<TrailStep> {
    let steps: Vec<TrailStep> = text
        .lines()
        .filter_map(|line| {
            let caps = LISTING_STEP.captures(line)?;
            Some(TrailStep {
                process_id: caps[1].parse().ok()?,
                process_name: caps[2].to_owned(),
                line_number: caps[3].parse().ok()?,
                action: caps[4].to_owned(),
            })
        })
        .collect();
    debug!("trail listing: {} steps", steps.len());
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_and_malformed_lines() {
        let trail = "-4:0:0\n3:1:10\n\n1:2\n1:2:3:4\nx:1:2\n2:0:-1\n";
        assert_eq!(parse_trail(trail), vec![Transition::new(3, 1, 10)]);
    }

    #[test]
    fn sorted_by_step() {
        let trail = "5:0:1\n2:1:7\n2:0:3\n";
        assert_eq!(
            parse_trail(trail),
            vec![
                Transition::new(2, 1, 7),
                Transition::new(2, 0, 3),
                Transition::new(5, 0, 1),
            ]
        );
    }

    #[test]
    fn listing() {
        let listing = "  2:\tproc 1 (calc:1):line 9 \"x = 2\"\nnot a step\n";
        assert_eq!(
            parse_trail_listing(listing),
            vec![TrailStep {
                process_id: 1,
                process_name: "calc:1".to_string(),
                line_number: 9,
                action: "x = 2".to_string(),
            }]
        );
    }
}

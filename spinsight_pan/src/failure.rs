use log::debug;
use regex::Regex;
use spinsight_core::FailureEvent;
use std::sync::LazyLock;

static PAN_ASSERTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"pan:\d+:\s+assertion violated\s*\(").expect("valid regex")
});
static SPIN_ASSERTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"spin: .*:(\d+), Error: assertion violated").expect("valid regex")
});
static FAILED_ASSERTION_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"spin: text of failed assertion:\s*assert\s*\(").expect("valid regex")
});
static ASSERT_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"assert\s*\(").expect("valid regex"));
// `invalid end states` (plural) is the check table entry, not a failure.
static INVALID_END_STATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"invalid end state(?:[^s]|$)").expect("valid regex"));
static INVALID_END_DEPTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"invalid end state \(at depth (\d+)\)").expect("valid regex")
});
static ZERO_ERRORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"errors: 0\b").expect("valid regex"));

/// Text between the parenthesis opening at `open` and its matching closing one.
///
/// An unbalanced condition (e.g. a truncated line) runs to the end of the text.
fn balanced(text: &str, open: usize) -> &str {
    let inner = &text[open + 1..];
    let mut depth = 0usize;
    for (idx, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return inner[..idx].trim(),
            ')' => depth -= 1,
            _ => {}
        }
    }
    inner.trim()
}

/// Condition of the parenthesized expression whose `(` ends the match `m`.
fn condition_after(line: &str, m: regex::Match<'_>) -> String {
    balanced(line, m.end() - 1).to_owned()
}

/// Recognizes the verification failures reported by a log.
///
/// Each event is reported once, even if several lines report it.
/// Assertion violations come first, in log order,
/// followed by deadlocks, invalid end states, unmatched communications
/// and never-claim violations.
pub fn classify_failures(text: &str) -> Vec<FailureEvent> {
    let mut assertions = Vec::new();
    let mut pending_assertion_line: Option<u32> = None;
    let mut deadlock = false;
    let mut invalid_end: Option<Option<u64>> = None;
    let mut unmatched = false;
    let mut never_claim = false;

    for line in text.lines() {
        if let Some(m) = PAN_ASSERTION.find(line) {
            assertions.push(FailureEvent::AssertionViolated {
                condition: condition_after(line, m),
                line: None,
            });
        } else if let Some(caps) = SPIN_ASSERTION.captures(line) {
            let number = caps[1].parse().ok();
            match ASSERT_CALL.find_at(line, caps.get(0).map_or(0, |m| m.end())) {
                Some(m) => assertions.push(FailureEvent::AssertionViolated {
                    condition: condition_after(line, m),
                    line: number,
                }),
                None => pending_assertion_line = number,
            }
        } else if let Some(m) = FAILED_ASSERTION_TEXT.find(line) {
            assertions.push(FailureEvent::AssertionViolated {
                condition: condition_after(line, m),
                line: pending_assertion_line.take(),
            });
        }

        deadlock |= line.contains("pan: deadlock detected");
        if INVALID_END_STATE.is_match(line) {
            let depth = INVALID_END_DEPTH
                .captures(line)
                .and_then(|caps| caps[1].parse().ok());
            let known = invalid_end.get_or_insert(None);
            if known.is_none() {
                *known = depth;
            }
        }
        unmatched |= line.contains("unmatched receive") || line.contains("invalid read of message");
        never_claim |= line.contains("never claim violated")
            || line.contains("claim violated!")
            || line.contains("acceptance cycle");
    }

    let mut failures: Vec<FailureEvent> = Vec::with_capacity(assertions.len());
    for assertion in assertions {
        if !failures.contains(&assertion) {
            failures.push(assertion);
        }
    }
    if deadlock {
        failures.push(FailureEvent::Deadlock);
    }
    if let Some(depth) = invalid_end {
        failures.push(FailureEvent::InvalidEndState { depth });
    }
    if unmatched {
        failures.push(FailureEvent::UnmatchedCommunication);
    }
    if never_claim {
        failures.push(FailureEvent::NeverClaimViolated);
    }
    debug!("{} failures recognized", failures.len());
    failures
}

/// Whether the log explicitly reports that verification found no error.
pub fn reports_no_errors(text: &str) -> bool {
    text.contains("No errors found") || ZERO_ERRORS.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_condition() {
        let failures = classify_failures("pan:1: assertion violated ((x+1) == f(y)) (at depth 3)");
        assert_eq!(
            failures,
            vec![FailureEvent::AssertionViolated {
                condition: "(x+1) == f(y)".to_string(),
                line: None
            }]
        );
    }

    #[test]
    fn spin_dialect_same_line() {
        let failures =
            classify_failures("spin: calc.pml:14, Error: assertion violated assert((x==3))");
        assert_eq!(
            failures,
            vec![FailureEvent::AssertionViolated {
                condition: "(x==3)".to_string(),
                line: Some(14)
            }]
        );
    }

    #[test]
    fn spin_dialect_next_line() {
        let log = "spin: calc.pml:14, Error: assertion violated\n\
                   spin: text of failed assertion: assert((x==3))\n";
        assert_eq!(
            classify_failures(log),
            vec![FailureEvent::AssertionViolated {
                condition: "(x==3)".to_string(),
                line: Some(14)
            }]
        );
    }

    #[test]
    fn truncated_condition() {
        let failures = classify_failures("pan:1: assertion violated (x == ");
        assert_eq!(failures[0].condition(), Some("x =="));
    }

    #[test]
    fn check_table_is_not_a_failure() {
        let log = "\tinvalid end states\t+\n\
                   State-vector 28 byte, depth reached 7, errors: 0\n";
        assert!(classify_failures(log).is_empty());
        assert!(reports_no_errors(log));
    }

    #[test]
    fn invalid_end_state_depth() {
        let log = "pan: invalid end state\npan:1: invalid end state (at depth 9)\n";
        assert_eq!(
            classify_failures(log),
            vec![FailureEvent::InvalidEndState { depth: Some(9) }]
        );
    }

    #[test]
    fn every_trigger() {
        for (line, failure) in [
            ("pan: deadlock detected", FailureEvent::Deadlock),
            ("pan: unmatched receive on q", FailureEvent::UnmatchedCommunication),
            ("pan: invalid read of message", FailureEvent::UnmatchedCommunication),
            ("pan:1: never claim violated", FailureEvent::NeverClaimViolated),
            ("pan:1: claim violated! (at depth 4)", FailureEvent::NeverClaimViolated),
            ("pan:1: acceptance cycle (at depth 8)", FailureEvent::NeverClaimViolated),
        ] {
            assert_eq!(classify_failures(line), vec![failure], "{line}");
        }
    }

    #[test]
    fn several_kinds_in_one_log() {
        let log = "pan:1: acceptance cycle (at depth 8)\n\
                   pan: unmatched receive on q\n\
                   pan:1: invalid end state (at depth 5)\n\
                   pan: deadlock detected\n\
                   pan: deadlock detected\n";
        assert_eq!(
            classify_failures(log),
            vec![
                FailureEvent::Deadlock,
                FailureEvent::InvalidEndState { depth: Some(5) },
                FailureEvent::UnmatchedCommunication,
                FailureEvent::NeverClaimViolated,
            ]
        );
    }

    #[test]
    fn nonzero_errors_are_not_success() {
        assert!(!reports_no_errors("errors: 01"));
        assert!(!reports_no_errors("errors: 1"));
        assert!(reports_no_errors("No errors found -- did you verify all claims?"));
    }
}

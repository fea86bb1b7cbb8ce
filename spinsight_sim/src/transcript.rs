use crate::{Marker, SimError};
use log::debug;
use regex::Regex;
use spinsight_core::Pid;
use std::sync::LazyLock;

static CREATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"proc\s+(\d+)\s+\(([^)]*)\)\s+creates proc\s+(\d+)\s+\(([^)]+)\)")
        .expect("valid regex")
});
static TERMINATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"proc\s+(\d+)\s+(?:\(([^)]*)\)\s+)?terminates").expect("valid regex")
});
static PROC_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"proc\s+(\d+)(?:\s+\(([^)]*)\))?").expect("valid regex")
});
static ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"proc\s+(\d+)\s+\(([^)]*)\)[^\[]*\[(.+)\]").expect("valid regex")
});

/// Returns the lines strictly between the start and end markers of the simulation block.
///
/// The end marker is only searched after the start marker.
pub fn extract_block(text: &str) -> Result<Vec<&str>, SimError> {
    let mut lines = text.lines();
    lines
        .by_ref()
        .find(|line| line.contains(Marker::Start.text()))
        .ok_or(SimError::BlockNotFound(Marker::Start))?;
    let mut block = Vec::new();
    for line in lines {
        if line.contains(Marker::End.text()) {
            debug!("simulation block: {} lines", block.len());
            return Ok(block);
        }
        block.push(line);
    }
    Err(SimError::BlockNotFound(Marker::End))
}

/// The shape of a recognized line of the simulation block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TranscriptLine<'a> {
    Create {
        from: Pid,
        descriptor: &'a str,
        to: Pid,
        name: &'a str,
    },
    Terminate {
        pid: Pid,
        descriptor: Option<&'a str>,
    },
    AssertionFailure {
        pid: Option<Pid>,
        descriptor: Option<&'a str>,
        text: &'a str,
    },
    Action {
        pid: Pid,
        descriptor: &'a str,
        text: &'a str,
    },
}

impl<'a> TranscriptLine<'a> {
    /// Recognizes a line, trying creation, termination,
    /// assertion failure and bracketed action in this order.
    pub(crate) fn recognize(line: &'a str) -> Option<Self> {
        if line.contains("creates proc")
            && let Some(caps) = CREATE.captures(line)
        {
            return Some(TranscriptLine::Create {
                from: caps[1].parse().ok()?,
                descriptor: caps.get(2).map_or("", |m| m.as_str()),
                to: caps[3].parse().ok()?,
                name: caps.get(4).map_or("", |m| m.as_str()),
            });
        }
        if let Some(caps) = TERMINATE.captures(line) {
            return Some(TranscriptLine::Terminate {
                pid: caps[1].parse().ok()?,
                descriptor: caps.get(2).map(|m| m.as_str()),
            });
        }
        if line.contains("assertion violated") {
            let caps = PROC_PREFIX.captures(line);
            return Some(TranscriptLine::AssertionFailure {
                pid: caps.as_ref().and_then(|caps| caps[1].parse().ok()),
                descriptor: caps.and_then(|caps| caps.get(2)).map(|m| m.as_str()),
                text: line.trim(),
            });
        }
        let caps = ACTION.captures(line)?;
        Some(TranscriptLine::Action {
            pid: caps[1].parse().ok()?,
            descriptor: caps.get(2).map_or("", |m| m.as_str()),
            text: caps.get(3).map_or("", |m| m.as_str().trim()),
        })
    }
}

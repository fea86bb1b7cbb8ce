use serde::Serialize;
use std::collections::BTreeMap;

/// The numeric id SPIN assigns to a running process.
pub type Pid = u32;

/// Direction of a channel operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// A send (`!`).
    Send,
    /// A receive (`?`).
    Receive,
}

impl Direction {
    /// Parses the operator character of a channel operation.
    pub fn from_op(op: char) -> Option<Self> {
        match op {
            '!' => Some(Direction::Send),
            '?' => Some(Direction::Receive),
            _ => None,
        }
    }

    /// The operator character of the channel operation.
    pub fn op(self) -> char {
        match self {
            Direction::Send => '!',
            Direction::Receive => '?',
        }
    }
}

/// What a simulation step did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// Process `from` created process `to`.
    Create {
        /// The creating process.
        from: Pid,
        /// The created process.
        to: Pid,
        /// The name of the spawned proctype.
        spawned_label: String,
    },
    /// A send or receive on a channel.
    ChannelOp {
        /// Send or receive.
        direction: Direction,
        /// Channel name, after alias normalization.
        channel: String,
        /// The message type (first message field).
        message_type: String,
        /// Remaining message fields, possibly empty.
        payload: String,
    },
    /// Any other statement.
    PlainAction,
    /// The process terminated.
    Termination,
    /// An assertion failed.
    AssertionFailure,
}

/// One step of a simulated run.
///
/// The step number of an event is its index in the event sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionEvent {
    /// The process performing the step.
    pub process_id: Pid,
    /// Display label of the process, disambiguated across instances of the same proctype.
    pub process_label: String,
    /// The raw action text of the step.
    pub action: String,
    /// Classification of the step.
    pub kind: EventKind,
    /// Line of the step within the simulation block.
    pub source_line: usize,
}

impl ActionEvent {
    /// Normalized label of the step, e.g. `2!operator,43` for a send on channel `2`.
    pub fn label(&self) -> String {
        match &self.kind {
            EventKind::ChannelOp {
                direction,
                channel,
                message_type,
                payload,
            } => {
                let mut label = format!("{channel}{}{message_type}", direction.op());
                if !payload.is_empty() {
                    label.push(',');
                    label.push_str(payload);
                }
                label
            }
            EventKind::Create { spawned_label, .. } => format!("run {spawned_label}"),
            _ => self.action.clone(),
        }
    }

    /// Returns channel and message type if the step is a channel operation in the given direction.
    pub fn channel_op(&self, dir: Direction) -> Option<(&str, &str)> {
        match &self.kind {
            EventKind::ChannelOp {
                direction,
                channel,
                message_type,
                ..
            } if *direction == dir => Some((channel, message_type)),
            _ => None,
        }
    }
}

/// Computes the spawn depth of every process appearing in `events`.
///
/// The first time a process is seen, its depth is one more than the depth of
/// the process owning the immediately preceding event.
/// The process of the very first event has depth 0.
/// Depths are only meant for layout.
pub fn spawn_depths(events: &[ActionEvent]) -> BTreeMap<Pid, u32> {
    let mut depths = BTreeMap::new();
    let mut previous: Option<Pid> = None;
    for event in events {
        if !depths.contains_key(&event.process_id) {
            let depth = previous
                .and_then(|pid| depths.get(&pid))
                .map_or(0, |depth| depth + 1);
            depths.insert(event.process_id, depth);
        }
        previous = Some(event.process_id);
    }
    depths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(pid: Pid) -> ActionEvent {
        ActionEvent {
            process_id: pid,
            process_label: format!("proc_{pid}"),
            action: "skip".to_string(),
            kind: EventKind::PlainAction,
            source_line: 0,
        }
    }

    #[test]
    fn depth_follows_preceding_owner() {
        let events = [plain(0), plain(0), plain(1), plain(2), plain(0), plain(3)];
        let depths = spawn_depths(&events);
        assert_eq!(depths[&0], 0);
        assert_eq!(depths[&1], 1);
        assert_eq!(depths[&2], 2);
        assert_eq!(depths[&3], 1);
    }

    #[test]
    fn depths_of_empty_run() {
        assert!(spawn_depths(&[]).is_empty());
    }

    #[test]
    fn label_of_channel_op() {
        let mut event = plain(1);
        event.kind = EventKind::ChannelOp {
            direction: Direction::Receive,
            channel: "4".to_string(),
            message_type: "value".to_string(),
            payload: "84".to_string(),
        };
        assert_eq!(event.label(), "4?value,84");
        assert_eq!(event.channel_op(Direction::Receive), Some(("4", "value")));
        assert_eq!(event.channel_op(Direction::Send), None);
    }
}

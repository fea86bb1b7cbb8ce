use crate::{ActionEvent, ChannelEquivalence, Direction, EventKind};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

/// How a receive was paired with its send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Same channel and message type.
    Exact,
    /// Same message type on a channel already known to be equivalent.
    Equivalent,
    /// Same message type on an unrelated channel.
    /// The two channels are considered equivalent from then on.
    Inferred,
}

/// A delivered message: the send at index `send` was received at index `receive`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommunicationEdge {
    /// Index of the send event.
    pub send: usize,
    /// Index of the receive event.
    pub receive: usize,
    /// The channel the message was sent on.
    pub channel: String,
    /// The message type.
    pub message_type: String,
    /// How the pairing was found.
    pub kind: MatchKind,
}

/// A receive for which no compatible send was pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedReceive {
    /// Index of the receive event.
    pub receive: usize,
    /// Label of the receiving process.
    pub process_label: String,
    /// The channel received from.
    pub channel: String,
    /// The expected message type.
    pub message_type: String,
}

/// The message-sequence chart of a simulated run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MessageSequenceChart {
    /// Matched (send, receive) pairs, ordered by receive.
    pub edges: Vec<CommunicationEdge>,
    /// Receives with no matching send.
    pub unmatched_receives: Vec<UnmatchedReceive>,
    /// Indices of sends still pending at the end of the run.
    pub dangling_sends: Vec<usize>,
    /// Channel pairs found equivalent while matching, as (receive channel, send channel).
    pub inferred_equivalences: Vec<(String, String)>,
}

impl MessageSequenceChart {
    /// The edge ending in the receive at `index`, if any.
    pub fn edge_into(&self, index: usize) -> Option<&CommunicationEdge> {
        self.edges.iter().find(|edge| edge.receive == index)
    }
}

/// Pairs receives with the sends that produced them.
///
/// Pending sends are queued per (channel, message type) and consumed in FIFO order.
/// A receive first takes the oldest send with the exact same key;
/// failing that, the oldest send of the same type on an equivalent channel;
/// failing that, the oldest send of the same type on any channel,
/// in which case the two channels become equivalent.
///
/// The last fallback ignores channels altogether, so it can pair messages wrongly
/// when several channels carry same-named message types at the same time.
/// It also scans every pending queue, so a run with many distinct pending keys
/// and many unmatched receives costs O(keys × receives).
#[derive(Debug, Clone, Default)]
pub struct CommunicationMatcher {
    equivalence: ChannelEquivalence,
    pending: BTreeMap<(String, String), VecDeque<usize>>,
}

impl CommunicationMatcher {
    /// Creates a [`CommunicationMatcher`] with no known channel equivalence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a [`CommunicationMatcher`] knowing the given equivalences in advance.
    pub fn with_equivalence(equivalence: ChannelEquivalence) -> Self {
        Self {
            equivalence,
            pending: BTreeMap::new(),
        }
    }

    /// Builds the [`MessageSequenceChart`] of the given events.
    pub fn build(mut self, events: &[ActionEvent]) -> MessageSequenceChart {
        let mut msc = MessageSequenceChart::default();
        for (idx, event) in events.iter().enumerate() {
            let EventKind::ChannelOp {
                direction,
                channel,
                message_type,
                ..
            } = &event.kind
            else {
                continue;
            };
            match direction {
                Direction::Send => self
                    .pending
                    .entry((channel.clone(), message_type.clone()))
                    .or_default()
                    .push_back(idx),
                Direction::Receive => {
                    if let Some((send, send_channel, kind)) = self.take_send(channel, message_type)
                    {
                        if kind == MatchKind::Inferred {
                            debug!("channel '{channel}' inferred equivalent to '{send_channel}'");
                            self.equivalence.union(channel, &send_channel);
                            msc.inferred_equivalences
                                .push((channel.clone(), send_channel.clone()));
                        }
                        msc.edges.push(CommunicationEdge {
                            send,
                            receive: idx,
                            channel: send_channel,
                            message_type: message_type.clone(),
                            kind,
                        });
                    } else {
                        warn!(
                            "receive {channel}?{message_type} by {} (step {idx}) has no matching send",
                            event.process_label
                        );
                        msc.unmatched_receives.push(UnmatchedReceive {
                            receive: idx,
                            process_label: event.process_label.clone(),
                            channel: channel.clone(),
                            message_type: message_type.clone(),
                        });
                    }
                }
            }
        }
        msc.dangling_sends = self.pending.into_values().flatten().collect();
        msc.dangling_sends.sort_unstable();
        info!(
            "message sequence chart: {} edges, {} unmatched receives, {} dangling sends",
            msc.edges.len(),
            msc.unmatched_receives.len(),
            msc.dangling_sends.len()
        );
        msc
    }

    fn take_send(&mut self, channel: &str, message_type: &str) -> Option<(usize, String, MatchKind)> {
        let key = (channel.to_owned(), message_type.to_owned());
        if let Some(send) = self.pop(&key) {
            return Some((send, key.0, MatchKind::Exact));
        }

        // Fallback: oldest send of the same type, preferring equivalent channels.
        let mut equivalent: Option<(usize, &String)> = None;
        let mut inferred: Option<(usize, &String)> = None;
        for ((send_channel, send_type), queue) in &self.pending {
            if send_type != message_type {
                continue;
            }
            let Some(&front) = queue.front() else {
                continue;
            };
            let slot = if self.equivalence.equivalent(send_channel, channel) {
                &mut equivalent
            } else {
                &mut inferred
            };
            if slot.is_none_or(|(best, _)| front < best) {
                *slot = Some((front, send_channel));
            }
        }
        let (kind, send_channel) = match (equivalent, inferred) {
            (Some((_, send_channel)), _) => (MatchKind::Equivalent, send_channel.clone()),
            (None, Some((_, send_channel))) => (MatchKind::Inferred, send_channel.clone()),
            (None, None) => return None,
        };
        let key = (send_channel, key.1);
        let send = self.pop(&key)?;
        Some((send, key.0, kind))
    }

    fn pop(&mut self, key: &(String, String)) -> Option<usize> {
        let queue = self.pending.get_mut(key)?;
        let send = queue.pop_front();
        if queue.is_empty() {
            self.pending.remove(key);
        }
        send
    }
}

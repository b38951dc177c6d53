//! Client-side message log of the joined room.
//!
//! Ingestion is idempotent: each frame is keyed by the server `id` when
//! present, otherwise by `(memberId, regDate, msg)`. Entries are kept in
//! ascending `regDate` order; equal dates keep arrival order.

use std::collections::HashSet;

use barcart_shared::protocol::{ChatFrame, MemberId};

/// Identity used to recognize an already seen frame
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Server(i64),
    Synthetic {
        member_id: MemberId,
        reg_date: i64,
        msg: Option<String>,
    },
}

impl DedupKey {
    /// Key of a frame whose `regDate` is already stamped
    pub fn of(frame: &ChatFrame, reg_date: i64) -> Self {
        match frame.id {
            Some(id) => Self::Server(id),
            None => Self::Synthetic {
                member_id: frame.member_id,
                reg_date,
                msg: frame.msg.clone(),
            },
        }
    }
}

/// Append-only, ordered, deduplicated log
#[derive(Debug, Default)]
pub struct MessageLog {
    entries: Vec<ChatFrame>,
    seen: HashSet<DedupKey>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one inbound frame.
    ///
    /// A missing `regDate` is stamped with `received_at`. Returns the stored
    /// frame, or `None` when it was a duplicate.
    pub fn ingest(&mut self, mut frame: ChatFrame, received_at: i64) -> Option<&ChatFrame> {
        let reg_date = *frame.reg_date.get_or_insert(received_at);
        if !self.seen.insert(DedupKey::of(&frame, reg_date)) {
            tracing::debug!("Discarding duplicate frame from member {}", frame.member_id);
            return None;
        }

        // Upper bound: after every entry with regDate <= this one.
        let index = self
            .entries
            .partition_point(|entry| entry.reg_date.unwrap_or_default() <= reg_date);
        self.entries.insert(index, frame);
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[ChatFrame] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Room エンティティ
//!
//! 部屋の定員、入室中の接続、メッセージ履歴を保持します。

use barcart_shared::protocol::{ChatFrame, MemberId, RoomId, RoomInfo, RoomType};

use super::{RoomError, SessionId};

/// 部屋の作成パラメータ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoom {
    pub name: String,
    pub room_type: RoomType,
    pub capacity: u32,
}

/// 入室中の接続
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMember {
    pub session_id: SessionId,
    pub member_id: MemberId,
    pub entered_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub room_type: RoomType,
    pub capacity: u32,
    /// Unix ミリ秒
    pub created_at: i64,
    pub members: Vec<RoomMember>,
    /// id の昇順（= 受信順）
    pub messages: Vec<ChatFrame>,
}

impl Room {
    pub fn new(id: impl Into<RoomId>, spec: NewRoom, created_at: i64) -> Self {
        Self {
            id: id.into(),
            name: spec.name,
            room_type: spec.room_type,
            capacity: spec.capacity,
            created_at,
            members: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// 接続を入室させる
    ///
    /// 同じ接続の再入室は何もしない（定員を消費しない）。
    ///
    /// # Errors
    ///
    /// 定員に達している場合は [`RoomError::Full`]
    pub fn enter(&mut self, member: RoomMember) -> Result<(), RoomError> {
        if self.has_session(&member.session_id) {
            return Ok(());
        }
        if self.member_count() >= self.capacity {
            return Err(RoomError::Full {
                capacity: self.capacity,
            });
        }
        self.members.push(member);
        Ok(())
    }

    /// 接続を退室させる。入室していなければ `false`
    pub fn leave(&mut self, session_id: &SessionId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| &m.session_id != session_id);
        self.members.len() != before
    }

    pub fn has_session(&self, session_id: &SessionId) -> bool {
        self.members.iter().any(|m| &m.session_id == session_id)
    }

    pub fn member_count(&self) -> u32 {
        u32::try_from(self.members.len()).unwrap_or(u32::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn session_ids(&self) -> Vec<SessionId> {
        self.members.iter().map(|m| m.session_id).collect()
    }

    pub fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.id.clone(),
            name: self.name.clone(),
            reg_date: self.created_at,
            room_type: self.room_type,
            person_cnt: self.capacity,
        }
    }
}

//! Wire protocol shared by the session core and the development backend.
//!
//! - WebSocket: JSON text frames carrying a [`ChatFrame`]
//! - REST: auth and room payloads, all `camelCase` on the wire

use serde::{Deserialize, Serialize};

/// Member identifier as issued by the backend
pub type MemberId = i64;

/// Room identifier (UUID string on the backend)
pub type RoomId = String;

/// Chat frame type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FrameType {
    /// Member entered a room
    Enter,
    /// Chat message
    Talk,
    /// Member left a room
    Close,
}

/// A single frame on the chat socket.
///
/// Client → server frames never carry `id` or `img`; server → client frames
/// may carry a server-assigned `id`, the sender avatar `img` and `regDate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatFrame {
    pub r#type: FrameType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub room_id: RoomId,
    pub member_id: MemberId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    /// Unix milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reg_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
}

impl ChatFrame {
    /// `ENTER` frame sent when joining a room
    pub fn enter(room_id: impl Into<RoomId>, member_id: MemberId) -> Self {
        Self::bare(FrameType::Enter, room_id.into(), member_id)
    }

    /// `TALK` frame carrying a message stamped by the sender
    pub fn talk(
        room_id: impl Into<RoomId>,
        member_id: MemberId,
        msg: impl Into<String>,
        reg_date: i64,
    ) -> Self {
        Self {
            msg: Some(msg.into()),
            reg_date: Some(reg_date),
            ..Self::bare(FrameType::Talk, room_id.into(), member_id)
        }
    }

    /// `CLOSE` frame sent when leaving a room
    pub fn close(room_id: impl Into<RoomId>, member_id: MemberId) -> Self {
        Self::bare(FrameType::Close, room_id.into(), member_id)
    }

    fn bare(r#type: FrameType, room_id: RoomId, member_id: MemberId) -> Self {
        Self {
            r#type,
            id: None,
            room_id,
            member_id,
            msg: None,
            reg_date: None,
            img: None,
        }
    }
}

/// Room kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoomType {
    Group,
    Private,
}

/// Room metadata returned by the room endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub name: String,
    /// Unix milliseconds
    pub reg_date: i64,
    pub room_type: RoomType,
    /// Room capacity
    pub person_cnt: u32,
}

/// `POST /chat/new` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub name: String,
    pub room_type: RoomType,
    pub person_cnt: u32,
}

/// `POST /auth/login` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub pwd: String,
}

/// `POST /auth/refresh` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token pair returned by login and refresh.
///
/// Refresh only returns `refreshToken` when the backend rotates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// `GET /auth/me` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInfo {
    pub member_id: MemberId,
    pub email: String,
    pub nickname: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_talk_frame_serializes_camel_case() {
        // テスト項目: TALK フレームが camelCase の JSON にシリアライズされる
        // given (前提条件):
        let frame = ChatFrame::talk("room-1", 7, "cheers", 1000);

        // when (操作):
        let json = serde_json::to_value(&frame).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            serde_json::json!({
                "type": "TALK",
                "roomId": "room-1",
                "memberId": 7,
                "msg": "cheers",
                "regDate": 1000
            })
        );
    }

    #[test]
    fn test_enter_frame_omits_optional_fields() {
        // テスト項目: ENTER フレームには msg / regDate / id が含まれない
        // given (前提条件):
        let frame = ChatFrame::enter("room-1", 7);

        // when (操作):
        let json = serde_json::to_string(&frame).unwrap();

        // then (期待する結果):
        assert_eq!(json, r#"{"type":"ENTER","roomId":"room-1","memberId":7}"#);
    }

    #[test]
    fn test_server_frame_with_avatar_deserializes() {
        // テスト項目: サーバーから届く id / img 付きフレームをデシリアライズできる
        // given (前提条件):
        let text = r#"{"type":"TALK","id":42,"roomId":"r","memberId":3,"msg":"hi","regDate":5,"img":"a.png"}"#;

        // when (操作):
        let frame: ChatFrame = serde_json::from_str(text).unwrap();

        // then (期待する結果):
        assert_eq!(frame.id, Some(42));
        assert_eq!(frame.img.as_deref(), Some("a.png"));
        assert_eq!(frame.r#type, FrameType::Talk);
    }

    #[test]
    fn test_refresh_response_without_rotation() {
        // テスト項目: refreshToken を含まないトークン応答を受け付ける
        // given (前提条件):
        let text = r#"{"accessToken":"fresh"}"#;

        // when (操作):
        let response: TokenResponse = serde_json::from_str(text).unwrap();

        // then (期待する結果):
        assert_eq!(response.access_token, "fresh");
        assert_eq!(response.refresh_token, None);
    }
}

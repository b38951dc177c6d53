//! Text rendering for the terminal client.

use barcart_shared::{
    protocol::{ChatFrame, FrameType, MemberId, RoomInfo, RoomType},
    time::{timestamp_to_kst_clock, timestamp_to_kst_rfc3339},
};

use crate::{chat::ConnectionState, error::ChatError};

const RULE: &str = "============================================================";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Room table printed by `barcart-client rooms`
    pub fn format_room_list(rooms: &[RoomInfo]) -> String {
        let mut output = String::new();
        output.push_str(RULE);
        output.push_str("\nRooms:\n");

        if rooms.is_empty() {
            output.push_str("(No rooms)\n");
        } else {
            for room in rooms {
                let kind = match room.room_type {
                    RoomType::Group => "group",
                    RoomType::Private => "private",
                };
                output.push_str(&format!(
                    "{}  {} [{}, up to {}] - opened at {}\n",
                    room.room_id,
                    room.name,
                    kind,
                    room.person_cnt,
                    timestamp_to_kst_rfc3339(room.reg_date)
                ));
            }
        }

        output.push_str(RULE);
        output.push('\n');
        output
    }

    /// One log entry; the member's own messages are marked `(me)`
    pub fn format_chat_frame(frame: &ChatFrame, me: MemberId) -> String {
        let at = frame
            .reg_date
            .map(timestamp_to_kst_clock)
            .unwrap_or_default();
        let who = if frame.member_id == me {
            format!("#{} (me)", frame.member_id)
        } else {
            format!("#{}", frame.member_id)
        };

        match frame.r#type {
            FrameType::Enter => format!("\n+ {} entered {}\n", who, at),
            FrameType::Close => format!("\n- {} left {}\n", who, at),
            FrameType::Talk => format!(
                "\n[{}] @{}: {}\n",
                at,
                who,
                frame.msg.as_deref().unwrap_or_default()
            ),
        }
    }

    pub fn format_state(state: ConnectionState) -> String {
        format!("\n* connection {}\n", state)
    }

    pub fn format_reconnecting(attempt: u32, max_attempts: u32) -> String {
        format!("\n* reconnecting ({}/{})...\n", attempt, max_attempts)
    }

    pub fn format_error(error: &ChatError) -> String {
        format!("\n! {}\n", error)
    }
}

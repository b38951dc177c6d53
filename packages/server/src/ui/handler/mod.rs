//! Request handlers.

mod auth;
mod room;
mod websocket;

pub use auth::{login, me, refresh};
pub use room::{
    count_room_members, create_room, delete_room, get_room, health_check, list_my_rooms,
    list_rooms, room_messages,
};
pub use websocket::websocket_handler;

//! ドメイン層
//!
//! ビジネスルール（部屋の定員、メッセージの採番、会員アカウント）と、
//! ドメイン層が必要とするインターフェース（Repository, MessagePusher）を定義します。

mod account;
mod error;
mod pusher;
mod repository;
mod room;
mod session;

pub use account::Account;
pub use error::{MessagePushError, RepositoryError, RoomError};
pub use pusher::{MessagePusher, PusherChannel};
pub use repository::{AccountRepository, RoomRepository};
pub use room::{NewRoom, Room, RoomMember};
pub use session::SessionId;

#[cfg(test)]
pub use pusher::MockMessagePusher;
#[cfg(test)]
pub use repository::{MockAccountRepository, MockRoomRepository};

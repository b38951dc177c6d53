//! UseCase 層
//!
//! ドメイン層の trait（Repository, MessagePusher）だけに依存し、
//! UI 層のハンドラから呼ばれるアプリケーションロジックを実装します。

mod auth;
mod connect_session;
mod disconnect_session;
mod enter_room;
mod error;
mod leave_room;
mod rooms;
mod send_message;

pub use auth::AuthUseCase;
pub use connect_session::ConnectSessionUseCase;
pub use disconnect_session::DisconnectSessionUseCase;
pub use enter_room::EnterRoomUseCase;
pub use error::{AuthError, EnterRoomError, RoomQueryError, SendMessageError};
pub use leave_room::LeaveRoomUseCase;
pub use rooms::RoomsUseCase;
pub use send_message::SendMessageUseCase;

//! Server state shared by all handlers.

use std::{sync::Arc, time::Duration};

use barcart_shared::time::Clock;

use crate::{
    domain::{AccountRepository, MessagePusher, RoomRepository},
    usecase::{
        AuthUseCase, ConnectSessionUseCase, DisconnectSessionUseCase, EnterRoomUseCase,
        LeaveRoomUseCase, RoomsUseCase, SendMessageUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// AuthUseCase（ログイン・トークン更新・トークン検証）
    pub auth_usecase: Arc<AuthUseCase>,
    /// RoomsUseCase（部屋の参照・作成・削除）
    pub rooms_usecase: Arc<RoomsUseCase>,
    /// ConnectSessionUseCase（WebSocket 接続の受付）
    pub connect_session_usecase: Arc<ConnectSessionUseCase>,
    /// DisconnectSessionUseCase（WebSocket 接続の切断）
    pub disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    /// EnterRoomUseCase（ENTER）
    pub enter_room_usecase: Arc<EnterRoomUseCase>,
    /// LeaveRoomUseCase（CLOSE）
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// SendMessageUseCase（TALK）
    pub send_message_usecase: Arc<SendMessageUseCase>,
}

impl AppState {
    /// Wire every use case over the given repositories, pusher and clock
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        access_ttl: Duration,
    ) -> Self {
        Self {
            auth_usecase: Arc::new(AuthUseCase::new(accounts, clock.clone(), access_ttl)),
            rooms_usecase: Arc::new(RoomsUseCase::new(repository.clone(), clock.clone())),
            connect_session_usecase: Arc::new(ConnectSessionUseCase::new(
                message_pusher.clone(),
            )),
            disconnect_session_usecase: Arc::new(DisconnectSessionUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            enter_room_usecase: Arc::new(EnterRoomUseCase::new(repository.clone(), clock.clone())),
            leave_room_usecase: Arc::new(LeaveRoomUseCase::new(repository.clone())),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                repository,
                message_pusher,
                clock,
            )),
        }
    }
}

//! Infrastructure 層: ドメイン層の trait の具体的な実装

pub mod message_pusher;
pub mod repository;

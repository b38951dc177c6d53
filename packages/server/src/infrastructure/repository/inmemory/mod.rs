mod account;
mod room;

pub use account::InMemoryAccountRepository;
pub use room::InMemoryRoomRepository;

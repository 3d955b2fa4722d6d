pub mod repository;

pub use repository::{MemorySessionStore, SessionRepository, SqliteSessionStore, USER_ID_KEY};

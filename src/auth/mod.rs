//! Session-based authorization in front of every mutating operation.

pub mod gate;
pub mod password;
pub mod session;

pub use gate::AuthGate;
pub use session::{MemorySessionStore, SessionStore, SqliteSessionStore};

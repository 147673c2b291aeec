pub mod account;
pub mod attendance;
pub mod identity;
pub mod role;
pub mod session;

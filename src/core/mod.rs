pub mod accounts;
pub mod attend;
pub mod identities;
pub mod log;
pub mod records;
pub mod recorder;

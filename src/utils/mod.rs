pub mod colors;
pub mod date;
pub mod email;
pub mod path;
pub mod table;
pub mod time;

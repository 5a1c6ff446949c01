//! Core ccbridge library (prompt formatting, stream session control, host seams).

pub mod bus;
pub mod conversation;
pub mod events;
pub mod host;
pub mod model;
pub mod prompt;
pub mod session;

//! Message handlers for the Telegram bot
//!
//! - `basic`: start, help and the fallback reply
//! - `link`: link validation and the format menu

mod basic;
mod link;

pub use basic::*;
pub use link::*;

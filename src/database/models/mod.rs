pub mod chat;
pub mod raffle;

pub use chat::*;
pub use raffle::*;

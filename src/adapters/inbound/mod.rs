pub mod channel_position;
pub mod replay_position;

pub use channel_position::*;
pub use replay_position::*;

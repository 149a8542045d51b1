mod constants;
mod difficulty;
mod game;
mod progress;
mod ranking;
mod scoring;
mod sequence;

pub use constants::*;
pub use difficulty::*;
pub use game::*;
pub use progress::*;
pub use ranking::*;
pub use scoring::*;
pub use sequence::*;

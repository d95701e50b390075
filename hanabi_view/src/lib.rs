pub mod card_counting;
mod errors;
mod notes;
mod projector;
mod session;
mod store;
mod visualization;

pub use card_counting::{CardCount, DeckComposition, Piles};
pub use errors::*;
pub use notes::*;
pub use projector::*;
pub use session::*;
pub use store::*;
pub use visualization::*;

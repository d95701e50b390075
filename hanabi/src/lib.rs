pub use cards::*;
pub use errors::*;
pub use hints::*;
pub use protocol_types::*;

#[cfg(test)]
mod arbitrary;
mod cards;
mod errors;
mod hints;
mod protocol_types;

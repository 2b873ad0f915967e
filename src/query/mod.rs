pub mod identifier;
pub mod builder;

pub use identifier::*;
pub use builder::*;

pub mod card;
pub mod custom;
pub mod source;

pub use card::*;
pub use custom::*;
pub use source::*;

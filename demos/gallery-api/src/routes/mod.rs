pub mod cards;
pub mod sync;

pub mod events;
pub mod fixtures;

pub use events::*;
pub use fixtures::*;

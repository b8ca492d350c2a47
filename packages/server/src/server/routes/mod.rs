// HTTP routes
pub mod health;
pub mod telegram;

pub use health::*;
pub use telegram::*;

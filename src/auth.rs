//! Token and scope models shared by the engine and the strategy.

pub mod grant;
pub mod scope;
pub mod secret;

pub use grant::*;
pub use scope::*;
pub use secret::*;

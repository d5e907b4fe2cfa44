pub mod accounts;
pub mod window;

pub use accounts::*;
pub use window::*;

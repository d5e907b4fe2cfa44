pub mod cost_lock;
pub mod limits;
pub mod paymaster_config;
pub mod registry;
pub mod roles;
pub mod sponsor_account;
pub mod user_operation;

pub use cost_lock::*;
pub use limits::*;
pub use paymaster_config::*;
pub use registry::*;
pub use roles::*;
pub use sponsor_account::*;
pub use user_operation::*;

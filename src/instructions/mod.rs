pub mod deposit_operations;
pub mod paymaster_admin_operations;
pub mod post_op;
pub mod registry_operations;
pub mod role_operations;
pub mod validate_user_op;

pub use deposit_operations::*;
pub use paymaster_admin_operations::*;
pub use post_op::*;
pub use registry_operations::*;
pub use role_operations::*;
pub use validate_user_op::*;

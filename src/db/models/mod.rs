//! Database row models, one file per table.

pub mod delivery_log;
pub mod order;
pub mod subscription;
pub mod user;

pub use self::delivery_log::*;
pub use self::order::*;
pub use self::subscription::*;
pub use self::user::*;

pub mod delivery_log;
pub mod order;
pub mod subscription;
pub mod user;

pub use delivery_log::DeliveryLogRepository;
pub use order::OrderRepository;
pub use subscription::SubscriptionRepository;
pub use user::UserRepository;

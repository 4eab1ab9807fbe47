pub mod deliveries;
pub mod events;
pub mod health;
pub mod orders;
pub mod subscriptions;
pub mod users;

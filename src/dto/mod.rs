pub mod analytics;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod messages;
pub mod notifications;
pub mod orders;
pub mod reviews;
pub mod souvenirs;
pub mod storage;
pub mod users;
pub mod wishlist;

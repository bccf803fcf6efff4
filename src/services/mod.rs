pub mod analytics_service;
pub mod auth_service;
pub mod cart_service;
pub mod category_service;
pub mod message_service;
pub mod notification_service;
pub mod order_service;
pub mod review_service;
pub mod souvenir_service;
pub mod storage_service;
pub mod user_service;
pub mod wishlist_service;

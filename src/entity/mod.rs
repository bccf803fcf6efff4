pub mod audit_logs;
pub mod cart_items;
pub mod categories;
pub mod enums;
pub mod messages;
pub mod notifications;
pub mod order_items;
pub mod orders;
pub mod reviews;
pub mod sessions;
pub mod souvenirs;
pub mod stored_files;
pub mod users;
pub mod wishlist_items;

pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use categories::Entity as Categories;
pub use messages::Entity as Messages;
pub use notifications::Entity as Notifications;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use reviews::Entity as Reviews;
pub use sessions::Entity as Sessions;
pub use souvenirs::Entity as Souvenirs;
pub use stored_files::Entity as StoredFiles;
pub use users::Entity as Users;
pub use wishlist_items::Entity as WishlistItems;

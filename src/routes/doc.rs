use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        analytics::{CategoryCount, DashboardStats, RevenuePoint, StatusBreakdown},
        auth::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
        cart::{AddToCartRequest, CartList, UpdateQuantityRequest},
        categories::{CategoryList, CategoryRemoval, CreateCategoryRequest},
        messages::{MessageList, ReplyMessageRequest, SendMessageRequest},
        notifications::{CreateNotificationRequest, NotificationList},
        orders::{
            BulkOrderStatusRequest, CreateOrderRequest, OrderCreated, OrderLineRequest, OrderList,
            UpdateOrderStatusRequest,
        },
        reviews::{AddReviewRequest, ReviewList},
        souvenirs::{
            BulkDeleteRequest, BulkSouvenirStatusRequest, CreateSouvenirRequest, SouvenirList,
            UpdateSouvenirRequest, UpdateSouvenirStatusRequest,
        },
        storage::UploadUrl,
        users::{UpdateProfileRequest, UpdateUserRoleRequest, UpdateUserStatusRequest, UserList},
        wishlist::{ToggleResult, ToggleWishlistRequest, WishlistList},
    },
    error::{ErrorData, ErrorKind},
    events::{ChangeAction, ChangeEvent, Collection},
    models::{
        CartItem, Category, ContactMessage, Notification, Order, OrderLine, OrderStatus, Review,
        Role, Souvenir, SouvenirStatus, StoredFile, User, UserStatus, WishlistItem,
    },
    response::{Affected, ApiResponse, Meta},
    routes::{
        admin, auth, cart, categories, health, messages, notifications, orders, params,
        souvenirs, storage, users, wishlist,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("opaque session token")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::logout_session,
        users::me,
        users::update_me,
        storage::upload_url,
        storage::upload,
        storage::download,
        souvenirs::list_souvenirs,
        souvenirs::get_souvenir,
        souvenirs::create_souvenir,
        souvenirs::update_souvenir,
        souvenirs::update_status,
        souvenirs::update_statuses,
        souvenirs::delete_souvenir,
        souvenirs::delete_souvenirs,
        souvenirs::list_reviews,
        souvenirs::add_review,
        categories::list_categories,
        categories::create_category,
        categories::delete_category,
        cart::cart_list,
        cart::add_to_cart,
        cart::update_quantity,
        cart::remove_from_cart,
        wishlist::list_wishlist,
        wishlist::toggle_wishlist,
        wishlist::remove_from_wishlist,
        orders::list_orders,
        orders::create_order,
        notifications::list_notifications,
        notifications::mark_all_read,
        notifications::clear_notifications,
        notifications::remove_notification,
        messages::send_message,
        admin::list_users,
        admin::update_user_status,
        admin::update_user_role,
        admin::delete_user,
        admin::list_all_orders,
        admin::update_order_status,
        admin::update_order_statuses,
        admin::delete_order,
        admin::delete_orders,
        admin::create_notification,
        admin::list_messages,
        admin::reply_message,
        admin::delete_message,
        admin::analytics
    ),
    components(
        schemas(
            User,
            Role,
            UserStatus,
            Souvenir,
            SouvenirStatus,
            Category,
            CartItem,
            WishlistItem,
            Order,
            OrderLine,
            OrderStatus,
            Review,
            Notification,
            ContactMessage,
            StoredFile,
            RegisterRequest,
            RegisterResponse,
            LoginRequest,
            LoginResponse,
            UpdateProfileRequest,
            UpdateUserStatusRequest,
            UpdateUserRoleRequest,
            UserList,
            CreateSouvenirRequest,
            UpdateSouvenirRequest,
            UpdateSouvenirStatusRequest,
            BulkSouvenirStatusRequest,
            BulkDeleteRequest,
            SouvenirList,
            CreateCategoryRequest,
            CategoryList,
            CategoryRemoval,
            AddToCartRequest,
            UpdateQuantityRequest,
            CartList,
            ToggleWishlistRequest,
            ToggleResult,
            WishlistList,
            OrderLineRequest,
            CreateOrderRequest,
            OrderCreated,
            UpdateOrderStatusRequest,
            BulkOrderStatusRequest,
            OrderList,
            AddReviewRequest,
            ReviewList,
            CreateNotificationRequest,
            NotificationList,
            SendMessageRequest,
            ReplyMessageRequest,
            MessageList,
            UploadUrl,
            DashboardStats,
            RevenuePoint,
            StatusBreakdown,
            CategoryCount,
            ChangeEvent,
            ChangeAction,
            Collection,
            ErrorKind,
            ErrorData,
            Affected,
            params::Pagination,
            params::SortOrder,
            params::SouvenirSortBy,
            Meta,
            ApiResponse<Souvenir>,
            ApiResponse<SouvenirList>,
            ApiResponse<OrderCreated>,
            ApiResponse<OrderList>,
            ApiResponse<ErrorData>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and sessions"),
        (name = "Users", description = "Own profile"),
        (name = "Storage", description = "Image upload and download"),
        (name = "Souvenirs", description = "Catalog"),
        (name = "Reviews", description = "Souvenir reviews"),
        (name = "Categories", description = "Catalog categories"),
        (name = "Cart", description = "Shopping cart"),
        (name = "Wishlist", description = "Saved souvenirs"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Notifications", description = "In-app notifications"),
        (name = "Messages", description = "Contact form"),
        (name = "Admin", description = "Back office"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartList, UpdateQuantityRequest},
    entity::{
        cart_items::{ActiveModel as CartActive, Column as CartCol, Entity as CartItems, Model as CartModel},
        souvenirs::Entity as Souvenirs,
    },
    error::{AppError, AppResult, is_unique_violation},
    events::{ChangeAction, Collection},
    middleware::auth::AuthUser,
    models::{CartItem, Souvenir},
    money::MAX_LINE_QUANTITY,
    response::{ApiResponse, Meta},
    services::souvenir_service,
    state::AppState,
};

pub async fn list_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartList>> {
    let rows = CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .order_by_desc(CartCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let ids = rows.iter().map(|r| r.souvenir_id).collect();
    let mut souvenirs = souvenir_service::project_by_ids(&state.orm, &state.storage, ids).await?;

    let items: Vec<CartItem> = rows
        .into_iter()
        .map(|row| {
            let souvenir = souvenirs.remove(&row.souvenir_id);
            cart_item_from_entity(row, souvenir)
        })
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("OK", CartList { items }, Some(meta)))
}

/// Adds `quantity` to the caller's row for the souvenir, creating it when absent.
pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    validate_quantity(payload.quantity)?;

    let souvenir = Souvenirs::find_by_id(payload.souvenir_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("souvenir not found".into()))?;

    let existing = find_pair(&state.orm, user.user_id, payload.souvenir_id).await?;
    let (row, action) = match existing {
        Some(item) => (increment(state, item.id, payload.quantity).await?, ChangeAction::Updated),
        None => {
            let inserted = CartActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.user_id),
                souvenir_id: Set(payload.souvenir_id),
                quantity: Set(payload.quantity),
                created_at: Set(Utc::now().into()),
            }
            .insert(&state.orm)
            .await;
            match inserted {
                Ok(row) => (row, ChangeAction::Created),
                // A concurrent add created the row first.
                Err(err) if is_unique_violation(&err) => {
                    let item = find_pair(&state.orm, user.user_id, payload.souvenir_id)
                        .await?
                        .ok_or(AppError::OrmError(err))?;
                    (increment(state, item.id, payload.quantity).await?, ChangeAction::Updated)
                }
                Err(err) => return Err(err.into()),
            }
        }
    };

    state
        .events
        .notify_user(Collection::CartItems, action, vec![row.id], user.user_id);

    let souvenir = souvenir_service::project_one(&state.orm, &state.storage, souvenir).await?;
    Ok(ApiResponse::success(
        "Added to cart",
        cart_item_from_entity(row, Some(souvenir)),
        Some(Meta::empty()),
    ))
}

pub async fn update_quantity(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateQuantityRequest,
) -> AppResult<ApiResponse<CartItem>> {
    validate_quantity(payload.quantity)?;
    let item = find_owned(state, user, id).await?;

    let mut active: CartActive = item.into();
    active.quantity = Set(payload.quantity);
    let row = active.update(&state.orm).await?;

    state
        .events
        .notify_user(Collection::CartItems, ChangeAction::Updated, vec![id], user.user_id);

    let souvenir = souvenir_service::project_by_ids(&state.orm, &state.storage, vec![row.souvenir_id])
        .await?
        .remove(&row.souvenir_id);
    Ok(ApiResponse::success(
        "Quantity updated",
        cart_item_from_entity(row, souvenir),
        Some(Meta::empty()),
    ))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = CartItems::delete_many()
        .filter(CartCol::Id.eq(id))
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    state
        .events
        .notify_user(Collection::CartItems, ChangeAction::Deleted, vec![id], user.user_id);
    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn find_pair(
    db: &DatabaseConnection,
    user_id: Uuid,
    souvenir_id: Uuid,
) -> AppResult<Option<CartModel>> {
    Ok(CartItems::find()
        .filter(
            Condition::all()
                .add(CartCol::UserId.eq(user_id))
                .add(CartCol::SouvenirId.eq(souvenir_id)),
        )
        .one(db)
        .await?)
}

/// Adds to the stored quantity in one statement. The row is left untouched
/// when the sum would pass [`MAX_LINE_QUANTITY`].
async fn increment(state: &AppState, id: Uuid, by: i32) -> AppResult<CartModel> {
    let result = CartItems::update_many()
        .col_expr(CartCol::Quantity, Expr::col(CartCol::Quantity).add(by))
        .filter(CartCol::Id.eq(id))
        .filter(CartCol::Quantity.lte(MAX_LINE_QUANTITY - by))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::BadRequest("quantity too large".into()));
    }
    CartItems::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

async fn find_owned(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<CartModel> {
    CartItems::find()
        .filter(CartCol::Id.eq(id))
        .filter(CartCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub(crate) fn validate_quantity(quantity: i32) -> AppResult<()> {
    if quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err(AppError::BadRequest(format!(
            "quantity must not exceed {MAX_LINE_QUANTITY}"
        )));
    }
    Ok(())
}

fn cart_item_from_entity(model: CartModel, souvenir: Option<Souvenir>) -> CartItem {
    CartItem {
        id: model.id,
        user_id: model.user_id,
        souvenir_id: model.souvenir_id,
        quantity: model.quantity,
        souvenir,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

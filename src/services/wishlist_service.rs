use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    dto::wishlist::{ToggleResult, ToggleWishlistRequest, WishlistList},
    entity::{
        souvenirs::Entity as Souvenirs,
        wishlist_items::{ActiveModel as WishlistActive, Column as WishlistCol, Entity as WishlistItems, Model as WishlistModel},
    },
    error::{AppError, AppResult, is_unique_violation},
    events::{ChangeAction, Collection},
    middleware::auth::AuthUser,
    models::{Souvenir, WishlistItem},
    response::{ApiResponse, Meta},
    services::souvenir_service,
    state::AppState,
};

pub async fn list_wishlist(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<WishlistList>> {
    let rows = WishlistItems::find()
        .filter(WishlistCol::UserId.eq(user.user_id))
        .order_by_desc(WishlistCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let ids = rows.iter().map(|r| r.souvenir_id).collect();
    let mut souvenirs = souvenir_service::project_by_ids(&state.orm, &state.storage, ids).await?;

    let items: Vec<WishlistItem> = rows
        .into_iter()
        .map(|row| {
            let souvenir = souvenirs.remove(&row.souvenir_id);
            wishlist_item_from_entity(row, souvenir)
        })
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("OK", WishlistList { items }, Some(meta)))
}

/// Removes the souvenir from the wishlist when present, adds it otherwise.
pub async fn toggle_wishlist(
    state: &AppState,
    user: &AuthUser,
    payload: ToggleWishlistRequest,
) -> AppResult<ApiResponse<ToggleResult>> {
    let existing = WishlistItems::find()
        .filter(WishlistCol::UserId.eq(user.user_id))
        .filter(WishlistCol::SouvenirId.eq(payload.souvenir_id))
        .one(&state.orm)
        .await?;

    if let Some(item) = existing {
        let id = item.id;
        item.delete(&state.orm).await?;
        state
            .events
            .notify_user(Collection::WishlistItems, ChangeAction::Deleted, vec![id], user.user_id);
        return Ok(ApiResponse::success(
            "Removed from wishlist",
            ToggleResult { added: false },
            Some(Meta::empty()),
        ));
    }

    if Souvenirs::find_by_id(payload.souvenir_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest("souvenir not found".into()));
    }

    let inserted = WishlistActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        souvenir_id: Set(payload.souvenir_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await;
    let inserted = match inserted {
        Ok(row) => row,
        // A concurrent toggle already added it; the end state is the same.
        Err(err) if is_unique_violation(&err) => {
            return Ok(ApiResponse::success(
                "Added to wishlist",
                ToggleResult { added: true },
                Some(Meta::empty()),
            ));
        }
        Err(err) => return Err(err.into()),
    };

    state.events.notify_user(
        Collection::WishlistItems,
        ChangeAction::Created,
        vec![inserted.id],
        user.user_id,
    );
    Ok(ApiResponse::success(
        "Added to wishlist",
        ToggleResult { added: true },
        Some(Meta::empty()),
    ))
}

pub async fn remove_from_wishlist(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = WishlistItems::delete_many()
        .filter(WishlistCol::Id.eq(id))
        .filter(WishlistCol::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    state
        .events
        .notify_user(Collection::WishlistItems, ChangeAction::Deleted, vec![id], user.user_id);
    Ok(ApiResponse::success(
        "Removed from wishlist",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn wishlist_item_from_entity(model: WishlistModel, souvenir: Option<Souvenir>) -> WishlistItem {
    WishlistItem {
        id: model.id,
        user_id: model.user_id,
        souvenir_id: model.souvenir_id,
        souvenir,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

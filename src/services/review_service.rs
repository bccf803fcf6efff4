use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait};
use uuid::Uuid;

use crate::{
    audit,
    dto::reviews::{AddReviewRequest, ReviewList},
    entity::{
        reviews::{ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews, Model as ReviewModel},
        souvenirs::Entity as Souvenirs,
    },
    error::{AppError, AppResult},
    events::{ChangeAction, Collection},
    middleware::auth::AuthUser,
    models::Review,
    response::{ApiResponse, Meta},
    services::notification_service,
    state::AppState,
};

pub async fn list_by_souvenir(
    state: &AppState,
    souvenir_id: Uuid,
) -> AppResult<ApiResponse<ReviewList>> {
    let items: Vec<Review> = Reviews::find()
        .filter(ReviewCol::SouvenirId.eq(souvenir_id))
        .order_by_desc(ReviewCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(review_from_entity)
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Reviews", ReviewList { items }, Some(meta)))
}

pub async fn add_review(
    state: &AppState,
    user: &AuthUser,
    souvenir_id: Uuid,
    payload: AddReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest("rating must be between 1 and 5".into()));
    }

    let txn = state.orm.begin().await?;
    let souvenir = Souvenirs::find_by_id(souvenir_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let review = ReviewActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        user_name: Set(user.name.clone()),
        souvenir_id: Set(souvenir_id),
        rating: Set(payload.rating),
        comment: Set(payload.comment.trim().to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    let recipients = notification_service::notify_admins(
        &txn,
        &format!(
            "New {}-star review for \"{}\" from {}.",
            payload.rating, souvenir.name, user.name
        ),
    )
    .await?;
    txn.commit().await?;

    state
        .events
        .notify(Collection::Reviews, ChangeAction::Created, vec![review.id]);
    // Ratings are derived, so the souvenir projection changed too.
    state
        .events
        .notify(Collection::Souvenirs, ChangeAction::Updated, vec![souvenir_id]);
    notification_service::announce(state, &recipients);
    audit::record(
        &state.orm,
        Some(user.user_id),
        "review_create",
        "reviews",
        serde_json::json!({ "review_id": review.id, "souvenir_id": souvenir_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Review added",
        review_from_entity(review),
        Some(Meta::empty()),
    ))
}

fn review_from_entity(model: ReviewModel) -> Review {
    Review {
        id: model.id,
        user_id: model.user_id,
        user_name: model.user_name,
        souvenir_id: model.souvenir_id,
        rating: model.rating,
        comment: model.comment,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

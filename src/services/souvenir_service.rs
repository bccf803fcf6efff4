use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::{Expr, Func},
};
use uuid::Uuid;

use crate::{
    audit,
    dto::souvenirs::{
        BulkDeleteRequest, BulkSouvenirStatusRequest, CreateSouvenirRequest, SouvenirList,
        UpdateSouvenirRequest, UpdateSouvenirStatusRequest,
    },
    entity::{
        enums::Role,
        reviews::{Column as ReviewCol, Entity as Reviews},
        souvenirs::{ActiveModel as SouvenirActive, Column, Entity as Souvenirs, Model as SouvenirModel},
    },
    error::{AppError, AppResult},
    events::{ChangeAction, Collection},
    middleware::auth::{AuthUser, ensure_admin},
    models::Souvenir,
    response::{Affected, ApiResponse, Meta},
    routes::params::{SortOrder, SouvenirQuery, SouvenirSortBy},
    services::{notification_service, storage_service},
    state::AppState,
    storage::FileStorage,
};

pub async fn list_souvenirs(
    state: &AppState,
    query: SouvenirQuery,
) -> AppResult<ApiResponse<SouvenirList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search.to_lowercase());
        condition = condition.add(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col(Column::Name))).like(pattern.clone()))
                .add(Expr::expr(Func::lower(Expr::col(Column::Description))).like(pattern)),
        );
    }
    if let Some(category) = query.category.as_deref().filter(|c| !c.is_empty()) {
        condition = condition.add(Column::Category.eq(category));
    }
    if let Some(status) = query.status {
        condition = condition.add(Column::Status.eq(status));
    }
    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }
    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_col = match query.sort_by.unwrap_or(SouvenirSortBy::CreatedAt) {
        SouvenirSortBy::CreatedAt => Column::CreatedAt,
        SouvenirSortBy::Price => Column::Price,
        SouvenirSortBy::Name => Column::Name,
    };

    let mut finder = Souvenirs::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let models = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = project(&state.orm, &state.storage, models).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Souvenirs", SouvenirList { items }, Some(meta)))
}

pub async fn get_souvenir(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Souvenir>> {
    let model = Souvenirs::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let souvenir = project_one(&state.orm, &state.storage, model).await?;
    Ok(ApiResponse::success("Souvenir", souvenir, Some(Meta::empty())))
}

pub async fn create_souvenir(
    state: &AppState,
    admin: &AuthUser,
    payload: CreateSouvenirRequest,
) -> AppResult<ApiResponse<Souvenir>> {
    ensure_admin(admin)?;
    let name = required("name", &payload.name)?;
    let category = required("category", &payload.category)?;
    validate_amounts(Some(payload.price), Some(payload.stock))?;

    let txn = state.orm.begin().await?;
    storage_service::ensure_exists(&txn, payload.image).await?;

    let now = Utc::now();
    let model = SouvenirActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.clone()),
        description: Set(payload.description.trim().to_string()),
        price: Set(payload.price),
        image: Set(payload.image),
        category: Set(category),
        status: Set(payload.status),
        stock: Set(payload.stock),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let recipients = notification_service::notify_role(
        &txn,
        Role::Customer,
        &format!("New arrival: {name} is now in the shop!"),
    )
    .await?;
    txn.commit().await?;

    state
        .events
        .notify(Collection::Souvenirs, ChangeAction::Created, vec![model.id]);
    notification_service::announce(state, &recipients);
    audit::record(
        &state.orm,
        Some(admin.user_id),
        "souvenir_create",
        "souvenirs",
        serde_json::json!({ "souvenir_id": model.id }),
    )
    .await;

    let souvenir = project_one(&state.orm, &state.storage, model).await?;
    Ok(ApiResponse::success("Souvenir created", souvenir, Some(Meta::empty())))
}

pub async fn update_souvenir(
    state: &AppState,
    admin: &AuthUser,
    id: Uuid,
    payload: UpdateSouvenirRequest,
) -> AppResult<ApiResponse<Souvenir>> {
    ensure_admin(admin)?;
    validate_amounts(payload.price, payload.stock)?;

    let existing = Souvenirs::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let previous_image = existing.image;
    let mut active: SouvenirActive = existing.into();

    if let Some(name) = payload.name.as_deref() {
        active.name = Set(required("name", name)?);
    }
    if let Some(description) = payload.description {
        active.description = Set(description.trim().to_string());
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(category) = payload.category.as_deref() {
        active.category = Set(required("category", category)?);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }
    let replaced_image = match payload.image {
        Some(image) if image != previous_image => {
            storage_service::ensure_exists(&state.orm, image).await?;
            active.image = Set(image);
            Some(previous_image)
        }
        _ => None,
    };
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(&state.orm).await?;

    if let Some(old) = replaced_image {
        storage_service::discard(state, old).await;
    }
    state
        .events
        .notify(Collection::Souvenirs, ChangeAction::Updated, vec![id]);
    audit::record(
        &state.orm,
        Some(admin.user_id),
        "souvenir_update",
        "souvenirs",
        serde_json::json!({ "souvenir_id": id }),
    )
    .await;

    let souvenir = project_one(&state.orm, &state.storage, updated).await?;
    Ok(ApiResponse::success("Updated", souvenir, Some(Meta::empty())))
}

pub async fn update_status(
    state: &AppState,
    admin: &AuthUser,
    id: Uuid,
    payload: UpdateSouvenirStatusRequest,
) -> AppResult<ApiResponse<Souvenir>> {
    ensure_admin(admin)?;
    let existing = Souvenirs::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: SouvenirActive = existing.into();
    active.status = Set(payload.status);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    state
        .events
        .notify(Collection::Souvenirs, ChangeAction::Updated, vec![id]);

    let souvenir = project_one(&state.orm, &state.storage, updated).await?;
    Ok(ApiResponse::success("Status updated", souvenir, Some(Meta::empty())))
}

pub async fn update_statuses(
    state: &AppState,
    admin: &AuthUser,
    payload: BulkSouvenirStatusRequest,
) -> AppResult<ApiResponse<Affected>> {
    ensure_admin(admin)?;
    if payload.ids.is_empty() {
        return Ok(ApiResponse::success(
            "Nothing to update",
            Affected { affected: 0 },
            Some(Meta::empty()),
        ));
    }

    let result = Souvenirs::update_many()
        .col_expr(Column::Status, Expr::value(payload.status))
        .col_expr(
            Column::UpdatedAt,
            Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(Utc::now())),
        )
        .filter(Column::Id.is_in(payload.ids.clone()))
        .exec(&state.orm)
        .await?;

    state
        .events
        .notify(Collection::Souvenirs, ChangeAction::Updated, payload.ids);
    Ok(ApiResponse::success(
        "Statuses updated",
        Affected {
            affected: result.rows_affected,
        },
        Some(Meta::empty()),
    ))
}

pub async fn remove_souvenir(
    state: &AppState,
    admin: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(admin)?;
    let souvenir = Souvenirs::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Souvenirs::delete_by_id(id).exec(&state.orm).await?;
    storage_service::discard(state, souvenir.image).await;

    state
        .events
        .notify(Collection::Souvenirs, ChangeAction::Deleted, vec![id]);
    audit::record(
        &state.orm,
        Some(admin.user_id),
        "souvenir_delete",
        "souvenirs",
        serde_json::json!({ "souvenir_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn remove_many(
    state: &AppState,
    admin: &AuthUser,
    payload: BulkDeleteRequest,
) -> AppResult<ApiResponse<Affected>> {
    ensure_admin(admin)?;
    let souvenirs = Souvenirs::find()
        .filter(Column::Id.is_in(payload.ids))
        .all(&state.orm)
        .await?;
    let ids: Vec<Uuid> = souvenirs.iter().map(|s| s.id).collect();

    let result = Souvenirs::delete_many()
        .filter(Column::Id.is_in(ids.clone()))
        .exec(&state.orm)
        .await?;
    for souvenir in &souvenirs {
        storage_service::discard(state, souvenir.image).await;
    }

    state
        .events
        .notify(Collection::Souvenirs, ChangeAction::Deleted, ids.clone());
    audit::record(
        &state.orm,
        Some(admin.user_id),
        "souvenir_bulk_delete",
        "souvenirs",
        serde_json::json!({ "souvenir_ids": ids }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        Affected {
            affected: result.rows_affected,
        },
        Some(Meta::empty()),
    ))
}

/// Mean rating and count; a souvenir without reviews rates 0.
pub fn rating_summary(ratings: &[i32]) -> (f64, i64) {
    if ratings.is_empty() {
        return (0.0, 0);
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    (sum as f64 / ratings.len() as f64, ratings.len() as i64)
}

/// Resolves image URLs and derives ratings from the reviews of each souvenir.
pub(crate) async fn project<C: ConnectionTrait>(
    db: &C,
    storage: &FileStorage,
    models: Vec<SouvenirModel>,
) -> AppResult<Vec<Souvenir>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
    let mut ratings: HashMap<Uuid, Vec<i32>> = HashMap::new();
    for review in Reviews::find()
        .filter(ReviewCol::SouvenirId.is_in(ids))
        .all(db)
        .await?
    {
        ratings.entry(review.souvenir_id).or_default().push(review.rating);
    }

    Ok(models
        .into_iter()
        .map(|model| {
            let (rating, review_count) =
                rating_summary(ratings.get(&model.id).map(Vec::as_slice).unwrap_or_default());
            souvenir_from_entity(model, storage, rating, review_count)
        })
        .collect())
}

/// Projected souvenirs keyed by id. Ids without a row are simply absent.
pub(crate) async fn project_by_ids<C: ConnectionTrait>(
    db: &C,
    storage: &FileStorage,
    ids: Vec<Uuid>,
) -> AppResult<HashMap<Uuid, Souvenir>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let models = Souvenirs::find()
        .filter(Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(project(db, storage, models)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect())
}

pub(crate) async fn project_one<C: ConnectionTrait>(
    db: &C,
    storage: &FileStorage,
    model: SouvenirModel,
) -> AppResult<Souvenir> {
    project(db, storage, vec![model])
        .await?
        .pop()
        .ok_or(AppError::NotFound)
}

fn souvenir_from_entity(
    model: SouvenirModel,
    storage: &FileStorage,
    rating: f64,
    review_count: i64,
) -> Souvenir {
    Souvenir {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        storage_id: model.image,
        image_url: storage.url_for(model.image),
        category: model.category,
        status: model.status,
        stock: model.stock,
        rating,
        review_count,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn required(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

fn validate_amounts(price: Option<i64>, stock: Option<i32>) -> AppResult<()> {
    if price.is_some_and(|p| p < 0) {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    if stock.is_some_and(|s| s < 0) {
        return Err(AppError::BadRequest("stock must not be negative".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_is_the_arithmetic_mean() {
        assert_eq!(rating_summary(&[]), (0.0, 0));
        assert_eq!(rating_summary(&[5]), (5.0, 1));
        let (rating, count) = rating_summary(&[5, 4, 4, 2]);
        assert_eq!(count, 4);
        assert!((rating - 3.75).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_amounts_are_rejected() {
        assert!(validate_amounts(Some(-1), None).is_err());
        assert!(validate_amounts(None, Some(-3)).is_err());
        assert!(validate_amounts(Some(0), Some(0)).is_ok());
    }
}

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::categories::{CategoryList, CategoryRemoval, CreateCategoryRequest},
    entity::{
        categories::{ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories, Model as CategoryModel},
        souvenirs::{Column as SouvenirCol, Entity as Souvenirs},
    },
    error::{AppError, AppResult, is_unique_violation},
    events::{ChangeAction, Collection},
    middleware::auth::{AuthUser, ensure_admin},
    models::Category,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Souvenirs of a removed category land here.
pub const FALLBACK_CATEGORY: &str = "Uncategorized";

/// Uniqueness key of a category name.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

async fn find_by_key<C: ConnectionTrait>(db: &C, name: &str) -> AppResult<Option<CategoryModel>> {
    Ok(Categories::find()
        .filter(CategoryCol::NameKey.eq(name_key(name)))
        .one(db)
        .await?)
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items: Vec<Category> = Categories::find()
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Categories", CategoryList { items }, Some(meta)))
}

/// Creating a name that already exists (ignoring case) returns the existing row.
pub async fn create_category(
    state: &AppState,
    admin: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(admin)?;
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }

    if let Some(existing) = find_by_key(&state.orm, name).await? {
        return Ok(existing_category(existing));
    }

    let inserted = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        name_key: Set(name_key(name)),
    }
    .insert(&state.orm)
    .await;
    let category = match inserted {
        Ok(category) => category,
        // Created concurrently under another casing.
        Err(err) if is_unique_violation(&err) => {
            let existing = find_by_key(&state.orm, name).await?.ok_or(AppError::OrmError(err))?;
            return Ok(existing_category(existing));
        }
        Err(err) => return Err(err.into()),
    };

    state
        .events
        .notify(Collection::Categories, ChangeAction::Created, vec![category.id]);
    audit::record(
        &state.orm,
        Some(admin.user_id),
        "category_create",
        "categories",
        serde_json::json!({ "category_id": category.id, "name": category.name }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category created",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn remove_category(
    state: &AppState,
    admin: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<CategoryRemoval>> {
    ensure_admin(admin)?;
    let txn = state.orm.begin().await?;

    let Some(category) = Categories::find_by_id(id).one(&txn).await? else {
        return Ok(ApiResponse::success(
            "Nothing to delete",
            CategoryRemoval { reassigned: 0 },
            Some(Meta::empty()),
        ));
    };

    let affected: Vec<Uuid> = Souvenirs::find()
        .filter(SouvenirCol::Category.eq(category.name.as_str()))
        .all(&txn)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();

    let mut created_fallback = None;
    if !affected.is_empty() {
        if find_by_key(&txn, FALLBACK_CATEGORY).await?.is_none() {
            let inserted = CategoryActive {
                id: Set(Uuid::new_v4()),
                name: Set(FALLBACK_CATEGORY.to_string()),
                name_key: Set(name_key(FALLBACK_CATEGORY)),
            }
            .insert(&txn)
            .await?;
            created_fallback = Some(inserted.id);
        }

        Souvenirs::update_many()
            .col_expr(SouvenirCol::Category, Expr::value(FALLBACK_CATEGORY))
            .filter(SouvenirCol::Id.is_in(affected.clone()))
            .exec(&txn)
            .await?;
    }

    Categories::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    if let Some(fallback_id) = created_fallback {
        state
            .events
            .notify(Collection::Categories, ChangeAction::Created, vec![fallback_id]);
    }
    if !affected.is_empty() {
        state
            .events
            .notify(Collection::Souvenirs, ChangeAction::Updated, affected.clone());
    }
    state
        .events
        .notify(Collection::Categories, ChangeAction::Deleted, vec![id]);
    audit::record(
        &state.orm,
        Some(admin.user_id),
        "category_delete",
        "categories",
        serde_json::json!({ "category_id": id, "reassigned": affected.len() }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category deleted",
        CategoryRemoval {
            reassigned: affected.len() as u64,
        },
        Some(Meta::empty()),
    ))
}

fn existing_category(model: CategoryModel) -> ApiResponse<Category> {
    ApiResponse::success(
        "Category exists",
        category_from_entity(model),
        Some(Meta::empty()),
    )
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_key_ignores_case_and_padding() {
        assert_eq!(name_key("  Home Decor "), "home decor");
        assert_eq!(name_key("KENTE"), name_key("kente"));
    }
}

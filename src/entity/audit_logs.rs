use sea_orm::entity::prelude::*;

/// Append-only trail of admin and account actions.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// `None` for anonymous actions such as self-registration.
    #[sea_orm(indexed)]
    pub actor_id: Option<Uuid>,
    pub action: String,
    /// Collection the action touched, e.g. `souvenirs`.
    pub collection: String,
    pub details: Json,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

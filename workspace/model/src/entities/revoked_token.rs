use sea_orm::entity::prelude::*;

/// Revocation record for a rotated refresh token.
///
/// Each refresh token carries a unique `jti`; once the token is used, its
/// jti is inserted here inside the same transaction that issues the
/// replacement. The unique constraint makes the check-and-revoke atomic:
/// a replayed token hits a duplicate insert and is rejected.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "revoked_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub jti: String,
    pub user_id: i32,
    /// Expiry of the revoked token; rows past this moment can be pruned.
    pub expires_at: DateTimeUtc,
    pub revoked_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

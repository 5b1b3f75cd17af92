use sea_orm::entity::prelude::*;
use sea_orm::QueryFilter;
use serde::{Deserialize, Serialize};

/// Role of a platform user. Stored as a lowercase string in the database
/// and carried verbatim inside JWT claims.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[sea_orm(string_value = "student")]
    Student,
    #[sea_orm(string_value = "teacher")]
    Teacher,
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// A platform user. Email is the login key; username is a separate unique
/// display handle. The password is stored as an argon2 PHC string only.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: String,
    pub role: UserRole,
    /// Optional contact number, unique when present.
    #[sea_orm(unique)]
    pub phone_number: Option<String>,
    pub password_hash: String,
    /// Inactive users cannot log in or refresh their tokens.
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Admin accounts must carry consistent staff/superuser flags.
    pub fn flags_consistent(&self) -> bool {
        match self.role {
            UserRole::Admin => self.is_staff && self.is_superuser,
            UserRole::Student | UserRole::Teacher => !self.is_superuser,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Courses taught by this user (when role is teacher).
    #[sea_orm(has_many = "super::course::Entity")]
    Course,
    #[sea_orm(has_many = "super::revoked_token::Entity")]
    RevokedToken,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Entity {
    pub fn find_by_email(email: &str) -> Select<Entity> {
        Entity::find().filter(Column::Email.eq(email))
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user_with(role: UserRole, is_staff: bool, is_superuser: bool) -> Model {
        Model {
            id: 1,
            email: "u@example.com".to_string(),
            username: "u".to_string(),
            role,
            phone_number: None,
            password_hash: "$argon2id$test".to_string(),
            is_active: true,
            is_staff,
            is_superuser,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn admins_need_both_staff_and_superuser_flags() {
        assert!(user_with(UserRole::Admin, true, true).flags_consistent());
        assert!(!user_with(UserRole::Admin, true, false).flags_consistent());
        assert!(!user_with(UserRole::Admin, false, true).flags_consistent());
    }

    #[test]
    fn regular_roles_must_not_be_superusers() {
        assert!(user_with(UserRole::Student, false, false).flags_consistent());
        assert!(user_with(UserRole::Teacher, true, false).flags_consistent());
        assert!(!user_with(UserRole::Teacher, false, true).flags_consistent());
    }
}

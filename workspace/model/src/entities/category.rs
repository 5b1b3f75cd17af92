use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder};

/// A course category. The slug is derived from the title the first time the
/// row is saved without one and is never re-derived afterwards, so links
/// built on it stay stable across title edits.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::course::Entity")]
    Course,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Entity {
    /// Explicit visibility filter, ordered by title.
    pub fn find_filtered(include_inactive: bool) -> Select<Entity> {
        let select = if include_inactive {
            Entity::find()
        } else {
            Entity::find().filter(Column::IsActive.eq(true))
        };
        select.order_by_asc(Column::Title)
    }
}

/// Turn a title into a URL-safe slug: lowercase, alphanumeric runs joined
/// by single hyphens.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            for lc in c.to_lowercase() {
                slug.push(lc);
            }
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    /// Fill in a missing slug from the title on first save. An existing
    /// slug is left untouched even when the title changes.
    async fn before_save<C>(mut self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let slug_missing = match &self.slug {
            ActiveValue::NotSet => true,
            ActiveValue::Set(s) | ActiveValue::Unchanged(s) => s.is_empty(),
        };
        if slug_missing {
            if let Some(title) = self.title.try_as_ref() {
                self.slug = ActiveValue::Set(slugify(title));
            }
        }
        Ok(self)
    }
}

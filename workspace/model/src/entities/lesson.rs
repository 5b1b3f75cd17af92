use sea_orm::entity::prelude::*;
use sea_orm::{QueryFilter, QueryOrder};

/// A lesson inside a course. Always addressed through its parent course;
/// deleted together with it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "lessons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub course_id: i32,
    pub title: String,
    pub content: String,
    /// Display position within the course, ascending.
    #[sea_orm(column_name = "order")]
    pub order: i32,
    /// Preview lessons are visible without enrollment.
    pub is_preview: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Entity {
    /// All queries are scoped to the course taken from the request path.
    pub fn find_in_course(course_id: i32) -> Select<Entity> {
        Entity::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::Order)
    }
}

impl ActiveModelBehavior for ActiveModel {}

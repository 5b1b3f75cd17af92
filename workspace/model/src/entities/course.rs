use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

/// Difficulty level of a course.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    #[sea_orm(string_value = "beginner")]
    Beginner,
    #[sea_orm(string_value = "intermediate")]
    Intermediate,
    #[sea_orm(string_value = "advanced")]
    Advanced,
}

/// Whether a course is free or paid. Tied to the price invariant below.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum CourseType {
    #[sea_orm(string_value = "free")]
    Free,
    #[sea_orm(string_value = "paid")]
    Paid,
}

/// A course in the catalog.
///
/// Belongs to a category and an instructor (a user with the teacher role);
/// both references are delete-protected. Titles are unique per instructor.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub description: String,
    /// Price in the platform's default currency. Must be 0 for free
    /// courses and strictly positive for paid ones.
    pub price: Decimal,
    pub level: CourseLevel,
    #[sea_orm(column_name = "type")]
    pub course_type: CourseType,
    /// Ordered list of tag strings, stored as a JSON array.
    pub tags: Json,
    pub prerequisites: Option<String>,
    pub syllabus: Option<String>,
    /// Approximate total duration in hours.
    pub duration: i32,
    /// Unpublished courses stay hidden from the default listing.
    pub is_active: bool,
    pub category_id: i32,
    pub instructor_id: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Tags as a plain list; non-array stored values collapse to empty.
    pub fn tag_list(&self) -> Vec<String> {
        serde_json::from_value(self.tags.clone()).unwrap_or_default()
    }
}

/// Business rule shared by every write path: free courses cost nothing,
/// paid courses cost something.
pub fn validate_pricing(course_type: CourseType, price: Decimal) -> Result<(), String> {
    match course_type {
        CourseType::Free if price > Decimal::ZERO => {
            Err("Free courses must have price = 0.".to_string())
        }
        CourseType::Paid if price <= Decimal::ZERO => {
            Err("Paid courses must have a positive price.".to_string())
        }
        _ => Ok(()),
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::InstructorId",
        to = "super::user::Column::Id"
    )]
    Instructor,
    /// Lessons are owned by the course and removed with it.
    #[sea_orm(has_many = "super::lesson::Entity")]
    Lesson,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Instructor.def()
    }
}

impl Related<super::lesson::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lesson.def()
    }
}

impl Entity {
    /// Explicit visibility filter, newest first. Callers opt in to seeing
    /// unpublished courses rather than relying on an implicit manager.
    pub fn find_filtered(include_inactive: bool) -> Select<Entity> {
        let select = if include_inactive {
            Entity::find()
        } else {
            Entity::find().filter(Column::IsActive.eq(true))
        };
        select.order_by_desc(Column::CreatedAt)
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    /// Last line of defense for the pricing invariant. Handlers validate
    /// the same rule beforehand to produce field-scoped errors.
    async fn before_save<C>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if let (Some(course_type), Some(price)) =
            (self.course_type.try_as_ref(), self.price.try_as_ref())
        {
            validate_pricing(*course_type, *price)
                .map_err(|msg| DbErr::Custom(format!("course pricing: {msg}")))?;
        }
        Ok(self)
    }
}

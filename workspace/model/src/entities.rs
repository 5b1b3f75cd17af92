//! Root for all SeaORM entity modules of the course platform.
//!
//! The data model follows the platform's domain rules rather than raw
//! persistence concerns: delete protection and cascades are declared in the
//! migrations and asserted by the integration test below, and the course
//! pricing invariant lives next to the entity it guards.

pub mod category;
pub mod course;
pub mod lesson;
pub mod revoked_token;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::category::Entity as Category;
    pub use super::course::Entity as Course;
    pub use super::lesson::Entity as Lesson;
    pub use super::revoked_token::Entity as RevokedToken;
    pub use super::user::Entity as User;
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait,
        PaginatorTrait, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys so cascade/restrict behavior is exercised
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    async fn insert_teacher(db: &DatabaseConnection, email: &str) -> Result<user::Model, DbErr> {
        user::ActiveModel {
            email: Set(email.to_string()),
            username: Set(email.split('@').next().unwrap().to_string()),
            role: Set(user::UserRole::Teacher),
            phone_number: Set(None),
            password_hash: Set("$argon2id$test".to_string()),
            is_active: Set(true),
            is_staff: Set(false),
            is_superuser: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    async fn insert_category(db: &DatabaseConnection, title: &str) -> Result<category::Model, DbErr> {
        category::ActiveModel {
            title: Set(title.to_string()),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    async fn insert_course(
        db: &DatabaseConnection,
        title: &str,
        category_id: i32,
        instructor_id: i32,
    ) -> Result<course::Model, DbErr> {
        course::ActiveModel {
            title: Set(title.to_string()),
            description: Set("A course".to_string()),
            price: Set(Decimal::ZERO),
            level: Set(course::CourseLevel::Beginner),
            course_type: Set(course::CourseType::Free),
            tags: Set(serde_json::json!(["rust"])),
            prerequisites: Set(None),
            syllabus: Set(None),
            duration: Set(10),
            is_active: Set(true),
            category_id: Set(category_id),
            instructor_id: Set(instructor_id),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    #[tokio::test]
    async fn category_slug_is_generated_once_and_stays_stable() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let cat = insert_category(&db, "Web Development").await?;
        assert_eq!(cat.slug, "web-development");

        // Renaming the category must not re-derive the slug
        let mut active: category::ActiveModel = cat.into();
        active.title = Set("Frontend Development".to_string());
        let renamed = active.update(&db).await?;
        assert_eq!(renamed.title, "Frontend Development");
        assert_eq!(renamed.slug, "web-development");

        Ok(())
    }

    #[tokio::test]
    async fn pricing_invariant_is_enforced_at_the_model_layer() -> Result<(), DbErr> {
        let db = setup_db().await?;
        let teacher = insert_teacher(&db, "teacher@example.com").await?;
        let cat = insert_category(&db, "Programming").await?;

        let result = course::ActiveModel {
            title: Set("Bad pricing".to_string()),
            description: Set("Free but priced".to_string()),
            price: Set(Decimal::new(1000, 2)),
            level: Set(course::CourseLevel::Beginner),
            course_type: Set(course::CourseType::Free),
            tags: Set(serde_json::json!([])),
            prerequisites: Set(None),
            syllabus: Set(None),
            duration: Set(0),
            is_active: Set(true),
            category_id: Set(cat.id),
            instructor_id: Set(teacher.id),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await;

        assert!(matches!(result, Err(DbErr::Custom(_))));
        Ok(())
    }

    #[tokio::test]
    async fn deleting_a_course_cascades_to_its_lessons() -> Result<(), DbErr> {
        let db = setup_db().await?;
        let teacher = insert_teacher(&db, "teacher@example.com").await?;
        let cat = insert_category(&db, "Programming").await?;
        let crs = insert_course(&db, "Rust 101", cat.id, teacher.id).await?;

        lesson::ActiveModel {
            course_id: Set(crs.id),
            title: Set("Intro".to_string()),
            content: Set("Welcome".to_string()),
            order: Set(1),
            is_preview: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        Course::delete_by_id(crs.id).exec(&db).await?;

        let remaining = Lesson::find().count(&db).await?;
        assert_eq!(remaining, 0);
        Ok(())
    }

    #[tokio::test]
    async fn referenced_category_and_instructor_are_delete_protected() -> Result<(), DbErr> {
        let db = setup_db().await?;
        let teacher = insert_teacher(&db, "teacher@example.com").await?;
        let cat = insert_category(&db, "Programming").await?;
        insert_course(&db, "Rust 101", cat.id, teacher.id).await?;

        assert!(Category::delete_by_id(cat.id).exec(&db).await.is_err());
        assert!(User::delete_by_id(teacher.id).exec(&db).await.is_err());

        // Both rows are still present
        assert_eq!(Category::find().count(&db).await?, 1);
        assert_eq!(User::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn course_titles_are_unique_per_instructor() -> Result<(), DbErr> {
        let db = setup_db().await?;
        let teacher = insert_teacher(&db, "teacher@example.com").await?;
        let other = insert_teacher(&db, "other@example.com").await?;
        let cat = insert_category(&db, "Programming").await?;

        insert_course(&db, "Rust 101", cat.id, teacher.id).await?;

        // Same title, same instructor: rejected
        assert!(insert_course(&db, "Rust 101", cat.id, teacher.id).await.is_err());

        // Same title, different instructor: fine
        insert_course(&db, "Rust 101", cat.id, other.id).await?;
        Ok(())
    }
}

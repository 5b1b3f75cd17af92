#[cfg(test)]
pub mod test_utils {
    use crate::auth::jwt::create_access_token;
    use crate::auth::password::hash_password;
    use crate::config::AuthConfig;
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use chrono::Utc;
    use migration::{Migrator, MigratorTrait};
    use model::entities::{category, course, user};
    use rust_decimal::Decimal;
    use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set};
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // SQLite does not enforce foreign keys unless asked to
        db.execute_unprepared("PRAGMA foreign_keys = ON;")
            .await
            .expect("Failed to enable foreign keys");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Fixed auth configuration so tests can mint their own tokens
    pub fn test_auth_config() -> AuthConfig {
        AuthConfig {
            secret: "test-secret-not-for-production".to_string(),
            access_lifetime_minutes: 15,
            refresh_lifetime_days: 7,
        }
    }

    /// Create AppState for testing
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;
        AppState {
            db,
            auth: test_auth_config(),
        }
    }

    pub const TEST_PASSWORD: &str = "correct-horse-battery";

    /// Insert a user with the given role, password [`TEST_PASSWORD`]
    pub async fn seed_user(
        db: &DatabaseConnection,
        email: &str,
        username: &str,
        role: user::UserRole,
    ) -> user::Model {
        let is_admin = role == user::UserRole::Admin;
        let model = user::ActiveModel {
            email: Set(email.to_string()),
            username: Set(username.to_string()),
            role: Set(role),
            phone_number: Set(None),
            password_hash: Set(hash_password(TEST_PASSWORD).expect("Failed to hash password")),
            is_active: Set(true),
            is_staff: Set(is_admin),
            is_superuser: Set(is_admin),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        model.insert(db).await.expect("Failed to seed user")
    }

    pub async fn seed_category(db: &DatabaseConnection, title: &str) -> category::Model {
        let model = category::ActiveModel {
            title: Set(title.to_string()),
            slug: Set(String::new()),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        model.insert(db).await.expect("Failed to seed category")
    }

    /// Insert an unpublished free course owned by the given instructor
    pub async fn seed_course(
        db: &DatabaseConnection,
        title: &str,
        category_id: i32,
        instructor_id: i32,
    ) -> course::Model {
        let model = course::ActiveModel {
            title: Set(title.to_string()),
            description: Set("A course for testing".to_string()),
            price: Set(Decimal::ZERO),
            level: Set(course::CourseLevel::Beginner),
            course_type: Set(course::CourseType::Free),
            tags: Set(serde_json::json!(["testing"])),
            prerequisites: Set(None),
            syllabus: Set(None),
            duration: Set(10),
            is_active: Set(false),
            category_id: Set(category_id),
            instructor_id: Set(instructor_id),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        model.insert(db).await.expect("Failed to seed course")
    }

    /// Mint a bearer header value for the given user
    pub fn bearer_for(user: &user::Model) -> String {
        let token = create_access_token(user, &test_auth_config())
            .expect("Failed to create access token");
        format!("Bearer {}", token)
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// Installs a global subscriber so it stays active for the whole test
    /// run; only the first caller wins, later calls are no-ops. The log
    /// level comes from RUST_LOG, defaulting to WARN.
    fn init_test_tracing() {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    /// Create axum app for testing, together with its state so tests can
    /// seed data and mint tokens against the same database
    pub async fn setup_test_app() -> (Router, AppState) {
        init_test_tracing();

        let state = setup_test_app_state().await;
        let router = create_router(state.clone());
        (router, state)
    }
}

use anyhow::{bail, Result};
use chrono::Utc;
use model::entities::user;
use sea_orm::{ActiveModelTrait, Database, EntityTrait, Set};
use tracing::{debug, error, info, trace};

use crate::auth::password::{hash_password, validate_password_strength};

pub async fn create_admin(
    email: &str,
    username: &str,
    password: &str,
    database_url: &str,
) -> Result<()> {
    trace!("Entering create_admin function");
    info!("Creating administrator account for {}", email);

    let strength_errors = validate_password_strength(password, email, username);
    if !strength_errors.is_empty() {
        for message in &strength_errors {
            error!("Password rejected: {}", message);
        }
        bail!("password does not meet the strength requirements");
    }

    trace!("Attempting to connect to database");
    let db = Database::connect(database_url).await?;
    debug!("Database connection established");

    if user::Entity::find_by_email(email).one(&db).await?.is_some() {
        bail!("a user with email '{}' already exists", email);
    }

    let password_hash = hash_password(password)?;

    let admin = user::ActiveModel {
        email: Set(email.to_string()),
        username: Set(username.to_string()),
        role: Set(user::UserRole::Admin),
        phone_number: Set(None),
        password_hash: Set(password_hash),
        is_active: Set(true),
        is_staff: Set(true),
        is_superuser: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let created = admin.insert(&db).await?;
    info!("Administrator account created with id {}", created.id);

    Ok(())
}

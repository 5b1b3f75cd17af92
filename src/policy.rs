//! Authorization policy: who may read or write which catalog resource.
//!
//! This is a pure decision function over closed enums, kept apart from the
//! handlers so the whole rule table is visible (and testable) in one place.
//!
//! Course rules, evaluated in order:
//! 1. Reads are open to everyone, anonymous included.
//! 2. Creation requires an authenticated teacher or admin.
//! 3. Writes on an existing course require admin, or the teacher who
//!    instructs that course.
//!
//! Category reads are restricted to admins.

use model::entities::{course, user::UserRole};
use thiserror::Error;

use crate::auth::CurrentUser;

/// HTTP-style verb class. Safe operations never mutate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Write,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// No valid identity on an operation that requires one (401).
    #[error("authentication required")]
    Unauthenticated,
    /// Authenticated but not allowed (403). Deliberately generic so a
    /// denied write does not reveal more about the resource than a read
    /// would.
    #[error("you do not have permission to perform this action")]
    Forbidden,
}

/// Decide a course operation. `target` is `None` for list/create.
pub fn authorize_course(
    actor: Option<&CurrentUser>,
    action: Action,
    target: Option<&course::Model>,
) -> Result<(), PolicyError> {
    if action == Action::Read {
        return Ok(());
    }

    let actor = actor.ok_or(PolicyError::Unauthenticated)?;

    match target {
        // Create (or any write without a concrete instance): any teacher
        // or admin may proceed.
        None => match actor.role {
            UserRole::Teacher | UserRole::Admin => Ok(()),
            UserRole::Student => Err(PolicyError::Forbidden),
        },
        // Instance writes: admins unconditionally, teachers only on
        // courses they instruct.
        Some(course) => match actor.role {
            UserRole::Admin => Ok(()),
            UserRole::Teacher if course.instructor_id == actor.id => Ok(()),
            UserRole::Teacher | UserRole::Student => Err(PolicyError::Forbidden),
        },
    }
}

/// Category reads require an authenticated admin.
pub fn authorize_category_read(actor: &CurrentUser) -> Result<(), PolicyError> {
    match actor.role {
        UserRole::Admin => Ok(()),
        UserRole::Teacher | UserRole::Student => Err(PolicyError::Forbidden),
    }
}

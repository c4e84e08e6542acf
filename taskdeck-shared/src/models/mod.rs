/// Database models for TaskDeck
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: Accounts created from Google OAuth identities
/// - `session`: Server-side session records backing the auth cookie
/// - `task`: The task collection, always scoped to its owning user

pub mod session;
pub mod task;
pub mod user;

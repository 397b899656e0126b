//! Registering users and opening sessions for them.
//!
//! Credential checks belong to whichever authenticator the user's
//! [`AuthKind`] names; by the time a session is opened here the caller has
//! already vouched for the user.

use crate::error::{EngineError, Result, ValidationError};
use crate::models::{AuthKind, User};
use crate::session::Session;
use crate::store::FinanceStore;

pub fn register_user(store: &impl FinanceStore, username: &str, auth: AuthKind) -> Result<User> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ValidationError::EmptyUsername.into());
    }
    if store.get_user_by_name(username)?.is_some() {
        return Err(ValidationError::UsernameTaken(username.to_string()).into());
    }

    let mut user = User::new(username, auth);
    let id = store.insert_user(&user)?;
    user.id = Some(id);
    tracing::info!(user_id = id, username, auth = user.auth.tag(), "user registered");
    Ok(user)
}

/// Open a session for an existing user.
pub fn sign_in(store: &impl FinanceStore, username: &str) -> Result<Session> {
    let user = store
        .get_user_by_name(username)?
        .ok_or_else(|| EngineError::UnknownUser(username.trim().to_string()))?;
    Session::create(user)
}

/// Open a session, registering a password user first if the name is new.
pub fn sign_in_or_register(store: &impl FinanceStore, username: &str) -> Result<Session> {
    match sign_in(store, username) {
        Err(EngineError::UnknownUser(_)) => {
            Session::create(register_user(store, username, AuthKind::Password)?)
        }
        other => other,
    }
}

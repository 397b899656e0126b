//! Explicit session context.
//!
//! A [`Session`] is created for a signed-in user and handed to every engine
//! operation that needs to know whose data it is working on. Nothing about
//! the current user lives in global state.

use crate::error::{EngineError, Result};
use crate::models::User;

#[derive(Debug, Clone)]
pub struct Session {
    user: User,
    user_id: i64,
    active: bool,
}

impl Session {
    /// Start a session for a persisted user. Users without an id have not
    /// been saved yet and cannot own data.
    pub fn create(user: User) -> Result<Self> {
        let user_id = user.id.ok_or(EngineError::SessionInvalidated)?;
        tracing::debug!(user_id, username = %user.username, auth = user.auth.tag(), "session created");
        Ok(Self {
            user,
            user_id,
            active: true,
        })
    }

    pub fn invalidate(&mut self) {
        if self.active {
            tracing::debug!(user_id = self.user_id, "session invalidated");
        }
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Id of the signed-in user, or [`EngineError::SessionInvalidated`].
    pub fn user_id(&self) -> Result<i64> {
        if self.active {
            Ok(self.user_id)
        } else {
            Err(EngineError::SessionInvalidated)
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

const HASH_COST: u32 = 4;

#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AddUserError {
    AlreadyExists,
}

/// Accounts keyed by username, with bcrypt-hashed passwords.
#[derive(Clone, Default)]
pub struct UserStore {
    users: Arc<Mutex<HashMap<String, User>>>,
}

pub(crate) fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, HASH_COST)
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(
        &self,
        id: String,
        username: String,
        password_hashed: String,
    ) -> Result<(), AddUserError> {
        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        if users.contains_key(&username) {
            return Err(AddUserError::AlreadyExists);
        }
        users.insert(
            username.clone(),
            User {
                id,
                username,
                password: password_hashed,
            },
        );
        Ok(())
    }

    pub fn get_user(&self, username: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(username)
            .cloned()
    }
}

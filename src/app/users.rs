use anyhow::{anyhow, Result};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::user::{AuthSession, User, UserRole};
use crate::infra::store::{keys, Store};

/// The only credentials that log in. This is a login simulation, not
/// authentication.
const CREDENTIALS: [(&str, &str, &str, UserRole); 2] = [
    ("admin", "admin1234", "admin@quill.local", UserRole::Admin),
    ("demo", "demo1234", "demo@quill.local", UserRole::User),
];

#[derive(Clone)]
pub struct UserService {
    store: Store,
}

impl UserService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Check the pair against the hard-coded table; on a match, upsert the
    /// user record and stash the current-user blob and a fake token.
    /// A wrong pair is `Ok(None)`, not an error.
    pub async fn login(&self, username: &str, password: &str) -> Result<Option<AuthSession>> {
        self.store.lag().await;

        let Some(&(name, _, email, role)) = CREDENTIALS
            .iter()
            .find(|entry| entry.0 == username && entry.1 == password)
        else {
            tracing::info!(username, "login rejected");
            return Ok(None);
        };

        let user = self.upsert(name, email, role)?;
        let session = self.open_session(user)?;
        tracing::info!(username, "login accepted");
        Ok(Some(session))
    }

    /// Create a user record and log it in. No password is stored anywhere;
    /// the rules below are form validation, not security.
    pub async fn signup(&self, username: &str, email: &str, password: &str) -> Result<AuthSession> {
        self.store.lag().await;

        let username = username.trim();
        if username.len() < 3 {
            return Err(anyhow!("username must be at least 3 characters"));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(anyhow!("username must be alphanumeric"));
        }
        if !email.contains('@') {
            return Err(anyhow!("invalid email"));
        }
        if password.len() < 8 {
            return Err(anyhow!("password must be at least 8 characters"));
        }

        let mut users: Vec<User> = self.store.get_or(keys::USERS, Vec::new);
        if users
            .iter()
            .any(|u| u.username.eq_ignore_ascii_case(username))
        {
            return Err(anyhow!("username already taken"));
        }

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            role: UserRole::User,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        self.store.put(keys::USERS, &users)?;
        tracing::info!(username, "user signed up");

        self.open_session(user)
    }

    pub async fn logout(&self) -> Result<()> {
        self.store.lag().await;
        self.store.remove_item(keys::CURRENT_USER);
        self.store.remove_item(keys::AUTH_TOKEN);
        Ok(())
    }

    pub fn current_user(&self) -> Option<User> {
        self.store.get(keys::CURRENT_USER)
    }

    pub fn session(&self) -> Option<AuthSession> {
        let user = self.current_user()?;
        let token: String = self.store.get(keys::AUTH_TOKEN)?;
        Some(AuthSession { user, token })
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        self.store.lag().await;
        let users: Vec<User> = self.store.get_or(keys::USERS, Vec::new);
        Ok(users.into_iter().find(|u| u.id == user_id))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        self.store.lag().await;
        let users: Vec<User> = self.store.get_or(keys::USERS, Vec::new);
        Ok(users
            .into_iter()
            .find(|u| u.username.eq_ignore_ascii_case(username)))
    }

    pub async fn update_email(&self, user_id: Uuid, email: &str) -> Result<Option<User>> {
        self.store.lag().await;
        if !email.contains('@') {
            return Err(anyhow!("invalid email"));
        }
        let mut users: Vec<User> = self.store.get_or(keys::USERS, Vec::new);
        let Some(user) = users.iter_mut().find(|u| u.id == user_id) else {
            return Ok(None);
        };
        user.email = email.to_string();
        user.updated_at = OffsetDateTime::now_utc();
        let updated = user.clone();
        self.store.put(keys::USERS, &users)?;

        // Keep the current-user blob in step when it is the same account.
        if let Some(current) = self.current_user() {
            if current.id == user_id {
                self.store.put(keys::CURRENT_USER, &updated)?;
            }
        }
        Ok(Some(updated))
    }

    fn upsert(&self, username: &str, email: &str, role: UserRole) -> Result<User> {
        let mut users: Vec<User> = self.store.get_or(keys::USERS, Vec::new);
        if let Some(user) = users.iter_mut().find(|u| u.username == username) {
            user.role = role;
            user.updated_at = OffsetDateTime::now_utc();
            let user = user.clone();
            self.store.put(keys::USERS, &users)?;
            return Ok(user);
        }

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            role,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        self.store.put(keys::USERS, &users)?;
        Ok(user)
    }

    fn open_session(&self, user: User) -> Result<AuthSession> {
        let token = Uuid::new_v4().to_string();
        self.store.put(keys::CURRENT_USER, &user)?;
        self.store.put(keys::AUTH_TOKEN, &token)?;
        Ok(AuthSession { user, token })
    }
}

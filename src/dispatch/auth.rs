//! Request authenticity and permission gate.
//!
//! The host platform owns token issuance and user permissions; the dispatcher
//! only asks the two yes/no questions of [`RequestAuthority`]. The
//! [`MemoryAuthority`] implementation backs the bundled server and the tests.

use crate::core::Kind;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait RequestAuthority: Send + Sync {
    /// Whether `token` was issued for `action` and is still valid.
    async fn verify_token(&self, action: &str, token: &str) -> bool;

    /// Whether `user` may manage terms of `kind`.
    async fn can_manage(&self, user: &str, kind: Kind) -> bool;
}

/// User permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ManageCategories,
    ManageTags,
    ManageRibbons,
    /// Administrative privileges
    Admin,
}

impl Permission {
    pub fn manage(kind: Kind) -> Self {
        match kind {
            Kind::Category => Permission::ManageCategories,
            Kind::Tag => Permission::ManageTags,
            Kind::Ribbon => Permission::ManageRibbons,
        }
    }
}

/// User account
#[derive(Debug, Clone)]
pub struct User {
    username: String,
    permissions: Vec<Permission>,
}

impl User {
    pub fn new(username: impl Into<String>, permissions: Vec<Permission>) -> Self {
        Self {
            username: username.into(),
            permissions,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    /// Checks if user has a specific permission
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&Permission::Admin) || self.permissions.contains(&permission)
    }
}

/// In-memory users and issued action tokens.
///
/// Tokens stay valid until revoked and may be presented more than once,
/// matching how the host platform treats its request nonces.
pub struct MemoryAuthority {
    users: RwLock<HashMap<String, User>>,
    tokens: RwLock<HashMap<String, String>>,
}

impl MemoryAuthority {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Creates an authority with one administrator
    pub fn with_admin(username: &str) -> Self {
        let mut users = HashMap::new();
        users.insert(
            username.to_string(),
            User::new(username, vec![Permission::Admin]),
        );
        Self {
            users: RwLock::new(users),
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Adds or replaces a user
    pub async fn add_user(&self, user: User) {
        let mut users = self.users.write().await;
        users.insert(user.username().to_string(), user);
    }

    pub async fn remove_user(&self, username: &str) -> bool {
        let mut users = self.users.write().await;
        users.remove(username).is_some()
    }

    /// Issues a token bound to `action`.
    pub async fn issue_token(&self, action: &str) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let mut tokens = self.tokens.write().await;
        tokens.insert(token.clone(), action.to_string());
        token
    }

    pub async fn revoke_token(&self, token: &str) -> bool {
        let mut tokens = self.tokens.write().await;
        tokens.remove(token).is_some()
    }
}

impl Default for MemoryAuthority {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RequestAuthority for MemoryAuthority {
    async fn verify_token(&self, action: &str, token: &str) -> bool {
        let token = token.trim();
        if token.is_empty() {
            return false;
        }
        let tokens = self.tokens.read().await;
        tokens.get(token).is_some_and(|bound| bound == action)
    }

    async fn can_manage(&self, user: &str, kind: Kind) -> bool {
        let users = self.users.read().await;
        users
            .get(user)
            .is_some_and(|user| user.has_permission(Permission::manage(kind)))
    }
}

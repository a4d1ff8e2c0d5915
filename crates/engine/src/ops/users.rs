use base64::Engine as _;
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    ADMIN_ROLE, EngineError, ResultEngine, Role, USER_ROLE, User, roles, sessions, users,
};

use super::{Engine, normalize_optional_text, with_tx};

/// Input for creating a user.
#[derive(Clone, Debug, Default)]
pub struct NewUser {
    pub username: String,
    pub display_name: String,
    pub email: Option<String>,
    pub admin: bool,
}

fn normalize_username(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(
            "username must not be empty".to_string(),
        ));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(EngineError::InvalidInput(
            "username must not contain spaces".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// 32 random bytes (two v4 UUIDs), URL-safe base64 without padding.
fn new_session_token() -> String {
    let mut bytes = [0u8; 32];
    bytes[..16].copy_from_slice(Uuid::new_v4().as_bytes());
    bytes[16..].copy_from_slice(Uuid::new_v4().as_bytes());
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

impl Engine {
    async fn role_by_name(
        &self,
        db: &DatabaseTransaction,
        name: &str,
    ) -> ResultEngine<roles::Model> {
        roles::Entity::find()
            .filter(roles::Column::Name.eq(name.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("role {name} not exists")))
    }

    async fn load_user(&self, db: &DatabaseTransaction, username: &str) -> ResultEngine<User> {
        let (model, role) = users::Entity::find_by_id(username.to_string())
            .find_also_related(roles::Entity)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        Ok(User::from((model, role)))
    }

    async fn require_admin(&self, db: &DatabaseTransaction, username: &str) -> ResultEngine<()> {
        if !self.load_user(db, username).await?.is_admin() {
            return Err(EngineError::Forbidden(
                "admin role required".to_string(),
            ));
        }
        Ok(())
    }

    async fn insert_user(&self, db: &DatabaseTransaction, input: NewUser) -> ResultEngine<User> {
        let username = normalize_username(&input.username)?;
        let display_name = normalize_optional_text(Some(&input.display_name))
            .unwrap_or_else(|| username.clone());
        let email = normalize_optional_text(input.email.as_deref());

        if users::Entity::find_by_id(username.clone())
            .one(db)
            .await?
            .is_some()
        {
            return Err(EngineError::ExistingKey(username));
        }

        let role_name = if input.admin { ADMIN_ROLE } else { USER_ROLE };
        let role = self.role_by_name(db, role_name).await?;

        let model = users::ActiveModel {
            username: ActiveValue::Set(username.clone()),
            display_name: ActiveValue::Set(display_name),
            email: ActiveValue::Set(email),
            role_id: ActiveValue::Set(Some(role.id)),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(db)
        .await?;

        tracing::info!(username = %username, role = role_name, "user created");
        Ok(User::from((model, Some(role))))
    }

    /// Create a user without an acting caller. Used by the admin CLI to
    /// bootstrap the first accounts.
    pub async fn bootstrap_user(&self, input: NewUser) -> ResultEngine<User> {
        with_tx!(self, |db_tx| self.insert_user(&db_tx, input).await)
    }

    /// Create a user. Authorization: caller must hold the `admin` role.
    pub async fn create_user(&self, caller: &str, input: NewUser) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, caller).await?;
            self.insert_user(&db_tx, input).await
        })
    }

    /// List every user. Authorization: caller must hold the `admin` role.
    pub async fn list_users(&self, caller: &str) -> ResultEngine<Vec<User>> {
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, caller).await?;
            let rows = users::Entity::find()
                .find_also_related(roles::Entity)
                .order_by_asc(users::Column::Username)
                .all(&db_tx)
                .await?;
            Ok(rows.into_iter().map(User::from).collect())
        })
    }

    pub async fn user(&self, username: &str) -> ResultEngine<User> {
        with_tx!(self, |db_tx| self.load_user(&db_tx, username).await)
    }

    pub async fn roles(&self) -> ResultEngine<Vec<Role>> {
        let rows = roles::Entity::find()
            .order_by_asc(roles::Column::Name)
            .all(&self.database)
            .await?;
        Ok(rows.into_iter().map(Role::from).collect())
    }

    /// Mint a bearer token for `username`, valid for `ttl`.
    pub async fn issue_session(&self, username: &str, ttl: Duration) -> ResultEngine<String> {
        if ttl <= Duration::zero() {
            return Err(EngineError::InvalidInput(
                "session lifetime must be positive".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, username).await?;
            let now = Utc::now();
            let token = new_session_token();
            sessions::ActiveModel {
                token: ActiveValue::Set(token.clone()),
                user_id: ActiveValue::Set(username.to_string()),
                created_at: ActiveValue::Set(now),
                expires_at: ActiveValue::Set(now + ttl),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!(username, "session issued");
            Ok(token)
        })
    }

    /// Resolve a bearer token to its user. Unknown and expired tokens both
    /// report `KeyNotFound`.
    pub async fn user_for_session(&self, token: &str) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let session = sessions::Entity::find_by_id(token.to_string())
                .one(&db_tx)
                .await?
                .filter(|s| s.expires_at > Utc::now())
                .ok_or_else(|| EngineError::KeyNotFound("session not exists".to_string()))?;
            self.load_user(&db_tx, &session.user_id).await
        })
    }

    pub async fn revoke_session(&self, token: &str) -> ResultEngine<()> {
        let result = sessions::Entity::delete_by_id(token.to_string())
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("session not exists".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_tokens_are_url_safe_and_unique() {
        let a = new_session_token();
        let b = new_session_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn usernames_reject_blank_and_spaces() {
        assert_eq!(normalize_username("  alice ").unwrap(), "alice");
        assert!(normalize_username("   ").is_err());
        assert!(normalize_username("al ice").is_err());
    }
}

use chrono::Utc;
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{
    EngineError, ResultEngine, User,
    users::{self, hash_password, verify_password},
    util::normalize_required,
};

use super::{Engine, with_tx};

const MIN_PASSWORD_LEN: usize = 8;

impl Engine {
    /// Register an API user. The password is stored as an Argon2 hash.
    pub async fn new_user(&self, username: &str, password: &str) -> ResultEngine<User> {
        let username = normalize_required(username, "username")?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(EngineError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let password_hash = hash_password(password)?;

        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(username.clone())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(username));
            }
            let model = users::ActiveModel {
                username: ActiveValue::Set(username.clone()),
                password_hash: ActiveValue::Set(password_hash),
                create_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!(username = %model.username, "user created");
            Ok(User::from(model))
        })
    }

    /// Check a username/password pair.
    ///
    /// Unknown users and wrong passwords both yield `Unauthorized`.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<User> {
        let model = users::Entity::find_by_id(username.trim().to_string())
            .one(&self.database)
            .await?
            .ok_or(EngineError::Unauthorized)?;
        if !verify_password(password, &model.password_hash) {
            return Err(EngineError::Unauthorized);
        }
        Ok(User::from(model))
    }
}

//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use std::collections::BTreeSet;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Checkpoint, Email, PasswordHash, Role, User, UserId};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation,
};
use super::json_serializers::{from_json_opt, parse_label, to_json_opt};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, |message| UserPersistenceError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    if let Some(constraint) = unique_violation(&error) {
        return UserPersistenceError::duplicate(constraint);
    }
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

struct EncodedProfiles {
    landlord: Option<serde_json::Value>,
    tenant: Option<serde_json::Value>,
    subscription: Option<serde_json::Value>,
}

fn encode_profiles(user: &User) -> Result<EncodedProfiles, UserPersistenceError> {
    let encode = || -> Result<EncodedProfiles, String> {
        Ok(EncodedProfiles {
            landlord: to_json_opt(user.landlord_profile.as_ref(), "landlord_profile")?,
            tenant: to_json_opt(user.tenant_profile.as_ref(), "tenant_profile")?,
            subscription: to_json_opt(user.subscription.as_ref(), "subscription")?,
        })
    };
    encode().map_err(UserPersistenceError::query)
}

fn role_labels(user: &User) -> Vec<String> {
    user.roles.iter().map(|role| role.as_str().to_owned()).collect()
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let UserRow {
        id,
        name,
        email,
        password_hash,
        federated_id,
        image,
        roles,
        checkpoint,
        landlord_profile,
        tenant_profile,
        subscription,
        created_at,
        updated_at,
    } = row;

    let decode = || -> Result<User, String> {
        let roles = roles
            .iter()
            .map(|label| parse_label::<Role>(label, "roles"))
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(User {
            id: UserId::from_uuid(id),
            name,
            email: Email::new(&email).map_err(|err| format!("decode email: {err}"))?,
            password_hash: password_hash.map(PasswordHash::new),
            federated_id,
            image,
            roles,
            checkpoint: parse_label::<Checkpoint>(&checkpoint, "checkpoint")?,
            landlord_profile: from_json_opt(landlord_profile, "landlord_profile")?,
            tenant_profile: from_json_opt(tenant_profile, "tenant_profile")?,
            subscription: from_json_opt(subscription, "subscription")?,
            created_at,
            updated_at,
        })
    };
    decode().map_err(UserPersistenceError::query)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let profiles = encode_profiles(user)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewUserRow {
            id: *user.id.as_uuid(),
            name: &user.name,
            email: user.email.as_ref(),
            password_hash: user.password_hash.as_ref().map(PasswordHash::as_str),
            federated_id: user.federated_id.as_deref(),
            image: user.image.as_deref(),
            roles: role_labels(user),
            checkpoint: user.checkpoint.as_str(),
            landlord_profile: profiles.landlord,
            tenant_profile: profiles.tenant,
            subscription: profiles.subscription,
            created_at: user.created_at,
            updated_at: user.updated_at,
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let profiles = encode_profiles(user)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = UserChangeset {
            name: &user.name,
            email: user.email.as_ref(),
            password_hash: user.password_hash.as_ref().map(PasswordHash::as_str),
            federated_id: user.federated_id.as_deref(),
            image: user.image.as_deref(),
            roles: role_labels(user),
            checkpoint: user.checkpoint.as_str(),
            landlord_profile: profiles.landlord,
            tenant_profile: profiles.tenant,
            subscription: profiles.subscription,
            updated_at: user.updated_at,
        };

        diesel::update(users::table.filter(users::id.eq(user.id.as_uuid())))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }
}

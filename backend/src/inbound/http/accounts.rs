//! Account handlers: sign-up, sign-in and self-service profile changes.
//!
//! ```text
//! POST /api/v1/auth/register  {"name":"Asha","email":"asha@example.com","password":"secret1"}
//! POST /api/v1/auth/login     {"email":"asha@example.com","password":"secret1"}
//! POST /api/v1/auth/federated {"id_token":"<provider token>"}
//! GET  /api/v1/auth/me
//! PUT  /api/v1/auth/profile
//! PUT  /api/v1/auth/change-password
//! ```

use std::collections::BTreeSet;

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use super::ApiResult;
use super::auth::Caller;
use super::envelope;
use super::state::HttpState;
use crate::domain::ports::PasswordChange;
use crate::domain::{
    Checkpoint, CredentialsValidationError, DisplayName, Email, Error, LandlordProfile,
    LoginCredentials, Password, ProfileUpdate, Registration, Role, TenantProfile,
    UserValidationError, ViolationCode, Violations,
};

/// Body of `POST /auth/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/federated`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct FederatedRequest {
    #[serde(alias = "idToken")]
    pub id_token: String,
}

/// Body of `PUT /auth/profile`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    pub roles: Option<Vec<String>>,
    pub checkpoint: Option<Checkpoint>,
    pub landlord_profile: Option<LandlordProfile>,
    pub tenant_profile: Option<TenantProfile>,
}

/// Body of `PUT /auth/change-password`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

fn user_violation(violations: &mut Violations, field: &str, err: &UserValidationError) {
    let code = match err {
        UserValidationError::EmptyEmail => ViolationCode::MissingField,
        UserValidationError::InvalidEmail | UserValidationError::UnknownRole(_) => {
            ViolationCode::InvalidFormat
        }
        UserValidationError::NameTooShort { .. } => ViolationCode::TooShort,
        UserValidationError::NameTooLong { .. } => ViolationCode::TooLong,
    };
    violations.push(field, code, err.to_string());
}

fn credential_violation(violations: &mut Violations, field: &str, err: &CredentialsValidationError) {
    match err {
        CredentialsValidationError::Email(inner) => user_violation(violations, field, inner),
        CredentialsValidationError::EmptyPassword => {
            violations.push(field, ViolationCode::MissingField, format!("{field} is required"));
        }
        CredentialsValidationError::PasswordTooShort { min } => violations.push(
            field,
            ViolationCode::TooShort,
            format!("{field} must be at least {min} characters"),
        ),
    }
}

fn parse_roles(raw: &[String], violations: &mut Violations) -> BTreeSet<Role> {
    raw.iter()
        .enumerate()
        .filter_map(|(index, role)| match role.parse::<Role>() {
            Ok(role) => Some(role),
            Err(err) => {
                user_violation(violations, &format!("roles[{index}]"), &err);
                None
            }
        })
        .collect()
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = Error;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        let mut violations = Violations::default();
        let name = DisplayName::new(&value.name)
            .map_err(|err| user_violation(&mut violations, "name", &err))
            .ok();
        let email = Email::new(&value.email)
            .map_err(|err| user_violation(&mut violations, "email", &err))
            .ok();
        let password = Password::new_secret(&value.password)
            .map_err(|err| credential_violation(&mut violations, "password", &err))
            .ok();
        let roles = parse_roles(&value.roles, &mut violations);
        violations.finish()?;

        match (name, email, password) {
            (Some(name), Some(email), Some(password)) => Ok(Self {
                name,
                email,
                password,
                roles,
            }),
            _ => Err(Error::invalid_request("Validation failed")),
        }
    }
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = Error;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        let mut violations = Violations::default();
        if let Err(err) = Email::new(&value.email) {
            user_violation(&mut violations, "email", &err);
        }
        if value.password.is_empty() {
            credential_violation(
                &mut violations,
                "password",
                &CredentialsValidationError::EmptyPassword,
            );
        }
        violations.finish()?;
        Self::try_from_parts(&value.email, &value.password)
            .map_err(|err| Error::invalid_request(err.to_string()))
    }
}

impl TryFrom<ProfileRequest> for ProfileUpdate {
    type Error = Error;

    fn try_from(value: ProfileRequest) -> Result<Self, Self::Error> {
        let mut violations = Violations::default();
        let name = value.name.as_deref().and_then(|raw| {
            DisplayName::new(raw)
                .map_err(|err| user_violation(&mut violations, "name", &err))
                .ok()
        });
        let roles = value
            .roles
            .as_deref()
            .map(|raw| parse_roles(raw, &mut violations));
        if value
            .image
            .as_deref()
            .is_some_and(|image| url::Url::parse(image).is_err())
        {
            violations.push("image", ViolationCode::InvalidFormat, "image must be a URL");
        }
        violations.finish()?;

        Ok(Self {
            name,
            image: value.image,
            roles,
            checkpoint: value.checkpoint,
            landlord_profile: value.landlord_profile,
            tenant_profile: value.tenant_profile,
        })
    }
}

impl TryFrom<ChangePasswordRequest> for PasswordChange {
    type Error = Error;

    fn try_from(value: ChangePasswordRequest) -> Result<Self, Self::Error> {
        let mut violations = Violations::default();
        let current = Password::existing(&value.current_password)
            .map_err(|err| credential_violation(&mut violations, "current_password", &err))
            .ok();
        let replacement = Password::new_secret(&value.new_password)
            .map_err(|err| credential_violation(&mut violations, "new_password", &err))
            .ok();
        violations.finish()?;

        match (current, replacement) {
            (Some(current), Some(replacement)) => Ok(Self {
                current,
                replacement,
            }),
            _ => Err(Error::invalid_request("Validation failed")),
        }
    }
}

/// Create a local account and return a session token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Invalid request", body = super::ErrorEnvelope),
        (status = 409, description = "Email already registered", body = super::ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from(payload.into_inner())?;
    let session = state.accounts.register(registration).await?;
    Ok(envelope::created(session, "User registered successfully"))
}

/// Sign in with email and password.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in"),
        (status = 400, description = "Invalid request", body = super::ErrorEnvelope),
        (status = 401, description = "Invalid credentials", body = super::ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from(payload.into_inner())?;
    let session = state.accounts.login(&credentials).await?;
    Ok(envelope::ok_with_message(session, "Login successful"))
}

/// Exchange an identity-provider token for a session token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/federated",
    request_body = FederatedRequest,
    responses(
        (status = 200, description = "Signed in"),
        (status = 400, description = "Invalid request", body = super::ErrorEnvelope),
        (status = 401, description = "Token rejected", body = super::ErrorEnvelope),
        (status = 502, description = "Identity provider failure", body = super::ErrorEnvelope),
        (status = 503, description = "Identity provider not configured", body = super::ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "federatedSignIn",
    security([])
)]
#[post("/auth/federated")]
pub async fn federated(
    state: web::Data<HttpState>,
    payload: web::Json<FederatedRequest>,
) -> ApiResult<HttpResponse> {
    let FederatedRequest { id_token } = payload.into_inner();
    if id_token.trim().is_empty() {
        return Err(Error::invalid_request("id_token is required"));
    }
    let session = state.accounts.federated_sign_in(id_token.trim()).await?;
    Ok(envelope::ok_with_message(session, "Authentication successful"))
}

/// The caller's own record.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user"),
        (status = 401, description = "Unauthenticated", body = super::ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/auth/me")]
pub async fn me(state: web::Data<HttpState>, caller: Caller) -> ApiResult<HttpResponse> {
    let user = state.accounts.current_user(&caller).await?;
    Ok(envelope::ok(json!({ "user": user })))
}

/// Update the caller's profile.
#[utoipa::path(
    put,
    path = "/api/v1/auth/profile",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Updated user"),
        (status = 400, description = "Invalid request", body = super::ErrorEnvelope),
        (status = 401, description = "Unauthenticated", body = super::ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "updateProfile"
)]
#[put("/auth/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<HttpResponse> {
    let update = ProfileUpdate::try_from(payload.into_inner())?;
    let user = state.accounts.update_profile(&caller, update).await?;
    Ok(envelope::ok(json!({ "user": user })))
}

/// Replace the caller's password.
#[utoipa::path(
    put,
    path = "/api/v1/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Invalid request", body = super::ErrorEnvelope),
        (status = 401, description = "Unauthenticated", body = super::ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "changePassword"
)]
#[put("/auth/change-password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<HttpResponse> {
    let change = PasswordChange::try_from(payload.into_inner())?;
    state.accounts.change_password(&caller, change).await?;
    Ok(envelope::message("Password changed successfully"))
}

//! Tests for the account service.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::*;
use crate::domain::ports::{
    MockIdentityVerifier, MockPasswordHasher, MockTokenService, MockUserRepository,
    PasswordHashError, UserPersistenceError,
};
use crate::domain::{
    AccessToken, DisplayName, Email, ErrorCode, Password, PasswordHash, Role, UserId,
};
use crate::test_support::FixtureClock;

struct Collaborators {
    users: MockUserRepository,
    hasher: MockPasswordHasher,
    tokens: MockTokenService,
    verifier: MockIdentityVerifier,
}

impl Collaborators {
    fn new() -> Self {
        Self {
            users: MockUserRepository::new(),
            hasher: MockPasswordHasher::new(),
            tokens: MockTokenService::new(),
            verifier: MockIdentityVerifier::new(),
        }
    }

    fn issuing_tokens(mut self) -> Self {
        self.tokens
            .expect_issue()
            .times(1)
            .returning(|_| Ok(AccessToken::new("signed")));
        self
    }

    fn build(self) -> AccountService<MockUserRepository> {
        AccountService::new(
            Arc::new(self.users),
            Arc::new(self.hasher),
            Arc::new(self.tokens),
            Arc::new(self.verifier),
            FixtureClock::shared(),
        )
    }
}

fn email(raw: &str) -> Email {
    Email::new(raw).expect("valid email")
}

fn local_user(raw_email: &str) -> User {
    User::local(
        DisplayName::new("Asha Rao").expect("valid name"),
        email(raw_email),
        PasswordHash::new("$2b$hash"),
        BTreeSet::from([Role::Tenant]),
        FixtureClock::shared().utc(),
    )
}

fn federated_user(raw_email: &str) -> User {
    User::federated(
        "Asha".to_owned(),
        email(raw_email),
        "fb-subject".to_owned(),
        None,
        FixtureClock::shared().utc(),
    )
}

fn registration() -> Registration {
    Registration {
        name: DisplayName::new("Asha Rao").expect("valid name"),
        email: email("asha@example.com"),
        password: Password::new_secret("hunter22").expect("valid password"),
        roles: BTreeSet::from([Role::Landlord]),
    }
}

fn caller_for(user: &User) -> AuthenticatedCaller {
    AuthenticatedCaller::from(user)
}

#[tokio::test]
async fn register_hashes_password_and_issues_token() {
    let mut deps = Collaborators::new().issuing_tokens();
    deps.users
        .expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(None));
    deps.hasher
        .expect_hash()
        .times(1)
        .return_once(|_| Ok(PasswordHash::new("$2b$hashed")));
    deps.users
        .expect_insert()
        .withf(|user| {
            user.password_hash.as_ref().map(PasswordHash::as_str) == Some("$2b$hashed")
                && user.roles.contains(&Role::Landlord)
        })
        .times(1)
        .return_once(|_| Ok(()));

    let session = deps
        .build()
        .register(registration())
        .await
        .expect("registration succeeds");

    assert_eq!(session.token.as_str(), "signed");
    assert_eq!(session.user.email.as_ref(), "asha@example.com");
    assert!(session.user.federated_id.is_none());
}

#[tokio::test]
async fn register_rejects_taken_email() {
    let mut deps = Collaborators::new();
    deps.users
        .expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(Some(local_user("asha@example.com"))));
    deps.hasher.expect_hash().times(0);
    deps.users.expect_insert().times(0);

    let error = deps
        .build()
        .register(registration())
        .await
        .expect_err("duplicate email");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.message(), "User with this email already exists");
}

#[tokio::test]
async fn register_maps_insert_race_to_conflict() {
    let mut deps = Collaborators::new();
    deps.users
        .expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(None));
    deps.hasher
        .expect_hash()
        .times(1)
        .return_once(|_| Ok(PasswordHash::new("$2b$hashed")));
    deps.users
        .expect_insert()
        .times(1)
        .return_once(|_| Err(UserPersistenceError::duplicate("users_email_key")));

    let error = deps
        .build()
        .register(registration())
        .await
        .expect_err("duplicate email");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn login_accepts_matching_password() {
    let mut deps = Collaborators::new().issuing_tokens();
    deps.users
        .expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(Some(local_user("asha@example.com"))));
    deps.hasher
        .expect_verify()
        .times(1)
        .return_once(|_, _| Ok(true));

    let credentials =
        LoginCredentials::try_from_parts("Asha@Example.com", "hunter22").expect("credentials");
    let session = deps.build().login(&credentials).await.expect("login");

    assert_eq!(session.user.email.as_ref(), "asha@example.com");
}

#[tokio::test]
async fn login_failures_share_one_message() {
    let mut unknown = Collaborators::new();
    unknown
        .users
        .expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(None));

    let mut mismatch = Collaborators::new();
    mismatch
        .users
        .expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(Some(local_user("asha@example.com"))));
    mismatch
        .hasher
        .expect_verify()
        .times(1)
        .return_once(|_, _| Ok(false));

    let credentials =
        LoginCredentials::try_from_parts("asha@example.com", "wrong").expect("credentials");
    let unknown_error = unknown.build().login(&credentials).await.expect_err("unknown");
    let mismatch_error = mismatch
        .build()
        .login(&credentials)
        .await
        .expect_err("mismatch");

    assert_eq!(unknown_error.code(), ErrorCode::Unauthorized);
    assert_eq!(unknown_error.message(), mismatch_error.message());
}

#[tokio::test]
async fn login_points_federated_accounts_at_their_provider() {
    let mut deps = Collaborators::new();
    deps.users
        .expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(Some(federated_user("asha@example.com"))));
    deps.hasher.expect_verify().times(0);

    let credentials =
        LoginCredentials::try_from_parts("asha@example.com", "hunter22").expect("credentials");
    let error = deps.build().login(&credentials).await.expect_err("no password");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), FEDERATED_ONLY);
}

#[tokio::test]
async fn login_surfaces_hasher_failure_as_internal() {
    let mut deps = Collaborators::new();
    deps.users
        .expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(Some(local_user("asha@example.com"))));
    deps.hasher
        .expect_verify()
        .times(1)
        .return_once(|_, _| Err(PasswordHashError::failed("malformed hash")));

    let credentials =
        LoginCredentials::try_from_parts("asha@example.com", "hunter22").expect("credentials");
    let error = deps.build().login(&credentials).await.expect_err("hash error");

    assert_eq!(error.code(), ErrorCode::InternalError);
}

fn identity(name: Option<&str>, picture: Option<&str>) -> FederatedIdentity {
    FederatedIdentity {
        subject_id: "fb-123".to_owned(),
        email: email("new.person@example.com"),
        name: name.map(str::to_owned),
        picture: picture.map(str::to_owned),
    }
}

#[tokio::test]
async fn federated_sign_in_creates_account_named_after_email_when_unnamed() {
    let mut deps = Collaborators::new().issuing_tokens();
    deps.verifier
        .expect_verify()
        .times(1)
        .return_once(|_| Ok(identity(None, None)));
    deps.users
        .expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(None));
    deps.users
        .expect_insert()
        .withf(|user| user.password_hash.is_none() && user.roles.is_empty())
        .times(1)
        .return_once(|_| Ok(()));

    let session = deps
        .build()
        .federated_sign_in("id-token")
        .await
        .expect("sign-in");

    assert_eq!(session.user.name, "new.person");
    assert_eq!(session.user.federated_id.as_deref(), Some("fb-123"));
}

#[tokio::test]
async fn federated_sign_in_links_existing_local_account() {
    let mut deps = Collaborators::new().issuing_tokens();
    let existing = local_user("new.person@example.com");
    let existing_id = existing.id;
    deps.verifier
        .expect_verify()
        .times(1)
        .return_once(|_| Ok(identity(Some("Asha R"), Some("https://img/a.png"))));
    deps.users
        .expect_find_by_email()
        .times(1)
        .return_once(move |_| Ok(Some(existing)));
    deps.users.expect_insert().times(0);
    deps.users
        .expect_update()
        .withf(|user| {
            user.federated_id.as_deref() == Some("fb-123")
                && user.password_hash.is_some()
                && user.image.as_deref() == Some("https://img/a.png")
                && user.name == "Asha R"
        })
        .times(1)
        .return_once(|_| Ok(()));

    let session = deps
        .build()
        .federated_sign_in("id-token")
        .await
        .expect("sign-in");

    assert_eq!(session.user.id, existing_id);
}

#[tokio::test]
async fn federated_sign_in_skips_write_when_nothing_changes() {
    let mut deps = Collaborators::new().issuing_tokens();
    let mut existing = federated_user("new.person@example.com");
    existing.federated_id = Some("fb-123".to_owned());
    deps.verifier
        .expect_verify()
        .times(1)
        .return_once(|_| Ok(identity(Some("Asha"), None)));
    deps.users
        .expect_find_by_email()
        .times(1)
        .return_once(move |_| Ok(Some(existing)));
    deps.users.expect_update().times(0);

    deps.build()
        .federated_sign_in("id-token")
        .await
        .expect("sign-in");
}

#[rstest::rstest]
#[case(IdentityVerificationError::rejected("bad aud"), ErrorCode::Unauthorized)]
#[case(IdentityVerificationError::upstream("timeout"), ErrorCode::UpstreamFailure)]
#[case(IdentityVerificationError::unconfigured(), ErrorCode::ServiceUnavailable)]
#[tokio::test]
async fn federated_sign_in_maps_verifier_errors(
    #[case] failure: IdentityVerificationError,
    #[case] expected: ErrorCode,
) {
    let mut deps = Collaborators::new();
    deps.verifier
        .expect_verify()
        .times(1)
        .return_once(move |_| Err(failure));
    deps.users.expect_find_by_email().times(0);

    let error = deps
        .build()
        .federated_sign_in("id-token")
        .await
        .expect_err("verifier failure");

    assert_eq!(error.code(), expected);
}

#[tokio::test]
async fn authenticate_resolves_stored_caller() {
    let user = local_user("asha@example.com");
    let user_id = user.id;
    let lookup_id = user_id;
    let mut deps = Collaborators::new();
    deps.tokens
        .expect_verify()
        .times(1)
        .return_once(move |_| Ok(lookup_id));
    deps.users
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(user)));

    let caller = deps.build().authenticate("token").await.expect("caller");

    assert_eq!(caller.user_id, user_id);
    assert!(caller.has_any_role(&[Role::Tenant]));
}

#[rstest::rstest]
#[case(TokenError::expired())]
#[case(TokenError::invalid("bad signature"))]
#[tokio::test]
async fn authenticate_rejects_bad_tokens(#[case] failure: TokenError) {
    let mut deps = Collaborators::new();
    deps.tokens
        .expect_verify()
        .times(1)
        .return_once(move |_| Err(failure));
    deps.users.expect_find_by_id().times(0);

    let error = deps.build().authenticate("token").await.expect_err("rejected");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn authenticate_rejects_tokens_for_vanished_users() {
    let mut deps = Collaborators::new();
    deps.tokens
        .expect_verify()
        .times(1)
        .return_once(|_| Ok(UserId::random()));
    deps.users
        .expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(None));

    let error = deps.build().authenticate("token").await.expect_err("gone");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn update_profile_applies_changes_and_persists() {
    let user = local_user("asha@example.com");
    let caller = caller_for(&user);
    let mut deps = Collaborators::new();
    deps.users
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(user)));
    deps.users
        .expect_update()
        .withf(|user| user.roles.contains(&Role::Landlord))
        .times(1)
        .return_once(|_| Ok(()));

    let update = ProfileUpdate {
        roles: Some(BTreeSet::from([Role::Landlord, Role::Tenant])),
        ..ProfileUpdate::default()
    };
    let updated = deps
        .build()
        .update_profile(&caller, update)
        .await
        .expect("update");

    assert_eq!(updated.roles.len(), 2);
}

#[tokio::test]
async fn current_user_reports_missing_record() {
    let user = local_user("asha@example.com");
    let caller = caller_for(&user);
    let mut deps = Collaborators::new();
    deps.users
        .expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(None));

    let error = deps
        .build()
        .current_user(&caller)
        .await
        .expect_err("missing");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

fn password_change() -> PasswordChange {
    PasswordChange {
        current: Password::existing("hunter22").expect("password"),
        replacement: Password::new_secret("correct-horse").expect("password"),
    }
}

#[tokio::test]
async fn change_password_rehashes_after_verifying_current() {
    let user = local_user("asha@example.com");
    let caller = caller_for(&user);
    let mut deps = Collaborators::new();
    deps.users
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(user)));
    deps.hasher
        .expect_verify()
        .times(1)
        .return_once(|_, _| Ok(true));
    deps.hasher
        .expect_hash()
        .withf(|password| password.expose() == "correct-horse")
        .times(1)
        .return_once(|_| Ok(PasswordHash::new("$2b$new")));
    deps.users
        .expect_update()
        .withf(|user| user.password_hash.as_ref().map(PasswordHash::as_str) == Some("$2b$new"))
        .times(1)
        .return_once(|_| Ok(()));

    deps.build()
        .change_password(&caller, password_change())
        .await
        .expect("changed");
}

#[tokio::test]
async fn change_password_rejects_wrong_current_password() {
    let user = local_user("asha@example.com");
    let caller = caller_for(&user);
    let mut deps = Collaborators::new();
    deps.users
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(user)));
    deps.hasher
        .expect_verify()
        .times(1)
        .return_once(|_, _| Ok(false));
    deps.hasher.expect_hash().times(0);
    deps.users.expect_update().times(0);

    let error = deps
        .build()
        .change_password(&caller, password_change())
        .await
        .expect_err("wrong password");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "Current password is incorrect");
}

#[tokio::test]
async fn change_password_refuses_federated_only_accounts() {
    let user = federated_user("asha@example.com");
    let caller = caller_for(&user);
    let mut deps = Collaborators::new();
    deps.users
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(user)));
    deps.hasher.expect_verify().times(0);

    let error = deps
        .build()
        .change_password(&caller, password_change())
        .await
        .expect_err("no password");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

//! Harness shared by the HTTP integration suites.
//!
//! Every suite runs the full route table over in-memory stores, a frozen
//! clock and cheap bcrypt hashing. Media uploads go to a recording double.

use std::sync::{Arc, Mutex};

use actix_http::Request;
use actix_web::body::{BoxBody, to_bytes};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use async_trait::async_trait;
use serde_json::{Value, json};
use zeroize::Zeroizing;

use backend::Trace;
use backend::domain::ports::{MediaStore, MediaStoreError};
use backend::domain::{MediaFolder, StoredObject, UploadFile};
use backend::inbound::http::configure;
use backend::inbound::http::health::HealthState;
use backend::outbound::identity::UnconfiguredIdentityVerifier;
use backend::outbound::security::{BcryptPasswordHasher, JwtTokenService};
use backend::test_support::FixtureClock;
use backend::wiring::{Collaborators, MemoryStores, http_state};

/// Media store double that accepts every upload and records removals.
#[derive(Default)]
pub struct RecordingMediaStore {
    destroyed: Mutex<Vec<String>>,
}

impl RecordingMediaStore {
    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().expect("destroyed lock").clone()
    }
}

#[async_trait]
impl MediaStore for RecordingMediaStore {
    async fn upload(
        &self,
        file: &UploadFile,
        folder: &MediaFolder,
    ) -> Result<StoredObject, MediaStoreError> {
        let public_id = format!("{}/{}", folder.as_str(), file.file_name);
        Ok(StoredObject {
            url: format!("https://media.example.test/{public_id}"),
            public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), MediaStoreError> {
        self.destroyed
            .lock()
            .expect("destroyed lock")
            .push(public_id.to_owned());
        Ok(())
    }
}

/// Collaborators and clock handles kept by a test.
pub struct Harness {
    pub clock: Arc<FixtureClock>,
    pub media: Arc<RecordingMediaStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            clock: FixtureClock::shared(),
            media: Arc::new(RecordingMediaStore::default()),
        }
    }

    /// Initialise the application over fresh in-memory stores.
    pub async fn app(
        &self,
    ) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
        let clock = self.clock.clone();
        let collaborators = Collaborators {
            hasher: Arc::new(BcryptPasswordHasher::new(4)),
            tokens: Arc::new(JwtTokenService::new(
                &Zeroizing::new("integration-secret".to_owned()),
                chrono::Duration::hours(1),
                clock.clone(),
            )),
            identity: Arc::new(UnconfiguredIdentityVerifier),
            media: self.media.clone(),
            clock,
        };
        let state = http_state(MemoryStores::in_memory(), collaborators);

        test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(web::Data::new(HealthState::new()))
                .wrap(Trace)
                .configure(configure),
        )
        .await
    }
}

/// Status plus decoded JSON body.
pub async fn call<S>(app: &S, request: TestRequest) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let response = test::call_service(app, request.to_request()).await;
    let status = response.status().as_u16();
    let bytes = to_bytes(response.into_body()).await.expect("body reads");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, body)
}

pub fn bearer(request: TestRequest, token: &str) -> TestRequest {
    request.insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
}

/// Signed-in user as seen by a client.
pub struct Account {
    pub id: String,
    pub token: String,
}

/// Register `name` holding `role` and return the id and session token.
pub async fn register<S>(app: &S, name: &str, role: &str) -> Account
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let (status, body) = call(
        app,
        TestRequest::post().uri("/api/v1/auth/register").set_json(json!({
            "name": name,
            "email": format!("{}@example.com", name.to_lowercase()),
            "password": "correct-horse",
            "roles": [role],
        })),
    )
    .await;
    assert_eq!(status, 201, "registration failed: {body}");
    Account {
        id: body["data"]["user"]["id"]
            .as_str()
            .expect("user id")
            .to_owned(),
        token: body["data"]["token"].as_str().expect("token").to_owned(),
    }
}

/// Listing body accepted by `POST /properties`.
pub fn property_body() -> Value {
    json!({
        "title": "Sunny 2BHK near the station",
        "address": {
            "street": "12 MG Road",
            "city": "Pune",
            "state": "Maharashtra",
            "pincode": "411001"
        },
        "specs": {
            "bhk": "2BHK",
            "property_type": "apartment",
            "bathrooms": 2,
            "balconies": 1,
            "furnishing_status": "semi_furnished",
            "size_sq_ft": 950.0
        },
        "amenities": ["lift"],
        "expected_rent": 22000.0,
        "expected_deposit": 66000.0
    })
}

/// Eleven-month agreement body for `property` and `tenant`.
pub fn agreement_body(property: &str, tenant: &str) -> Value {
    json!({
        "property": property,
        "tenant": tenant,
        "start_date": "2025-02-01T00:00:00Z",
        "end_date": "2026-01-01T00:00:00Z",
        "rent_amount": 22000.0,
        "security_deposit": 66000.0
    })
}

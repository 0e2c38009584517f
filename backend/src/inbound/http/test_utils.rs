//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::http::header;
use actix_web::test::TestRequest;
use actix_web::web;
use serde_json::Value;

use super::state::HttpState;
use crate::domain::ports::{
    MockAccounts, MockAgreements, MockInspections, MockMediaGateway, MockNotifications,
    MockPayments, MockProperties, MockTickets,
};
use crate::domain::{AuthenticatedCaller, Role};
use crate::test_support::caller;

/// Token every test request sends.
pub const TEST_TOKEN: &str = "test-token";

/// `Authorization` header carrying [`TEST_TOKEN`].
pub fn bearer() -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {TEST_TOKEN}"))
}

pub fn tenant_caller() -> AuthenticatedCaller {
    caller(&[Role::Tenant])
}

pub fn landlord_caller() -> AuthenticatedCaller {
    caller(&[Role::Landlord])
}

/// Make `accounts` resolve [`TEST_TOKEN`] to `caller`.
pub fn expect_bearer(accounts: &mut MockAccounts, caller: AuthenticatedCaller) {
    accounts
        .expect_authenticate()
        .withf(|token| token == TEST_TOKEN)
        .returning(move |_| Ok(caller.clone()));
}

/// Mock-backed [`HttpState`] builder. Ports left unset panic when called.
#[derive(Default)]
pub struct StateBuilder {
    accounts: Option<MockAccounts>,
    properties: Option<MockProperties>,
    agreements: Option<MockAgreements>,
    payments: Option<MockPayments>,
    inspections: Option<MockInspections>,
    tickets: Option<MockTickets>,
    notifications: Option<MockNotifications>,
    media: Option<MockMediaGateway>,
}

impl StateBuilder {
    /// Resolve [`TEST_TOKEN`] to `caller` on every request.
    pub fn authenticated_as(caller: AuthenticatedCaller) -> Self {
        let mut accounts = MockAccounts::new();
        expect_bearer(&mut accounts, caller);
        Self::default().accounts(accounts)
    }

    pub fn accounts(mut self, mock: MockAccounts) -> Self {
        self.accounts = Some(mock);
        self
    }

    pub fn properties(mut self, mock: MockProperties) -> Self {
        self.properties = Some(mock);
        self
    }

    pub fn agreements(mut self, mock: MockAgreements) -> Self {
        self.agreements = Some(mock);
        self
    }

    pub fn payments(mut self, mock: MockPayments) -> Self {
        self.payments = Some(mock);
        self
    }

    pub fn inspections(mut self, mock: MockInspections) -> Self {
        self.inspections = Some(mock);
        self
    }

    pub fn tickets(mut self, mock: MockTickets) -> Self {
        self.tickets = Some(mock);
        self
    }

    pub fn notifications(mut self, mock: MockNotifications) -> Self {
        self.notifications = Some(mock);
        self
    }

    pub fn media(mut self, mock: MockMediaGateway) -> Self {
        self.media = Some(mock);
        self
    }

    pub fn build(self) -> web::Data<HttpState> {
        web::Data::new(HttpState {
            accounts: Arc::new(self.accounts.unwrap_or_default()),
            properties: Arc::new(self.properties.unwrap_or_default()),
            agreements: Arc::new(self.agreements.unwrap_or_default()),
            payments: Arc::new(self.payments.unwrap_or_default()),
            inspections: Arc::new(self.inspections.unwrap_or_default()),
            tickets: Arc::new(self.tickets.unwrap_or_default()),
            notifications: Arc::new(self.notifications.unwrap_or_default()),
            media: Arc::new(self.media.unwrap_or_default()),
        })
    }
}

const BOUNDARY: &str = "rentfit-test-boundary";

/// One part of a hand-built multipart body.
pub enum Part<'a> {
    File {
        name: &'a str,
        file_name: &'a str,
        mime: &'a str,
        bytes: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

/// `POST uri` with a `multipart/form-data` body made of `parts`.
pub fn multipart_post(uri: &str, parts: &[Part<'_>]) -> TestRequest {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File {
                name,
                file_name,
                mime,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {mime}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    TestRequest::post()
        .uri(uri)
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
}

/// Read a JSON response body.
pub async fn json_body(response: actix_web::dev::ServiceResponse) -> Value {
    actix_web::test::read_body_json(response).await
}

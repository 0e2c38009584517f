//! Composition of repositories and collaborators into [`HttpState`].
//!
//! The server picks Diesel or in-memory stores at start-up; integration
//! suites use the in-memory set with a fixed clock. Both go through
//! [`http_state`] so the service graph is identical.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AgreementRepository, DocumentRepository, IdentityVerifier, InspectionRepository, MediaStore,
    NotificationRepository, PasswordHasher, PaymentRepository, PropertyRepository,
    TicketRepository, TokenService, UserRepository,
};
use crate::domain::{
    AccountService, AgreementService, InspectionService, MediaService, NotificationService,
    PaymentService, PropertyService, TicketService,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::{
    MemoryAgreementRepository, MemoryDocumentRepository, MemoryInspectionRepository,
    MemoryNotificationRepository, MemoryPaymentRepository, MemoryPropertyRepository,
    MemoryTicketRepository, MemoryUserRepository,
};
use crate::outbound::persistence::{
    DbPool, DieselAgreementRepository, DieselDocumentRepository, DieselInspectionRepository,
    DieselNotificationRepository, DieselPaymentRepository, DieselPropertyRepository,
    DieselTicketRepository, DieselUserRepository,
};

/// One repository per entity.
pub struct Stores<U, P, A, Pay, I, T, N, D> {
    pub users: Arc<U>,
    pub properties: Arc<P>,
    pub agreements: Arc<A>,
    pub payments: Arc<Pay>,
    pub inspections: Arc<I>,
    pub tickets: Arc<T>,
    pub notifications: Arc<N>,
    pub documents: Arc<D>,
}

/// In-process stores; data lives as long as the process.
pub type MemoryStores = Stores<
    MemoryUserRepository,
    MemoryPropertyRepository,
    MemoryAgreementRepository,
    MemoryPaymentRepository,
    MemoryInspectionRepository,
    MemoryTicketRepository,
    MemoryNotificationRepository,
    MemoryDocumentRepository,
>;

/// PostgreSQL stores sharing one pool.
pub type DieselStores = Stores<
    DieselUserRepository,
    DieselPropertyRepository,
    DieselAgreementRepository,
    DieselPaymentRepository,
    DieselInspectionRepository,
    DieselTicketRepository,
    DieselNotificationRepository,
    DieselDocumentRepository,
>;

impl MemoryStores {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryUserRepository::new()),
            properties: Arc::new(MemoryPropertyRepository::new()),
            agreements: Arc::new(MemoryAgreementRepository::new()),
            payments: Arc::new(MemoryPaymentRepository::new()),
            inspections: Arc::new(MemoryInspectionRepository::new()),
            tickets: Arc::new(MemoryTicketRepository::new()),
            notifications: Arc::new(MemoryNotificationRepository::new()),
            documents: Arc::new(MemoryDocumentRepository::new()),
        }
    }
}

impl DieselStores {
    pub fn postgres(pool: &DbPool) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            properties: Arc::new(DieselPropertyRepository::new(pool.clone())),
            agreements: Arc::new(DieselAgreementRepository::new(pool.clone())),
            payments: Arc::new(DieselPaymentRepository::new(pool.clone())),
            inspections: Arc::new(DieselInspectionRepository::new(pool.clone())),
            tickets: Arc::new(DieselTicketRepository::new(pool.clone())),
            notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
            documents: Arc::new(DieselDocumentRepository::new(pool.clone())),
        }
    }
}

/// Non-storage collaborators shared by the services.
#[derive(Clone)]
pub struct Collaborators {
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenService>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub media: Arc<dyn MediaStore>,
    pub clock: Arc<dyn Clock>,
}

/// Build every service over `stores` and expose them as driving ports.
pub fn http_state<U, P, A, Pay, I, T, N, D>(
    stores: Stores<U, P, A, Pay, I, T, N, D>,
    collaborators: Collaborators,
) -> HttpState
where
    U: UserRepository + 'static,
    P: PropertyRepository + 'static,
    A: AgreementRepository + 'static,
    Pay: PaymentRepository + 'static,
    I: InspectionRepository + 'static,
    T: TicketRepository + 'static,
    N: NotificationRepository + 'static,
    D: DocumentRepository + 'static,
{
    let Collaborators {
        hasher,
        tokens,
        identity,
        media,
        clock,
    } = collaborators;

    HttpState {
        accounts: Arc::new(AccountService::new(
            stores.users,
            hasher,
            tokens,
            identity,
            clock.clone(),
        )),
        properties: Arc::new(PropertyService::new(
            stores.properties.clone(),
            media.clone(),
            clock.clone(),
        )),
        agreements: Arc::new(AgreementService::new(
            stores.agreements.clone(),
            stores.properties,
            clock.clone(),
        )),
        payments: Arc::new(PaymentService::new(
            stores.payments,
            stores.agreements.clone(),
            clock.clone(),
        )),
        inspections: Arc::new(InspectionService::new(
            stores.inspections,
            stores.agreements,
            media.clone(),
            clock.clone(),
        )),
        tickets: Arc::new(TicketService::new(stores.tickets, clock.clone())),
        notifications: Arc::new(NotificationService::new(stores.notifications, clock.clone())),
        media: Arc::new(MediaService::new(stores.documents, media, clock)),
    }
}

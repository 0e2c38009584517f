//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! they stay testable with mocks and never touch storage directly.

use std::sync::Arc;

use crate::domain::ports::{
    Accounts, Agreements, Inspections, MediaGateway, Notifications, Payments, Properties, Tickets,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn Accounts>,
    pub properties: Arc<dyn Properties>,
    pub agreements: Arc<dyn Agreements>,
    pub payments: Arc<dyn Payments>,
    pub inspections: Arc<dyn Inspections>,
    pub tickets: Arc<dyn Tickets>,
    pub notifications: Arc<dyn Notifications>,
    pub media: Arc<dyn MediaGateway>,
}

//! Backend library modules.
//!
//! The crate follows a hexagonal layout: `domain` holds entities, services
//! and ports; `inbound` adapts HTTP onto the services; `outbound` implements
//! the ports over PostgreSQL, memory, Firebase and Cloudinary; `wiring`
//! composes the two sides.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[doc(hidden)]
pub mod test_support;
pub mod wiring;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;

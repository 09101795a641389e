//! Game price comparison and review platform backend.
//!
//! The crate follows a hexagonal layout: `domain` holds aggregates, ports,
//! and services; `inbound` adapts HTTP and WebSocket traffic onto the
//! driving ports; `outbound` implements the driven ports over PostgreSQL and
//! the third-party game APIs (CheapShark, IGDB, RAWG).

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use doc::ApiDoc;
pub use middleware::Trace;

//! CheapShark outbound adapter.

mod dto;
mod http_source;

pub use http_source::{CheapSharkHttpSource, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

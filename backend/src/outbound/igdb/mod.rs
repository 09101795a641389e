//! IGDB outbound adapter (Twitch OAuth + catalog queries).

mod dto;
mod http_source;

pub use http_source::{
    IgdbCredentials, IgdbHttpSource, DEFAULT_API_URL, DEFAULT_OAUTH_URL, DEFAULT_TIMEOUT,
};

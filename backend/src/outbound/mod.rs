//! Outbound adapters: PostgreSQL persistence and third-party API clients.

pub mod cheapshark;
pub mod google;
pub mod igdb;
pub mod persistence;
pub mod rawg;

//! Diesel row structs for the persistence layer.
//!
//! These are internal to the outbound adapter; repositories translate them to
//! and from domain types at the boundary.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{purchases, reviews, users, wishlist_entries};

/// Readable user row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub password_hash: Option<String>,
    pub role: String,
    pub status: String,
    pub google_id: Option<String>,
    pub avatar_url: Option<String>,
    pub favourite_genre: Option<String>,
    pub preferred_store: Option<String>,
    pub purchase_count: i32,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Insertable user row.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub display_name: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub role: &'a str,
    pub status: &'a str,
    pub google_id: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub favourite_genre: Option<&'a str>,
    pub preferred_store: Option<&'a str>,
    pub purchase_count: i32,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Readable review row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReviewRow {
    pub id: Uuid,
    pub game_id: String,
    pub user_id: Option<Uuid>,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable review row.
#[derive(Debug, Insertable)]
#[diesel(table_name = reviews)]
pub struct NewReviewRow<'a> {
    pub id: Uuid,
    pub game_id: &'a str,
    pub user_id: Option<Uuid>,
    pub rating: i32,
    pub comment: &'a str,
}

/// Readable wishlist row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = wishlist_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WishlistRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub game_id: String,
    pub game_title: String,
    pub image_url: Option<String>,
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub discount_percent: Option<i32>,
    pub store_id: Option<String>,
    pub deal_id: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// Insertable wishlist row.
#[derive(Debug, Insertable)]
#[diesel(table_name = wishlist_entries)]
pub struct NewWishlistRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub game_id: &'a str,
    pub game_title: &'a str,
    pub image_url: Option<&'a str>,
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub discount_percent: Option<i32>,
    pub store_id: Option<&'a str>,
    pub deal_id: Option<&'a str>,
}

/// Readable purchase row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = purchases)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PurchaseRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub game_id: String,
    pub game_title: String,
    pub image_url: Option<String>,
    pub genre: Option<String>,
    pub price: Option<f64>,
    pub store: Option<String>,
    pub purchased_at: DateTime<Utc>,
}

/// Insertable purchase row.
#[derive(Debug, Insertable)]
#[diesel(table_name = purchases)]
pub struct NewPurchaseRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub game_id: &'a str,
    pub game_title: &'a str,
    pub image_url: Option<&'a str>,
    pub genre: Option<&'a str>,
    pub price: Option<f64>,
    pub store: Option<&'a str>,
}

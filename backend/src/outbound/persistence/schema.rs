//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; `diesel
//! print-schema` can regenerate them from a live database.

diesel::table! {
    /// User accounts.
    users (id) {
        id -> Uuid,
        #[max_length = 255]
        email -> Varchar,
        #[max_length = 32]
        display_name -> Nullable<Varchar>,
        #[max_length = 255]
        password_hash -> Nullable<Varchar>,
        #[max_length = 16]
        role -> Varchar,
        #[max_length = 16]
        status -> Varchar,
        #[max_length = 64]
        google_id -> Nullable<Varchar>,
        avatar_url -> Nullable<Text>,
        #[max_length = 64]
        favourite_genre -> Nullable<Varchar>,
        #[max_length = 64]
        preferred_store -> Nullable<Varchar>,
        purchase_count -> Int4,
        created_at -> Timestamptz,
        last_login_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Game reviews, one per (user, game).
    reviews (id) {
        id -> Uuid,
        #[max_length = 64]
        game_id -> Varchar,
        user_id -> Nullable<Uuid>,
        rating -> Int4,
        #[max_length = 200]
        comment -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Wishlist entries with deal-snapshot fields, one per (user, game).
    wishlist_entries (id) {
        id -> Uuid,
        user_id -> Uuid,
        #[max_length = 64]
        game_id -> Varchar,
        #[max_length = 255]
        game_title -> Varchar,
        image_url -> Nullable<Text>,
        price -> Nullable<Float8>,
        original_price -> Nullable<Float8>,
        discount_percent -> Nullable<Int4>,
        #[max_length = 16]
        store_id -> Nullable<Varchar>,
        #[max_length = 64]
        deal_id -> Nullable<Varchar>,
        added_at -> Timestamptz,
    }
}

diesel::table! {
    /// Purchase records.
    purchases (id) {
        id -> Uuid,
        user_id -> Uuid,
        #[max_length = 64]
        game_id -> Varchar,
        #[max_length = 255]
        game_title -> Varchar,
        image_url -> Nullable<Text>,
        #[max_length = 255]
        genre -> Nullable<Varchar>,
        price -> Nullable<Float8>,
        #[max_length = 64]
        store -> Nullable<Varchar>,
        purchased_at -> Timestamptz,
    }
}

diesel::joinable!(reviews -> users (user_id));
diesel::joinable!(wishlist_entries -> users (user_id));
diesel::joinable!(purchases -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, reviews, wishlist_entries, purchases);

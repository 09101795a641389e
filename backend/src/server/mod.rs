//! Server construction: adapter wiring and HTTP service registration.

mod config;

pub use config::AppConfig;

use std::io;
use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use tracing::{info, warn};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::{
    DealsSource, FixtureGoogleTokenVerifier, GameCatalogSource, GenreEnrichmentSource,
    GoogleTokenVerifier, InMemoryPurchaseRepository, InMemoryReviewRepository,
    InMemoryUserRepository, InMemoryWishlistRepository, PurchaseRepository, ReviewRepository,
    UserRepository, WishlistRepository,
};
use crate::domain::{AccountsService, CatalogService};
use crate::inbound::http::health::HealthState;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::token::TokenCodec;
use crate::inbound::ws;
use crate::inbound::ws::state::WsState;
use crate::middleware::Trace;
use crate::outbound::cheapshark::CheapSharkHttpSource;
use crate::outbound::google::GoogleTokenInfoVerifier;
use crate::outbound::igdb::{IgdbCredentials, IgdbHttpSource};
use crate::outbound::persistence::{
    run_pending_migrations, DbPool, DieselPurchaseRepository, DieselReviewRepository,
    DieselUserRepository, DieselWishlistRepository, PoolConfig,
};
use crate::outbound::rawg::RawgHttpSource;

struct Repositories {
    users: Arc<dyn UserRepository>,
    reviews: Arc<dyn ReviewRepository>,
    wishlist: Arc<dyn WishlistRepository>,
    purchases: Arc<dyn PurchaseRepository>,
}

async fn build_repositories(config: &AppConfig) -> io::Result<Repositories> {
    match &config.database_url {
        Some(url) => {
            run_pending_migrations(url).map_err(io::Error::other)?;
            let pool = DbPool::new(PoolConfig::new(url))
                .await
                .map_err(io::Error::other)?;
            info!("using PostgreSQL-backed repositories");
            Ok(Repositories {
                users: Arc::new(DieselUserRepository::new(pool.clone())),
                reviews: Arc::new(DieselReviewRepository::new(pool.clone())),
                wishlist: Arc::new(DieselWishlistRepository::new(pool.clone())),
                purchases: Arc::new(DieselPurchaseRepository::new(pool)),
            })
        }
        None => {
            warn!("DATABASE_URL not configured; using in-memory stores (development only)");
            Ok(Repositories {
                users: Arc::new(InMemoryUserRepository::new()),
                reviews: Arc::new(InMemoryReviewRepository::new()),
                wishlist: Arc::new(InMemoryWishlistRepository::new()),
                purchases: Arc::new(InMemoryPurchaseRepository::new()),
            })
        }
    }
}

fn build_google_verifier(config: &AppConfig) -> io::Result<Arc<dyn GoogleTokenVerifier>> {
    match &config.google_client_id {
        Some(client_id) => Ok(Arc::new(
            GoogleTokenInfoVerifier::new(client_id.clone()).map_err(io::Error::other)?,
        )),
        None => {
            warn!("GOOGLE_CLIENT_ID not configured; Google login uses the fixture verifier");
            Ok(Arc::new(FixtureGoogleTokenVerifier))
        }
    }
}

fn build_catalog_service(config: &AppConfig) -> io::Result<CatalogService> {
    let deals: Arc<dyn DealsSource> =
        Arc::new(CheapSharkHttpSource::new().map_err(io::Error::other)?);

    // Missing IGDB credentials are tolerated: the adapter reports NoToken
    // and catalog endpoints degrade to empty results.
    let credentials = IgdbCredentials {
        client_id: config.igdb_client_id.clone().unwrap_or_default(),
        client_secret: config.igdb_client_secret.clone().unwrap_or_default(),
    };
    let catalog: Arc<dyn GameCatalogSource> =
        Arc::new(IgdbHttpSource::new(credentials).map_err(io::Error::other)?);

    let enrichment: Option<Arc<dyn GenreEnrichmentSource>> = match &config.rawg_api_key {
        Some(key) => Some(Arc::new(
            RawgHttpSource::new(key.clone()).map_err(io::Error::other)?,
        )),
        None => {
            info!("RAWG_API_KEY not configured; genre enrichment disabled");
            None
        }
    };

    Ok(CatalogService::new(deals, catalog, enrichment))
}

/// Assemble the HTTP and WebSocket state bundles from configuration.
pub async fn build_state(config: &AppConfig) -> io::Result<(HttpState, WsState)> {
    let repositories = build_repositories(config).await?;
    let google = build_google_verifier(config)?;

    let accounts = Arc::new(AccountsService::new(repositories.users.clone(), google));
    let catalog = Arc::new(build_catalog_service(config)?);

    let ws_state = WsState::new(repositories.users.clone());
    let http_state = HttpState::new(
        HttpStatePorts {
            accounts,
            catalog,
            users: repositories.users,
            reviews: repositories.reviews,
            wishlist: repositories.wishlist,
            purchases: repositories.purchases,
        },
        TokenCodec::new(&config.jwt_secret),
    );

    Ok((http_state, ws_state))
}

/// Build and run the HTTP server until shutdown.
pub async fn run(config: AppConfig) -> io::Result<()> {
    let (http_state, ws_state) = build_state(&config).await?;

    let health = web::Data::new(HealthState::new());
    let server_health = health.clone();
    let http_data = web::Data::new(http_state);
    let ws_data = web::Data::new(ws_state);

    let server = HttpServer::new(move || {
        use crate::inbound::http;

        #[allow(unused_mut)]
        let mut app = App::new()
            .app_data(http_data.clone())
            .app_data(ws_data.clone())
            .app_data(server_health.clone())
            .wrap(Trace)
            .service(http::auth::register)
            .service(http::auth::login)
            .service(http::auth::google_login)
            .service(http::auth::current_user)
            .service(http::users::list_users)
            .service(http::users::update_user)
            .service(http::users::update_user_status)
            .service(http::users::delete_user)
            .service(http::profile::get_profile)
            .service(http::profile::update_profile)
            .service(http::profile::update_preferences)
            .service(http::wishlist::get_wishlist)
            .service(http::wishlist::get_wishlist_ids)
            .service(http::wishlist::add_to_wishlist)
            .service(http::wishlist::remove_from_wishlist)
            .service(http::purchases::create_purchase)
            .service(http::purchases::get_my_purchases)
            .service(http::reviews::create_review)
            .service(http::reviews::list_reviews)
            .service(http::reviews::list_game_reviews)
            .service(http::reviews::list_user_reviews)
            .service(http::reviews::delete_review)
            .service(http::games::list_catalog_games)
            .service(http::games::list_deals)
            .service(http::games::trigger_etl)
            .service(http::admin::genre_stats)
            .service(http::admin::top_deals)
            .service(ws::ws_entry)
            .service(http::health::ready)
            .service(http::health::live);

        #[cfg(debug_assertions)]
        {
            app = app
                .service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));
        }

        app
    })
    .bind(config.bind_addr)?;

    info!(addr = %config.bind_addr, "server listening");
    health.mark_ready();
    server.run().await
}

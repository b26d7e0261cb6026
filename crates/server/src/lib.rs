//! Household housing tracker server.
//!
//! One actix-web application: every request passes the session gate, then
//! reaches either a page or a JSON resource handler.
//!
//! ## Submodules
//!
//! - [`config`] — Command line and environment configuration
//! - `pages` — Login page, app shell, health probe
//! - `listings`, `viewings`, `notes`, `scores`, `photos` — Listing pool
//! - `preferences`, `budget` — Per-member criteria and household budget
pub mod config;

mod budget;
mod listings;
mod notes;
mod pages;
mod photos;
mod preferences;
mod scores;
mod viewings;

#[cfg(test)]
mod memory;

pub use config::*;

use actix_web::App;
use actix_web::HttpServer;
use actix_web::middleware::Logger;
use actix_web::middleware::from_fn;
use actix_web::web;
use hh_auth::*;
use hh_database::Check;
use hh_integrations::*;
use hh_listings::*;
use std::sync::Arc;

/// Largest JSON request body accepted.
const MAX_JSON_BYTES: usize = 256 * 1024;

/// Everything handlers pull from application data.
#[derive(Clone)]
pub struct Services {
    pub crypto: web::Data<Crypto>,
    pub cookie: web::Data<SessionCookie>,
    pub credentials: web::Data<dyn Credentials>,
    pub listings: web::Data<dyn Listings>,
    pub household: web::Data<dyn Household>,
    pub check: web::Data<dyn Check>,
    pub geocoder: web::Data<dyn Geocoder>,
    pub scraper: web::Data<dyn Scraper>,
    pub store: web::Data<dyn ObjectStore>,
    pub uploads: web::Data<Uploads>,
}

impl Services {
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.crypto.clone())
            .app_data(self.cookie.clone())
            .app_data(self.credentials.clone())
            .app_data(self.listings.clone())
            .app_data(self.household.clone())
            .app_data(self.check.clone())
            .app_data(self.geocoder.clone())
            .app_data(self.scraper.clone())
            .app_data(self.store.clone())
            .app_data(self.uploads.clone());
    }
}

/// JSON extraction limits; malformed bodies become 400 `{ "error": ... }`.
pub fn json() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_JSON_BYTES)
        .error_handler(|err, _| hh_core::Error::invalid(err.to_string()).into())
}

/// Path id of a `what`; malformed ids read as unknown ones.
fn parse<T>(raw: &str, what: &str) -> Result<hh_core::ID<T>, hh_core::Error> {
    hh_core::ID::parse(raw).ok_or_else(|| hh_core::Error::missing(format!("{} not found", what)))
}

/// Listing named by a path segment, or 404.
async fn existing(db: &dyn Listings, raw: &str) -> Result<Listing, hh_core::Error> {
    db.listing(parse(raw, "listing")?)
        .await?
        .ok_or_else(|| hh_core::Error::missing("listing not found"))
}

fn success() -> actix_web::HttpResponse {
    actix_web::HttpResponse::Ok().json(serde_json::json!({ "success": true }))
}

/// Full route table. Gating is applied by the caller.
#[rustfmt::skip]
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/",                              web::get().to(pages::home))
        .route("/login",                        web::get().to(pages::login))
        .route("/health",                       web::get().to(pages::health))
        .service(
            web::scope("/api")
                .route("/auth/login",                web::post().to(hh_auth::login))
                .route("/auth/logout",               web::post().to(hh_auth::logout))
                .route("/auth/me",                   web::get().to(hh_auth::me))
                .route("/auth/password",             web::put().to(hh_auth::change_password))
                .route("/users",                     web::get().to(hh_auth::list_users))
                .route("/users",                     web::post().to(hh_auth::create_user))
                .route("/users/{id}",                web::patch().to(hh_auth::update_user))
                .route("/users/{id}",                web::delete().to(hh_auth::delete_user))
                .route("/listings",                  web::get().to(listings::list))
                .route("/listings",                  web::post().to(listings::create))
                .route("/listings/{id}",             web::get().to(listings::fetch))
                .route("/listings/{id}",             web::patch().to(listings::update))
                .route("/listings/{id}",             web::delete().to(listings::delete))
                .route("/listings/{id}/select",      web::post().to(listings::select))
                .route("/listings/{id}/viewings",    web::get().to(viewings::list))
                .route("/listings/{id}/viewings",    web::post().to(viewings::create))
                .route("/listings/{id}/notes",       web::get().to(notes::list))
                .route("/listings/{id}/notes",       web::post().to(notes::create))
                .route("/listings/{id}/score",       web::get().to(scores::fetch))
                .route("/listings/{id}/score",       web::post().to(scores::update))
                .route("/listings/{id}/photos",      web::post().to(photos::upload))
                .route("/viewings/{id}",             web::patch().to(viewings::update))
                .route("/viewings/{id}",             web::delete().to(viewings::delete))
                .route("/notes/{id}",                web::patch().to(notes::update))
                .route("/notes/{id}",                web::delete().to(notes::delete))
                .route("/preferences",               web::get().to(preferences::fetch))
                .route("/preferences",               web::put().to(preferences::update))
                .route("/preferences/areas",         web::get().to(preferences::areas))
                .route("/preferences/areas",         web::post().to(preferences::add_area))
                .route("/preferences/areas/{name}",  web::put().to(preferences::update_area))
                .route("/preferences/areas/{name}",  web::delete().to(preferences::remove_area))
                .route("/budget",                    web::get().to(budget::fetch))
                .route("/budget",                    web::put().to(budget::update))
                .route("/scrape",                    web::post().to(listings::scrape))
                .default_service(web::to(pages::missing)),
        );
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let crypto = Crypto::new(&config.secret()?);
    let client = hh_database::db(&config.db_url).await?;
    hh_database::install::<Member>(&client).await?;
    hh_database::install::<Listing>(&client).await?;
    hh_database::install::<Viewing>(&client).await?;
    hh_database::install::<Note>(&client).await?;
    hh_database::install::<Score>(&client).await?;
    hh_database::install::<Preferences>(&client).await?;
    hh_database::install::<AreaPreference>(&client).await?;
    hh_database::install::<Budget>(&client).await?;
    client.status().await;
    if let Some((username, password)) = config.admin() {
        hh_auth::bootstrap(&client, username, password).await?;
    }
    std::fs::create_dir_all(&config.upload_dir)?;
    let services = Services {
        crypto: web::Data::new(crypto),
        cookie: web::Data::new(SessionCookie::new(config.production())),
        credentials: web::Data::from(Arc::new(client.clone()) as Arc<dyn Credentials>),
        listings: web::Data::from(Arc::new(client.clone()) as Arc<dyn Listings>),
        household: web::Data::from(Arc::new(client.clone()) as Arc<dyn Household>),
        check: web::Data::from(client.clone() as Arc<dyn Check>),
        geocoder: web::Data::from(Arc::new(Nominatim::new(&config.geocoder_url)?) as Arc<dyn Geocoder>),
        scraper: web::Data::from(Arc::new(HttpScraper::new()?) as Arc<dyn Scraper>),
        store: web::Data::from(Arc::new(Disk::new(&config.upload_dir, &config.upload_url)) as Arc<dyn ObjectStore>),
        uploads: web::Data::new(Uploads::new(&config.upload_url)),
    };
    let uploads = (config.upload_url.clone(), config.upload_dir.clone());
    log::info!("listening on {} ({:?} mode)", config.bind, config.mode);
    HttpServer::new(move || {
        App::new()
            .wrap(from_fn(gatekeeper))
            .wrap(Logger::new("%r %s %Ts"))
            .app_data(json())
            .configure(|cfg| services.register(cfg))
            .service(actix_files::Files::new(&uploads.0, &uploads.1))
            .configure(routes)
    })
    .workers(config.workers)
    .bind(&config.bind)?
    .run()
    .await?;
    Ok(())
}

use super::*;
use actix_web::HttpResponse;
use hh_core::Error;
use hh_core::Unique;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct ScrapeRequest {
    #[serde(default)]
    pub url: String,
}

/// Fill in coordinates from the address when they are missing.
async fn locate(geocoder: &dyn Geocoder, listing: &mut Listing) {
    if listing.located() {
        return;
    }
    if let Some(address) = listing.address.as_deref() {
        if let Some((lat, lon)) = geocoder.locate(address).await {
            listing.latitude = Some(lat);
            listing.longitude = Some(lon);
        }
    }
}

pub async fn list(
    db: web::Data<dyn Listings>,
    _: Auth,
    query: web::Query<ListingQuery>,
) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(db.listings(query.status()?).await?))
}

pub async fn create(
    db: web::Data<dyn Listings>,
    geocoder: web::Data<dyn Geocoder>,
    auth: Auth,
    req: web::Json<ListingRequest>,
) -> Result<HttpResponse, Error> {
    let mut listing = NewListing::try_from(req.into_inner())?.into_listing(auth.user());
    locate(geocoder.get_ref(), &mut listing).await;
    db.insert(&listing).await?;
    log::info!("{} added listing {}", auth.claims().username(), listing.id());
    Ok(HttpResponse::Created().json(listing))
}

pub async fn fetch(
    db: web::Data<dyn Listings>,
    _: Auth,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(existing(db.get_ref(), &path).await?))
}

pub async fn update(
    db: web::Data<dyn Listings>,
    geocoder: web::Data<dyn Geocoder>,
    _: Auth,
    path: web::Path<String>,
    req: web::Json<ListingPatchRequest>,
) -> Result<HttpResponse, Error> {
    let patch = ListingPatch::try_from(req.into_inner())?;
    let mut listing = existing(db.get_ref(), &path).await?;
    let readdressed = patch.readdressed();
    let status = patch.status;
    patch.apply(&mut listing);
    if readdressed {
        locate(geocoder.get_ref(), &mut listing).await;
    }
    let listing = db
        .update(&listing, status)
        .await?
        .ok_or_else(|| Error::missing("listing not found"))?;
    Ok(HttpResponse::Ok().json(listing))
}

pub async fn delete(
    db: web::Data<dyn Listings>,
    auth: Auth,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let listing = existing(db.get_ref(), &path).await?;
    if listing.created_by != auth.user() && !auth.claims().admin() {
        return Err(Error::forbidden(
            "only the creator or an administrator can delete a listing",
        ));
    }
    db.remove(listing.id()).await?;
    log::info!("{} deleted listing {}", auth.claims().username(), listing.id());
    Ok(success())
}

/// Mark one listing SELECTED and archive every other live listing.
pub async fn select(
    db: web::Data<dyn Listings>,
    auth: Auth,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let id = parse(&path, "listing")?;
    let listing = db
        .select(id)
        .await?
        .ok_or_else(|| Error::missing("listing not found"))?;
    log::info!("{} selected listing {}", auth.claims().username(), id);
    Ok(HttpResponse::Ok().json(listing))
}

pub async fn scrape(
    scraper: web::Data<dyn Scraper>,
    _: Auth,
    req: web::Json<ScrapeRequest>,
) -> Result<HttpResponse, Error> {
    let url = req.url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(Error::invalid("url must be an http or https address"));
    }
    Ok(HttpResponse::Ok().json(scraper.preview(url).await))
}

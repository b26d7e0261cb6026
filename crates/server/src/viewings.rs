use super::*;
use actix_web::HttpResponse;
use hh_core::Error;
use hh_core::Unique;

async fn viewing(db: &dyn Listings, raw: &str) -> Result<Viewing, Error> {
    db.viewing(parse(raw, "viewing")?)
        .await?
        .ok_or_else(|| Error::missing("viewing not found"))
}

/// Viewings of a listing, soonest first.
pub async fn list(
    db: web::Data<dyn Listings>,
    _: Auth,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let listing = existing(db.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(db.viewings(listing.id()).await?))
}

pub async fn create(
    db: web::Data<dyn Listings>,
    auth: Auth,
    path: web::Path<String>,
    req: web::Json<ViewingRequest>,
) -> Result<HttpResponse, Error> {
    let new = NewViewing::try_from(req.into_inner())?;
    let listing = existing(db.get_ref(), &path).await?;
    let viewing = new.into_viewing(listing.id(), auth.user());
    db.schedule(&viewing).await?;
    Ok(HttpResponse::Created().json(viewing))
}

pub async fn update(
    db: web::Data<dyn Listings>,
    _: Auth,
    path: web::Path<String>,
    req: web::Json<ViewingPatchRequest>,
) -> Result<HttpResponse, Error> {
    let patch = ViewingPatch::try_from(req.into_inner())?;
    let mut viewing = viewing(db.get_ref(), &path).await?;
    patch.apply(&mut viewing);
    db.reschedule(&viewing).await?;
    Ok(HttpResponse::Ok().json(viewing))
}

pub async fn delete(
    db: web::Data<dyn Listings>,
    auth: Auth,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let viewing = viewing(db.get_ref(), &path).await?;
    if viewing.created_by != auth.user() && !auth.claims().admin() {
        return Err(Error::forbidden(
            "only the scheduler or an administrator can cancel a viewing",
        ));
    }
    db.cancel(viewing.id()).await?;
    Ok(success())
}

use super::*;
use actix_web::HttpResponse;
use hh_core::Error;
use hh_core::Unique;

pub async fn fetch(
    db: web::Data<dyn Listings>,
    _: Auth,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let listing = existing(db.get_ref(), &path).await?;
    let score = db
        .score(listing.id())
        .await?
        .unwrap_or_else(|| Score::blank(listing.id()));
    Ok(HttpResponse::Ok().json(ScoreView::from(score)))
}

/// Merge the submitted fields into the stored score.
pub async fn update(
    db: web::Data<dyn Listings>,
    auth: Auth,
    path: web::Path<String>,
    req: web::Json<ScoreRequest>,
) -> Result<HttpResponse, Error> {
    let patch = ScorePatch::try_from(req.into_inner())?;
    let listing = existing(db.get_ref(), &path).await?;
    let score = db
        .score(listing.id())
        .await?
        .unwrap_or_else(|| Score::blank(listing.id()))
        .merge(patch, auth.user());
    db.rate(&score).await?;
    Ok(HttpResponse::Ok().json(ScoreView::from(score)))
}

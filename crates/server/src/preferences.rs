use super::*;
use actix_web::HttpResponse;
use hh_core::Error;

async fn area(db: &dyn Household, user: hh_core::ID<Member>, name: &str) -> Result<AreaPreference, Error> {
    db.area(user, name.trim())
        .await?
        .ok_or_else(|| Error::missing(format!("no preference for area '{}'", name.trim())))
}

/// The caller's own criteria. Members who never saved any get empty ones.
pub async fn fetch(db: web::Data<dyn Household>, auth: Auth) -> Result<HttpResponse, Error> {
    let preferences = db
        .preferences(auth.user())
        .await?
        .unwrap_or_else(|| Preferences::empty(auth.user()));
    Ok(HttpResponse::Ok().json(preferences))
}

pub async fn update(
    db: web::Data<dyn Household>,
    auth: Auth,
    req: web::Json<PreferencesRequest>,
) -> Result<HttpResponse, Error> {
    let preferences = req.into_inner().validate(auth.user())?;
    db.prefer(&preferences).await?;
    Ok(HttpResponse::Ok().json(preferences))
}

pub async fn areas(db: web::Data<dyn Household>, auth: Auth) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(db.areas(auth.user()).await?))
}

pub async fn add_area(
    db: web::Data<dyn Household>,
    auth: Auth,
    req: web::Json<AreaRequest>,
) -> Result<HttpResponse, Error> {
    let area = req.into_inner().validate(auth.user())?;
    db.add_area(&area).await?;
    Ok(HttpResponse::Created().json(area))
}

pub async fn update_area(
    db: web::Data<dyn Household>,
    auth: Auth,
    path: web::Path<String>,
    req: web::Json<AreaPatchRequest>,
) -> Result<HttpResponse, Error> {
    let patch = AreaPatch::try_from(req.into_inner())?;
    let mut area = area(db.get_ref(), auth.user(), &path).await?;
    patch.apply(&mut area);
    db.update_area(&area).await?;
    Ok(HttpResponse::Ok().json(area))
}

pub async fn remove_area(
    db: web::Data<dyn Household>,
    auth: Auth,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let name = path.trim();
    match db.remove_area(auth.user(), name).await? {
        true => Ok(success()),
        false => Err(Error::missing(format!("no preference for area '{}'", name))),
    }
}

use super::*;
use actix_web::HttpResponse;
use hh_core::Error;

pub async fn fetch(
    household: web::Data<dyn Household>,
    listings: web::Data<dyn Listings>,
    credentials: web::Data<dyn Credentials>,
    _: Auth,
) -> Result<HttpResponse, Error> {
    let budget = household.budget().await?.unwrap_or_default();
    let open = listings.listings(None).await?;
    let members = credentials.headcount().await?;
    Ok(HttpResponse::Ok().json(budget.view(&open, members)))
}

pub async fn update(
    household: web::Data<dyn Household>,
    listings: web::Data<dyn Listings>,
    credentials: web::Data<dyn Credentials>,
    admin: Admin,
    req: web::Json<BudgetRequest>,
) -> Result<HttpResponse, Error> {
    let budget = req.into_inner().validate(admin.user())?;
    household.set_budget(&budget).await?;
    log::info!("{} updated the budget", admin.claims().username());
    let open = listings.listings(None).await?;
    let members = credentials.headcount().await?;
    Ok(HttpResponse::Ok().json(budget.view(&open, members)))
}

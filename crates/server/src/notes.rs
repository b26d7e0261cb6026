use super::*;
use actix_web::HttpResponse;
use hh_core::Error;
use hh_core::Unique;

async fn note(db: &dyn Listings, raw: &str) -> Result<Note, Error> {
    db.note(parse(raw, "note")?)
        .await?
        .ok_or_else(|| Error::missing("note not found"))
}

pub async fn list(
    db: web::Data<dyn Listings>,
    _: Auth,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let listing = existing(db.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(db.notes(listing.id()).await?))
}

pub async fn create(
    db: web::Data<dyn Listings>,
    auth: Auth,
    path: web::Path<String>,
    req: web::Json<NoteRequest>,
) -> Result<HttpResponse, Error> {
    let body = NoteBody::try_from(req.into_inner())?;
    let listing = existing(db.get_ref(), &path).await?;
    let note = body.into_note(listing.id(), auth.user());
    db.annotate(&note).await?;
    Ok(HttpResponse::Created().json(note))
}

/// Authors edit their own notes; nobody else may, administrators included.
pub async fn update(
    db: web::Data<dyn Listings>,
    auth: Auth,
    path: web::Path<String>,
    req: web::Json<NoteRequest>,
) -> Result<HttpResponse, Error> {
    let NoteBody(body) = NoteBody::try_from(req.into_inner())?;
    let mut note = note(db.get_ref(), &path).await?;
    if !note.authored_by(auth.user()) {
        return Err(Error::forbidden("only the author can edit a note"));
    }
    note.body = body;
    note.updated_at = chrono::Utc::now();
    db.revise(&note).await?;
    Ok(HttpResponse::Ok().json(note))
}

pub async fn delete(
    db: web::Data<dyn Listings>,
    auth: Auth,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let note = note(db.get_ref(), &path).await?;
    if !note.authored_by(auth.user()) && !auth.claims().admin() {
        return Err(Error::forbidden(
            "only the author or an administrator can delete a note",
        ));
    }
    db.erase(note.id()).await?;
    Ok(success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use hh_core::Arbitrary;
    use serde_json::Value;
    use serde_json::json;

    #[actix_web::test]
    async fn notes_belong_to_their_authors() {
        let dir = tempfile::tempdir().unwrap();
        let (memory, services) = Memory::services(dir.path());
        let app = app!(services);
        let ref author = memory.join("henry", false);
        let ref other = memory.join("ivy", false);
        let ref admin = memory.join("jo", true);
        let listing = memory.seed(Listing::random(), Status::Active);
        let req = test::TestRequest::post()
            .uri(&format!("/api/listings/{}/notes", listing.id()))
            .cookie(Memory::cookie(author))
            .set_json(json!({ "body": "great light in the kitchen" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["authorId"], author.id().to_string());
        let uri = format!("/api/notes/{}", body["id"].as_str().unwrap());
        let edit = |who: &Member| {
            test::TestRequest::patch()
                .uri(&uri)
                .cookie(Memory::cookie(who))
                .set_json(json!({ "body": "street noise at night" }))
                .to_request()
        };
        assert_eq!(test::call_service(&app, edit(other)).await.status(), StatusCode::FORBIDDEN);
        assert_eq!(test::call_service(&app, edit(admin)).await.status(), StatusCode::FORBIDDEN);
        let body: Value = test::call_and_read_body_json(&app, edit(author)).await;
        assert_eq!(body["body"], "street noise at night");
        let req = test::TestRequest::delete()
            .uri(&uri)
            .cookie(Memory::cookie(other))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
        let req = test::TestRequest::delete()
            .uri(&uri)
            .cookie(Memory::cookie(admin))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        let req = test::TestRequest::get()
            .uri(&format!("/api/listings/{}/notes", listing.id()))
            .cookie(Memory::cookie(author))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert!(body.as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn blank_notes_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (memory, services) = Memory::services(dir.path());
        let app = app!(services);
        let ref author = memory.join("henry", false);
        let listing = memory.seed(Listing::random(), Status::Active);
        let req = test::TestRequest::post()
            .uri(&format!("/api/listings/{}/notes", listing.id()))
            .cookie(Memory::cookie(author))
            .set_json(json!({ "body": "   " }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}

use super::*;
use actix_multipart::Multipart;
use actix_multipart::MultipartError;
use actix_web::HttpResponse;
use futures::StreamExt;
use hh_core::Error;
use hh_core::Unique;

fn malformed(e: MultipartError) -> Error {
    Error::invalid(format!("malformed upload: {}", e))
}

/// Buffer every file part. Oversized files are cut off just past the limit,
/// which is enough for validation to name them. Non-file parts are drained.
/// Too many files, or too many bytes overall, fail the whole upload.
async fn receive(payload: &mut Multipart) -> Result<Vec<Upload>, Error> {
    let mut uploads = Vec::new();
    let mut total = 0;
    while let Some(field) = payload.next().await {
        let mut field = field.map_err(malformed)?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let Some(name) = name else {
            while let Some(chunk) = field.next().await {
                chunk.map_err(malformed)?;
            }
            continue;
        };
        if uploads.len() == hh_core::MAX_PHOTOS_PER_UPLOAD {
            return Err(Error::invalid(format!(
                "at most {} photos per upload",
                hh_core::MAX_PHOTOS_PER_UPLOAD
            )));
        }
        let content_type = field
            .content_type()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_else(|| String::from("application/octet-stream"));
        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(malformed)?;
            if bytes.len() <= hh_core::MAX_PHOTO_BYTES {
                total += chunk.len();
                bytes.extend_from_slice(&chunk);
            }
            if total > hh_core::MAX_UPLOAD_BYTES {
                return Err(Error::invalid(format!(
                    "upload is too large (max {} MB in total)",
                    hh_core::MAX_UPLOAD_BYTES / (1024 * 1024)
                )));
            }
        }
        uploads.push(Upload {
            name,
            content_type,
            bytes,
        });
    }
    Ok(uploads)
}

/// All-or-nothing: every file is validated before the first is stored, and
/// the listing gains all new URLs in one write.
pub async fn upload(
    db: web::Data<dyn Listings>,
    store: web::Data<dyn ObjectStore>,
    auth: Auth,
    path: web::Path<String>,
    mut payload: Multipart,
) -> Result<HttpResponse, Error> {
    let listing = existing(db.get_ref(), &path).await?;
    let uploads = receive(&mut payload).await?;
    validate(&uploads)?;
    let mut urls = Vec::with_capacity(uploads.len());
    for upload in uploads.iter() {
        let ext = upload
            .extension()
            .ok_or_else(|| Error::invalid(format!("{}: unsupported file type", upload.name)))?;
        let key = format!("listings/{}/{}.{}", listing.id(), uuid::Uuid::now_v7(), ext);
        urls.push(store.store(&upload.bytes, &upload.content_type, &key).await?);
    }
    let listing = db
        .attach(listing.id(), &urls)
        .await?
        .ok_or_else(|| Error::missing("listing not found"))?;
    log::info!(
        "{} added {} photo(s) to listing {}",
        auth.claims().username(),
        urls.len(),
        listing.id()
    );
    Ok(HttpResponse::Ok().json(listing))
}

use super::*;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::http::header::ContentType;
use actix_web::http::header::LOCATION;

const LOGIN: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Sign in</title></head>
<body>
  <form id="login">
    <input name="username" autocomplete="username" placeholder="Username" required>
    <input name="password" type="password" autocomplete="current-password" placeholder="Password" required>
    <button type="submit">Sign in</button>
    <p id="error" hidden></p>
  </form>
  <script>
    document.getElementById("login").addEventListener("submit", async (e) => {
      e.preventDefault();
      const form = new FormData(e.target);
      const res = await fetch("/api/auth/login", {
        method: "POST",
        headers: { "content-type": "application/json" },
        body: JSON.stringify({ username: form.get("username"), password: form.get("password") }),
      });
      if (res.ok) return location.assign("/");
      const error = document.getElementById("error");
      error.textContent = (await res.json()).error;
      error.hidden = false;
    });
  </script>
</body>
</html>"#;

const HOME: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Housing</title></head>
<body>
  <main id="app"></main>
  <script>
    fetch("/api/auth/me").then((r) => r.json()).then((user) => {
      document.getElementById("app").textContent = user ? `Signed in as ${user.displayName}` : "";
    });
  </script>
</body>
</html>"#;

/// Login form. Visitors who already hold a valid session go straight home.
pub async fn login(auth: MaybeAuth) -> HttpResponse {
    match auth.claims() {
        Some(_) => HttpResponse::SeeOther()
            .insert_header((LOCATION, "/"))
            .finish(),
        None => HttpResponse::Ok()
            .content_type(ContentType::html())
            .body(LOGIN),
    }
}

pub async fn home(_: Auth) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(HOME)
}

pub async fn health(check: web::Data<dyn Check>) -> HttpResponse {
    match check.alive().await {
        true => HttpResponse::Ok().body("ok"),
        false => HttpResponse::ServiceUnavailable().body("database unavailable"),
    }
}

/// Unknown API route.
pub async fn missing(req: HttpRequest) -> Result<HttpResponse, hh_core::Error> {
    Err(hh_core::Error::missing(format!(
        "no route for {} {}",
        req.method(),
        req.path()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::*;
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_web::test]
    async fn login_page_is_public() {
        let dir = tempfile::tempdir().unwrap();
        let (_, services) = Memory::services(dir.path());
        let app = app!(services);
        let res = test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        assert!(std::str::from_utf8(&body).unwrap().contains("/api/auth/login"));
    }

    #[actix_web::test]
    async fn signed_in_visitors_skip_the_login_page() {
        let dir = tempfile::tempdir().unwrap();
        let (memory, services) = Memory::services(dir.path());
        let app = app!(services);
        let ref member = memory.join("henry", true);
        let req = test::TestRequest::get()
            .uri("/login")
            .cookie(Memory::cookie(member))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers().get(LOCATION).unwrap(), "/");
    }

    #[actix_web::test]
    async fn health_is_gated_like_any_page() {
        let dir = tempfile::tempdir().unwrap();
        let (memory, services) = Memory::services(dir.path());
        let app = app!(services);
        let res = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let ref member = memory.join("henry", false);
        let req = test::TestRequest::get()
            .uri("/health")
            .cookie(Memory::cookie(member))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn photos_follow_the_upload_mount() {
        let dir = tempfile::tempdir().unwrap();
        let (_, mut services) = Memory::services(dir.path());
        services.uploads = web::Data::new(hh_auth::Uploads::new("/media"));
        let app = app!(services);
        let req = test::TestRequest::get().uri("/media/listings/a.bin").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
        let req = test::TestRequest::get().uri("/uploads/listings/a.bin").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::SEE_OTHER);
    }

    #[actix_web::test]
    async fn unknown_api_routes_are_json_404s() {
        let dir = tempfile::tempdir().unwrap();
        let (memory, services) = Memory::services(dir.path());
        let app = app!(services);
        let ref member = memory.join("henry", false);
        let req = test::TestRequest::get()
            .uri("/api/nothing/here")
            .cookie(Memory::cookie(member))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["error"], "no route for GET /api/nothing/here");
    }
}

use super::*;
use actix_web::FromRequest;
use actix_web::HttpMessage;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::ResponseError;
use actix_web::body::BoxBody;
use actix_web::body::MessageBody;
use actix_web::dev::Payload;
use actix_web::dev::ServiceRequest;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::HeaderName;
use actix_web::http::header::HeaderValue;
use actix_web::http::header::LOCATION;
use actix_web::middleware::Next;
use actix_web::web;
use hh_core::Error;
use hh_core::ID;
use std::future::Ready;
use std::future::ready;

/// Request gate. Wrap the whole application with
/// `actix_web::middleware::from_fn(gatekeeper)`.
///
/// Identity headers sent by the client are always discarded. Admitted
/// requests get fresh ones derived from the verified token.
pub async fn gatekeeper(
    mut req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, actix_web::Error> {
    for name in IDENTITY_HEADERS {
        req.headers_mut().remove(name);
    }
    let crypto = req
        .app_data::<web::Data<Crypto>>()
        .cloned()
        .ok_or_else(|| Error::internal("token codec not configured"))?;
    let uploads = req
        .app_data::<web::Data<Uploads>>()
        .map(|u| u.get_ref().clone())
        .unwrap_or_default();
    let token = SessionCookie::read(&req);
    match gate(req.path(), &uploads, token.as_deref(), &crypto, hh_core::now()) {
        Verdict::Open => next
            .call(req)
            .await
            .map(ServiceResponse::map_into_boxed_body),
        Verdict::Admit(claims) => {
            stamp(&mut req, &claims);
            req.extensions_mut().insert(claims);
            next.call(req)
                .await
                .map(ServiceResponse::map_into_boxed_body)
        }
        Verdict::Redirect => {
            log::debug!("redirecting anonymous request for {}", req.path());
            Ok(req.into_response(
                HttpResponse::SeeOther()
                    .insert_header((LOCATION, hh_core::LOGIN_PAGE))
                    .finish(),
            ))
        }
        Verdict::Deny => {
            log::debug!("rejecting anonymous request for {}", req.path());
            Ok(req.into_response(Error::Unauthenticated.error_response()))
        }
    }
}

fn stamp(req: &mut ServiceRequest, claims: &Claims) {
    let values = [
        (USER_ID_HEADER, claims.user_id.to_string()),
        (USERNAME_HEADER, claims.username.clone()),
        (ADMIN_HEADER, claims.is_admin.to_string()),
    ];
    for (name, value) in values {
        match HeaderValue::from_str(&value) {
            Ok(value) => {
                req.headers_mut()
                    .insert(HeaderName::from_static(name), value);
            }
            Err(_) => log::warn!("identity header {} not representable", name),
        }
    }
}

/// Re-verify the session cookie of a request, independent of the gate.
fn verify(req: &HttpRequest) -> Result<Claims, Error> {
    let crypto = req
        .app_data::<web::Data<Crypto>>()
        .ok_or_else(|| Error::internal("token codec not configured"))?;
    SessionCookie::read(req)
        .and_then(|token| crypto.decode(&token))
        .ok_or(Error::Unauthenticated)
}

/// Extractor for authenticated requests.
/// Validates the session cookie itself rather than trusting gate headers.
pub struct Auth(pub Claims);

impl Auth {
    pub fn claims(&self) -> &Claims {
        &self.0
    }
    pub fn user(&self) -> ID<Member> {
        self.0.user()
    }
}

impl FromRequest for Auth {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;
    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(verify(req).map(Auth).map_err(actix_web::Error::from))
    }
}

/// Extractor for administrator-only requests.
pub struct Admin(pub Claims);

impl Admin {
    pub fn claims(&self) -> &Claims {
        &self.0
    }
    pub fn user(&self) -> ID<Member> {
        self.0.user()
    }
}

impl FromRequest for Admin {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;
    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            verify(req)
                .and_then(|claims| match claims.admin() {
                    true => Ok(Admin(claims)),
                    false => Err(Error::forbidden("administrator privileges required")),
                })
                .map_err(actix_web::Error::from),
        )
    }
}

/// Optional authentication extractor - does not fail if unauthenticated.
pub struct MaybeAuth(pub Option<Claims>);

impl MaybeAuth {
    pub fn claims(&self) -> Option<&Claims> {
        self.0.as_ref()
    }
    pub fn user(&self) -> Option<ID<Member>> {
        self.0.as_ref().map(|c| c.user())
    }
}

impl FromRequest for MaybeAuth {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;
    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(MaybeAuth(verify(req).ok())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::App;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::test;

    async fn echo(req: HttpRequest, auth: Auth) -> HttpResponse {
        let header = req
            .headers()
            .get(USERNAME_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        HttpResponse::Ok().body(format!("{}|{}", auth.claims().username(), header))
    }

    async fn sudo(admin: Admin) -> HttpResponse {
        HttpResponse::Ok().body(admin.claims().username().to_string())
    }

    fn member(admin: bool) -> Member {
        Member::new(ID::default(), "henry".into(), "Henry".into(), admin)
    }

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(Crypto::new(b"secret")))
                    .wrap(actix_web::middleware::from_fn(gatekeeper))
                    .route("/", web::get().to(|| async { HttpResponse::Ok().body("home") }))
                    .route("/login", web::get().to(|| async { HttpResponse::Ok().body("login") }))
                    .route("/api/echo", web::get().to(echo))
                    .route("/api/sudo", web::get().to(sudo)),
            )
            .await
        };
    }

    fn cookie(member: &Member) -> Cookie<'static> {
        let token = Crypto::new(b"secret").encode(&Claims::new(member)).unwrap();
        SessionCookie::new(false).bake(&token)
    }

    #[actix_web::test]
    async fn anonymous_pages_redirect_to_login() {
        let app = app!();
        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers().get(LOCATION).unwrap(), "/login");
        let res = test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn anonymous_api_calls_get_401_json() {
        let app = app!();
        let res = test::call_service(&app, test::TestRequest::get().uri("/api/echo").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["error"], "authentication required");
    }

    #[actix_web::test]
    async fn admitted_requests_carry_verified_headers() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/echo")
            .insert_header((USERNAME_HEADER, "mallory"))
            .cookie(cookie(&member(false)))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, "henry|henry");
    }

    #[actix_web::test]
    async fn admin_routes_need_the_flag() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/sudo")
            .cookie(cookie(&member(false)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
        let req = test::TestRequest::get()
            .uri("/api/sudo")
            .cookie(cookie(&member(true)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn handlers_reverify_without_the_gate() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Crypto::new(b"secret")))
                .route("/api/echo", web::get().to(echo)),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/api/echo")
            .insert_header((USERNAME_HEADER, "henry"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}

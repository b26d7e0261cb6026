use actix_web::HttpMessage;
use actix_web::HttpResponseBuilder;
use actix_web::cookie::Cookie;
use actix_web::cookie::SameSite;
use actix_web::http::header::COOKIE;
use hh_core::SESSION_COOKIE;
use hh_core::SESSION_TTL;

/// Carries the session token between browser and server in one cookie.
#[derive(Debug, Clone, Copy)]
pub struct SessionCookie {
    secure: bool,
}

impl SessionCookie {
    /// `secure` restricts the cookie to HTTPS and is set in production.
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }
    pub fn bake(&self, token: &str) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, token.to_owned())
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .path("/")
            .max_age(actix_web::cookie::time::Duration::seconds(
                SESSION_TTL.as_secs() as i64,
            ))
            .finish()
    }
    pub fn attach(&self, response: &mut HttpResponseBuilder, token: &str) {
        response.cookie(self.bake(token));
    }
    pub fn clear(&self, response: &mut HttpResponseBuilder) {
        let mut cookie = self.bake("");
        cookie.make_removal();
        response.cookie(cookie);
    }
    /// Token from the request, if any. Absence is the anonymous case.
    pub fn read(request: &impl HttpMessage) -> Option<String> {
        request
            .headers()
            .get_all(COOKIE)
            .filter_map(|header| header.to_str().ok())
            .flat_map(|header| header.split(';'))
            .filter_map(|pair| Cookie::parse(pair.trim()).ok())
            .find(|cookie| cookie.name() == SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::HttpResponse;
    use actix_web::test::TestRequest;

    #[test]
    fn cookie_attributes() {
        let cookie = SessionCookie::new(true).bake("abc");
        assert_eq!(cookie.name(), "housing_session");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(
            cookie.max_age(),
            Some(actix_web::cookie::time::Duration::seconds(604800))
        );
        assert_eq!(SessionCookie::new(false).bake("abc").secure(), Some(false));
    }

    #[test]
    fn attach_sets_header() {
        let mut response = HttpResponse::Ok();
        SessionCookie::new(false).attach(&mut response, "abc");
        let response = response.finish();
        let cookie = response.cookies().next().unwrap();
        assert_eq!(cookie.value(), "abc");
    }

    #[test]
    fn clear_expires_cookie() {
        let mut response = HttpResponse::Ok();
        SessionCookie::new(false).clear(&mut response);
        let response = response.finish();
        let cookie = response.cookies().next().unwrap();
        assert_eq!(cookie.name(), "housing_session");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(actix_web::cookie::time::Duration::ZERO));
    }

    #[test]
    fn read_is_optional() {
        let anonymous = TestRequest::default().to_http_request();
        assert_eq!(SessionCookie::read(&anonymous), None);
        let signed = TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE, "abc"))
            .to_http_request();
        assert_eq!(SessionCookie::read(&signed), Some("abc".to_string()));
    }

    #[test]
    fn read_finds_the_session_among_others() {
        let shared = TestRequest::default()
            .insert_header((COOKIE, "theme=dark; housing_session=abc; lang=en"))
            .to_http_request();
        assert_eq!(SessionCookie::read(&shared), Some("abc".to_string()));
        let service = TestRequest::default()
            .append_header((COOKIE, "theme=dark"))
            .append_header((COOKIE, "housing_session=xyz"))
            .to_srv_request();
        assert_eq!(SessionCookie::read(&service), Some("xyz".to_string()));
        let blank = TestRequest::default()
            .insert_header((COOKIE, "housing_session="))
            .to_http_request();
        assert_eq!(SessionCookie::read(&blank), None);
    }
}

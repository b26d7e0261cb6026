use super::*;
use actix_web::HttpResponse;
use actix_web::web;
use hh_core::Error;
use hh_core::ID;
use hh_core::Unique;
use std::sync::LazyLock;

/// Digest verified against when the username is unknown, so that both
/// failure paths cost one Argon2 run.
static DECOY: LazyLock<String> =
    LazyLock::new(|| password::hash("decoy password").unwrap_or_default());

async fn digest(plaintext: String) -> Result<String, Error> {
    web::block(move || password::hash(&plaintext))
        .await
        .map_err(|e| Error::internal(e.to_string()))?
        .map_err(|e| Error::internal(e.to_string()))
}

async fn matches(plaintext: String, hashword: String) -> Result<bool, Error> {
    web::block(move || password::verify(&plaintext, &hashword))
        .await
        .map_err(|e| Error::internal(e.to_string()))
        .map(|verdict| {
            verdict.unwrap_or_else(|e| {
                log::warn!("stored digest rejected: {}", e);
                false
            })
        })
}

fn success() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "success": true }))
}

fn user(raw: &str) -> Result<ID<Member>, Error> {
    ID::parse(raw).ok_or_else(|| Error::missing("user not found"))
}

pub async fn login(
    db: web::Data<dyn Credentials>,
    crypto: web::Data<Crypto>,
    cookie: web::Data<SessionCookie>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, Error> {
    let Login { username, password } = Login::try_from(req.into_inner())?;
    let (member, hashword) = match db.lookup(&username).await? {
        Some((member, hashword)) => (Some(member), hashword),
        None => (None, DECOY.clone()),
    };
    let verified = matches(password, hashword).await?;
    let member = member.filter(|_| verified).ok_or_else(|| {
        log::info!("failed login for {}", username);
        Error::Rejected
    })?;
    let token = crypto
        .encode(&Claims::new(&member))
        .map_err(|e| Error::internal(e.to_string()))?;
    log::info!("{} logged in", member.username());
    let mut response = HttpResponse::Ok();
    cookie.attach(&mut response, &token);
    Ok(response.json(AuthResponse {
        user: UserInfo::from(&member),
    }))
}

pub async fn logout(cookie: web::Data<SessionCookie>) -> HttpResponse {
    let mut response = HttpResponse::Ok();
    cookie.clear(&mut response);
    response.json(serde_json::json!({ "success": true }))
}

/// Live view of the caller. The token may outlive its account, in which case
/// the answer is `null`.
pub async fn me(db: web::Data<dyn Credentials>, auth: MaybeAuth) -> Result<HttpResponse, Error> {
    let member = match auth.user() {
        Some(id) => db.member(id).await?,
        None => None,
    };
    Ok(HttpResponse::Ok().json(member.as_ref().map(UserInfo::from)))
}

pub async fn change_password(
    db: web::Data<dyn Credentials>,
    auth: Auth,
    req: web::Json<PasswordRequest>,
) -> Result<HttpResponse, Error> {
    let change = PasswordChange::try_from(req.into_inner())?;
    let hashword = db
        .hashword(auth.user())
        .await?
        .ok_or(Error::Unauthenticated)?;
    if !matches(change.current, hashword).await? {
        return Err(Error::Rejected);
    }
    db.rehash(auth.user(), &digest(change.replacement).await?)
        .await?;
    log::info!("{} changed their password", auth.claims().username());
    Ok(success())
}

pub async fn list_users(db: web::Data<dyn Credentials>, _: Admin) -> Result<HttpResponse, Error> {
    let users = db.members().await?;
    Ok(HttpResponse::Ok().json(users.iter().map(UserInfo::from).collect::<Vec<_>>()))
}

pub async fn create_user(
    db: web::Data<dyn Credentials>,
    admin: Admin,
    req: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, Error> {
    let NewUser { member, password } = NewUser::try_from(req.into_inner())?;
    db.create(&member, &digest(password).await?).await?;
    log::info!(
        "{} created account {}",
        admin.claims().username(),
        member.username()
    );
    Ok(HttpResponse::Created().json(UserInfo::from(&member)))
}

pub async fn update_user(
    db: web::Data<dyn Credentials>,
    admin: Admin,
    path: web::Path<String>,
    req: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, Error> {
    let id = user(&path)?;
    let patch = UserPatch::try_from(req.into_inner())?;
    if id == admin.user() && patch.admin == Some(false) {
        return Err(Error::invalid(
            "cannot remove your own administrator privileges",
        ));
    }
    let mut member = db
        .member(id)
        .await?
        .ok_or_else(|| Error::missing("user not found"))?;
    if let Some(display) = patch.display {
        member.rename(display);
    }
    if let Some(flag) = patch.admin {
        member.promote(flag);
    }
    let hashword = match patch.password {
        Some(plaintext) => Some(digest(plaintext).await?),
        None => None,
    };
    db.update(&member, hashword.as_deref()).await?;
    Ok(HttpResponse::Ok().json(UserInfo::from(&member)))
}

pub async fn delete_user(
    db: web::Data<dyn Credentials>,
    admin: Admin,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let id = user(&path)?;
    if id == admin.user() {
        return Err(Error::invalid("cannot delete your own account"));
    }
    match db.delete(id).await? {
        true => Ok(success()),
        false => Err(Error::missing("user not found")),
    }
}

/// Create the first administrator when the credential table is empty.
pub async fn bootstrap(db: &dyn Credentials, username: &str, plaintext: &str) -> Result<(), Error> {
    if db.headcount().await? > 0 {
        return Ok(());
    }
    let NewUser { member, password } = NewUser::try_from(CreateUserRequest {
        username: username.to_string(),
        password: plaintext.to_string(),
        display_name: None,
        is_admin: true,
    })?;
    db.create(&member, &digest(password).await?).await?;
    log::info!("bootstrapped administrator {}", member.username());
    Ok(())
}

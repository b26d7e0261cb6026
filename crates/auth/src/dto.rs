use super::*;
use hh_core::Error;
use hh_core::ID;
use hh_core::Unique;
use serde::Deserialize;
use serde::Serialize;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub display_name: Option<String>,
    pub is_admin: Option<bool>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub user: UserInfo,
}

/// Sanitized projection of a member. Never carries the password digest.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub is_admin: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Member> for UserInfo {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id().to_string(),
            username: member.username().to_string(),
            display_name: member.display().to_string(),
            is_admin: member.is_admin(),
            created_at: member.created(),
        }
    }
}

/// Validated login input.
pub struct Login {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for Login {
    type Error = Error;
    fn try_from(req: LoginRequest) -> Result<Self, Self::Error> {
        let username = hh_core::normalize(&req.username);
        match (username.is_empty(), req.password.is_empty()) {
            (true, _) => Err(Error::invalid("username is required")),
            (_, true) => Err(Error::invalid("password is required")),
            _ => Ok(Self {
                username,
                password: req.password,
            }),
        }
    }
}

/// Validated self-service password change.
pub struct PasswordChange {
    pub current: String,
    pub replacement: String,
}

impl TryFrom<PasswordRequest> for PasswordChange {
    type Error = Error;
    fn try_from(req: PasswordRequest) -> Result<Self, Self::Error> {
        if req.current_password.is_empty() {
            return Err(Error::invalid("current password is required"));
        }
        Ok(Self {
            current: req.current_password,
            replacement: strong(req.new_password)?,
        })
    }
}

/// Validated account creation: the member plus its plaintext password.
pub struct NewUser {
    pub member: Member,
    pub password: String,
}

impl TryFrom<CreateUserRequest> for NewUser {
    type Error = Error;
    fn try_from(req: CreateUserRequest) -> Result<Self, Self::Error> {
        let username = username(&req.username)?;
        let password = strong(req.password)?;
        let display = req
            .display_name
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| req.username.trim().to_string());
        Ok(Self {
            member: Member::new(ID::default(), username, display, req.is_admin),
            password,
        })
    }
}

/// Validated partial account update.
pub struct UserPatch {
    pub display: Option<String>,
    pub admin: Option<bool>,
    pub password: Option<String>,
}

impl TryFrom<UpdateUserRequest> for UserPatch {
    type Error = Error;
    fn try_from(req: UpdateUserRequest) -> Result<Self, Self::Error> {
        let display = match req.display_name.map(|d| d.trim().to_string()) {
            Some(d) if d.is_empty() => return Err(Error::invalid("display name cannot be empty")),
            other => other,
        };
        Ok(Self {
            display,
            admin: req.is_admin,
            password: req.password.map(strong).transpose()?,
        })
    }
}

fn username(raw: &str) -> Result<String, Error> {
    let name = hh_core::normalize(raw);
    if name.len() < hh_core::MIN_USERNAME_LEN || name.len() > hh_core::MAX_USERNAME_LEN {
        return Err(Error::invalid(format!(
            "username must be {}-{} characters",
            hh_core::MIN_USERNAME_LEN,
            hh_core::MAX_USERNAME_LEN
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(Error::invalid(
            "username may only contain letters, digits, '.', '_' and '-'",
        ));
    }
    Ok(name)
}

fn strong(password: String) -> Result<String, Error> {
    match password.chars().count() >= hh_core::MIN_PASSWORD_LEN {
        true => Ok(password),
        false => Err(Error::invalid(format!(
            "password must be at least {} characters",
            hh_core::MIN_PASSWORD_LEN
        ))),
    }
}

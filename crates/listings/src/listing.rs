use hh_auth::Member;
use hh_core::Arbitrary;
use hh_core::ID;
use hh_core::Unique;
use serde::Deserialize;
use serde::Serialize;

/// Lifecycle of a listing. At most one listing is ever `Selected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Active,
    Selected,
    Archived,
}

impl Status {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Selected => "SELECTED",
            Self::Archived => "ARCHIVED",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Status {
    type Error = hh_core::Error;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(Self::Active),
            "SELECTED" => Ok(Self::Selected),
            "ARCHIVED" => Ok(Self::Archived),
            other => Err(hh_core::Error::invalid(format!(
                "unknown status '{}'",
                other
            ))),
        }
    }
}

/// A rental listing under consideration by the household.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ID<Listing>,
    pub title: String,
    pub url: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub monthly_rent: Option<f64>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<f64>,
    pub square_feet: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photos: Vec<String>,
    pub status: Status,
    pub created_by: ID<Member>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Listing {
    pub fn located(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now();
    }
}

impl Unique for Listing {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

impl Arbitrary for Listing {
    fn random() -> Self {
        use rand::Rng;
        let ref mut rng = rand::rng();
        let now = chrono::Utc::now();
        Self {
            id: ID::default(),
            title: format!("Listing {}", rng.random_range(100..1000)),
            url: None,
            address: None,
            description: None,
            monthly_rent: Some(rng.random_range(8..40) as f64 * 100.),
            bedrooms: Some(rng.random_range(1..5)),
            bathrooms: Some(rng.random_range(1..3) as f64),
            square_feet: None,
            latitude: None,
            longitude: None,
            photos: Vec::new(),
            status: Status::Active,
            created_by: ID::random(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use hh_database::*;

    impl Schema for Listing {
        fn name() -> &'static str {
            LISTINGS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                LISTINGS,
                " (
                    id            UUID PRIMARY KEY,
                    title         TEXT NOT NULL,
                    url           TEXT,
                    address       TEXT,
                    description   TEXT,
                    monthly_rent  DOUBLE PRECISION,
                    bedrooms      INTEGER,
                    bathrooms     DOUBLE PRECISION,
                    square_feet   INTEGER,
                    latitude      DOUBLE PRECISION,
                    longitude     DOUBLE PRECISION,
                    photos        TEXT[] NOT NULL DEFAULT '{}',
                    status        TEXT NOT NULL DEFAULT 'ACTIVE'
                                  CHECK (status IN ('ACTIVE', 'SELECTED', 'ARCHIVED')),
                    created_by    UUID NOT NULL,
                    created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
                    updated_at    TIMESTAMPTZ NOT NULL DEFAULT now()
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_listings_status  ON ",
                LISTINGS,
                " (status);
                 CREATE INDEX IF NOT EXISTS idx_listings_created ON ",
                LISTINGS,
                " (created_at);"
            )
        }
    }
}

use hh_auth::Member;
use hh_core::ID;
use serde::Serialize;

/// One member's search criteria.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub user_id: ID<Member>,
    pub max_rent: Option<f64>,
    pub min_bedrooms: Option<i32>,
    pub must_haves: Vec<String>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Preferences {
    /// Criteria of a member who has not saved any yet.
    pub fn empty(user: ID<Member>) -> Self {
        Self {
            user_id: user,
            max_rent: None,
            min_bedrooms: None,
            must_haves: Vec::new(),
            updated_at: None,
        }
    }
}

/// One member's rating of a neighbourhood. Unique per (member, area name).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaPreference {
    pub user_id: ID<Member>,
    pub area_name: String,
    pub rating: i16,
    pub notes: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use hh_database::*;

    impl Schema for Preferences {
        fn name() -> &'static str {
            PREFERENCES
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                PREFERENCES,
                " (
                    user_id       UUID PRIMARY KEY REFERENCES ",
                USERS,
                " (id) ON DELETE CASCADE,
                    max_rent      DOUBLE PRECISION,
                    min_bedrooms  INTEGER,
                    must_haves    TEXT[] NOT NULL DEFAULT '{}',
                    updated_at    TIMESTAMPTZ
                );"
            )
        }
        fn indices() -> &'static str {
            ""
        }
    }

    impl Schema for AreaPreference {
        fn name() -> &'static str {
            AREAS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                AREAS,
                " (
                    user_id     UUID NOT NULL REFERENCES ",
                USERS,
                " (id) ON DELETE CASCADE,
                    area_name   TEXT NOT NULL,
                    rating      SMALLINT NOT NULL CHECK (rating BETWEEN 1 AND 5),
                    notes       TEXT,
                    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
                    UNIQUE (user_id, area_name)
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_areas_user ON ",
                AREAS,
                " (user_id);"
            )
        }
    }
}

use super::*;
use hh_auth::Member;
use hh_core::ID;
use hh_core::Unique;
use serde::Serialize;

/// A scheduled or completed visit to a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewing {
    pub id: ID<Viewing>,
    pub listing_id: ID<Listing>,
    pub scheduled_at: chrono::DateTime<chrono::Utc>,
    pub notes: Option<String>,
    pub completed: bool,
    pub created_by: ID<Member>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Unique for Viewing {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use hh_database::*;

    impl Schema for Viewing {
        fn name() -> &'static str {
            VIEWINGS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                VIEWINGS,
                " (
                    id            UUID PRIMARY KEY,
                    listing_id    UUID NOT NULL REFERENCES ",
                LISTINGS,
                " (id) ON DELETE CASCADE,
                    scheduled_at  TIMESTAMPTZ NOT NULL,
                    notes         TEXT,
                    completed     BOOLEAN NOT NULL DEFAULT FALSE,
                    created_by    UUID NOT NULL,
                    created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_viewings_listing ON ",
                VIEWINGS,
                " (listing_id, scheduled_at);"
            )
        }
    }
}

use super::*;
use hh_auth::Member;
use hh_core::ID;
use hh_core::Unique;
use serde::Serialize;

/// Free-text remark left by one member on a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: ID<Note>,
    pub listing_id: ID<Listing>,
    pub author_id: ID<Member>,
    pub body: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Note {
    pub fn authored_by(&self, member: ID<Member>) -> bool {
        self.author_id == member
    }
}

impl Unique for Note {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use hh_database::*;

    impl Schema for Note {
        fn name() -> &'static str {
            NOTES
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                NOTES,
                " (
                    id          UUID PRIMARY KEY,
                    listing_id  UUID NOT NULL REFERENCES ",
                LISTINGS,
                " (id) ON DELETE CASCADE,
                    author_id   UUID NOT NULL,
                    body        TEXT NOT NULL,
                    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
                    updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_notes_listing ON ",
                NOTES,
                " (listing_id, created_at);"
            )
        }
    }
}

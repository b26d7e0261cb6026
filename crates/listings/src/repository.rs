use super::*;
use hh_auth::Member;
use hh_core::Error;
use hh_core::ID;
use hh_core::Unique;
use hh_database::*;
use std::sync::Arc;
use tokio_postgres::Client;
use tokio_postgres::Row;

/// Listing pool operations, together with everything hanging off a listing.
#[async_trait::async_trait]
pub trait Listings: Send + Sync {
    async fn listings(&self, status: Option<Status>) -> Result<Vec<Listing>, Error>;
    async fn listing(&self, id: ID<Listing>) -> Result<Option<Listing>, Error>;
    async fn insert(&self, listing: &Listing) -> Result<(), Error>;
    /// Write the editable fields. Status is only written when `status` is
    /// set, so a concurrent select is never undone. `None` if the listing
    /// does not exist.
    async fn update(&self, listing: &Listing, status: Option<Status>) -> Result<Option<Listing>, Error>;
    async fn remove(&self, id: ID<Listing>) -> Result<bool, Error>;
    /// Mark `id` selected and archive every other active or selected listing
    /// in one atomic step. `None` if the listing does not exist.
    async fn select(&self, id: ID<Listing>) -> Result<Option<Listing>, Error>;
    /// Append photo URLs in one write. `None` if the listing does not exist.
    async fn attach(&self, id: ID<Listing>, urls: &[String]) -> Result<Option<Listing>, Error>;

    async fn viewings(&self, listing: ID<Listing>) -> Result<Vec<Viewing>, Error>;
    async fn viewing(&self, id: ID<Viewing>) -> Result<Option<Viewing>, Error>;
    async fn schedule(&self, viewing: &Viewing) -> Result<(), Error>;
    async fn reschedule(&self, viewing: &Viewing) -> Result<(), Error>;
    async fn cancel(&self, id: ID<Viewing>) -> Result<bool, Error>;

    async fn notes(&self, listing: ID<Listing>) -> Result<Vec<Note>, Error>;
    async fn note(&self, id: ID<Note>) -> Result<Option<Note>, Error>;
    async fn annotate(&self, note: &Note) -> Result<(), Error>;
    async fn revise(&self, note: &Note) -> Result<(), Error>;
    async fn erase(&self, id: ID<Note>) -> Result<bool, Error>;

    async fn score(&self, listing: ID<Listing>) -> Result<Option<Score>, Error>;
    async fn rate(&self, score: &Score) -> Result<(), Error>;
}

/// Per-member preferences and the shared budget.
#[async_trait::async_trait]
pub trait Household: Send + Sync {
    async fn preferences(&self, user: ID<Member>) -> Result<Option<Preferences>, Error>;
    async fn prefer(&self, preferences: &Preferences) -> Result<(), Error>;

    async fn areas(&self, user: ID<Member>) -> Result<Vec<AreaPreference>, Error>;
    async fn area(&self, user: ID<Member>, name: &str) -> Result<Option<AreaPreference>, Error>;
    /// Conflict if the member already rated an area of this name.
    async fn add_area(&self, area: &AreaPreference) -> Result<(), Error>;
    async fn update_area(&self, area: &AreaPreference) -> Result<(), Error>;
    async fn remove_area(&self, user: ID<Member>, name: &str) -> Result<bool, Error>;

    async fn budget(&self) -> Result<Option<Budget>, Error>;
    async fn set_budget(&self, budget: &Budget) -> Result<(), Error>;
}

// ============================================================================
// ROW MAPPING
// ============================================================================
const LISTING_COLUMNS: &str = "id, title, url, address, description, monthly_rent, bedrooms, \
     bathrooms, square_feet, latitude, longitude, photos, status, created_by, created_at, updated_at";
const VIEWING_COLUMNS: &str =
    "id, listing_id, scheduled_at, notes, completed, created_by, created_at";
const NOTE_COLUMNS: &str = "id, listing_id, author_id, body, created_at, updated_at";
const SCORE_COLUMNS: &str =
    "listing_id, ai_overall_score, manual_override_score, updated_by, updated_at";
const AREA_COLUMNS: &str = "user_id, area_name, rating, notes, created_at";

fn id<T>(row: &Row, column: &str) -> ID<T> {
    ID::from(row.get::<_, uuid::Uuid>(column))
}

fn listing(row: &Row) -> Result<Listing, Error> {
    Ok(Listing {
        id: id(row, "id"),
        title: row.get("title"),
        url: row.get("url"),
        address: row.get("address"),
        description: row.get("description"),
        monthly_rent: row.get("monthly_rent"),
        bedrooms: row.get("bedrooms"),
        bathrooms: row.get("bathrooms"),
        square_feet: row.get("square_feet"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        photos: row.get("photos"),
        status: Status::try_from(row.get::<_, &str>("status"))
            .map_err(|e| Error::internal(e.to_string()))?,
        created_by: id(row, "created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn listings(rows: Vec<Row>) -> Result<Vec<Listing>, Error> {
    rows.iter().map(listing).collect()
}

fn viewing(row: &Row) -> Viewing {
    Viewing {
        id: id(row, "id"),
        listing_id: id(row, "listing_id"),
        scheduled_at: row.get("scheduled_at"),
        notes: row.get("notes"),
        completed: row.get("completed"),
        created_by: id(row, "created_by"),
        created_at: row.get("created_at"),
    }
}

fn note(row: &Row) -> Note {
    Note {
        id: id(row, "id"),
        listing_id: id(row, "listing_id"),
        author_id: id(row, "author_id"),
        body: row.get("body"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn score(row: &Row) -> Score {
    Score {
        listing_id: id(row, "listing_id"),
        ai_overall_score: row.get("ai_overall_score"),
        manual_override_score: row.get("manual_override_score"),
        updated_by: row.get::<_, Option<uuid::Uuid>>("updated_by").map(ID::from),
        updated_at: row.get("updated_at"),
    }
}

fn area(row: &Row) -> AreaPreference {
    AreaPreference {
        user_id: id(row, "user_id"),
        area_name: row.get("area_name"),
        rating: row.get("rating"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
    }
}

// ============================================================================
// POSTGRES
// ============================================================================
#[async_trait::async_trait]
impl Listings for Arc<Client> {
    async fn listings(&self, status: Option<Status>) -> Result<Vec<Listing>, Error> {
        const SQL: &str = const_format::concatcp!(
            "SELECT ",
            LISTING_COLUMNS,
            " FROM ",
            LISTINGS,
            " WHERE ($1::TEXT IS NULL OR status = $1) ORDER BY created_at DESC"
        );
        let status = status.map(|s| s.as_str());
        self.query(SQL, &[&status])
            .await
            .map_err(fail)
            .and_then(listings)
    }

    async fn listing(&self, id: ID<Listing>) -> Result<Option<Listing>, Error> {
        const SQL: &str = const_format::concatcp!(
            "SELECT ",
            LISTING_COLUMNS,
            " FROM ",
            LISTINGS,
            " WHERE id = $1"
        );
        self.query_opt(SQL, &[&id.inner()])
            .await
            .map_err(fail)?
            .as_ref()
            .map(listing)
            .transpose()
    }

    async fn insert(&self, listing: &Listing) -> Result<(), Error> {
        const SQL: &str = const_format::concatcp!(
            "INSERT INTO ",
            LISTINGS,
            " (",
            LISTING_COLUMNS,
            ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)"
        );
        self.execute(
            SQL,
            &[
                &listing.id().inner(),
                &listing.title,
                &listing.url,
                &listing.address,
                &listing.description,
                &listing.monthly_rent,
                &listing.bedrooms,
                &listing.bathrooms,
                &listing.square_feet,
                &listing.latitude,
                &listing.longitude,
                &listing.photos,
                &listing.status.as_str(),
                &listing.created_by.inner(),
                &listing.created_at,
                &listing.updated_at,
            ],
        )
        .await
        .map(|_| ())
        .map_err(fail)
    }

    async fn update(&self, listing: &Listing, status: Option<Status>) -> Result<Option<Listing>, Error> {
        const SQL: &str = const_format::concatcp!(
            "UPDATE ",
            LISTINGS,
            " SET title = $2, url = $3, address = $4, description = $5, monthly_rent = $6,
                  bedrooms = $7, bathrooms = $8, square_feet = $9, latitude = $10,
                  longitude = $11, status = COALESCE($12::TEXT, status), updated_at = $13
              WHERE id = $1
              RETURNING ",
            LISTING_COLUMNS
        );
        let status = status.map(|s| s.as_str());
        self.query_opt(
            SQL,
            &[
                &listing.id().inner(),
                &listing.title,
                &listing.url,
                &listing.address,
                &listing.description,
                &listing.monthly_rent,
                &listing.bedrooms,
                &listing.bathrooms,
                &listing.square_feet,
                &listing.latitude,
                &listing.longitude,
                &status,
                &listing.updated_at,
            ],
        )
        .await
        .map_err(fail)?
        .as_ref()
        .map(self::listing)
        .transpose()
    }

    async fn remove(&self, id: ID<Listing>) -> Result<bool, Error> {
        const SQL: &str = const_format::concatcp!("DELETE FROM ", LISTINGS, " WHERE id = $1");
        self.execute(SQL, &[&id.inner()])
            .await
            .map(|n| n > 0)
            .map_err(fail)
    }

    async fn select(&self, id: ID<Listing>) -> Result<Option<Listing>, Error> {
        // rows locked by a concurrent select are re-checked after it commits,
        // so the later commit wins and nothing is left half-selected
        const SQL: &str = const_format::concatcp!(
            "UPDATE ",
            LISTINGS,
            " SET status = CASE WHEN id = $1 THEN 'SELECTED' ELSE 'ARCHIVED' END,
                  updated_at = now()
              WHERE (id = $1 OR status IN ('ACTIVE', 'SELECTED'))
                AND EXISTS (SELECT 1 FROM ",
            LISTINGS,
            " WHERE id = $1)
              RETURNING ",
            LISTING_COLUMNS
        );
        let rows = self.query(SQL, &[&id.inner()]).await.map_err(fail)?;
        log::debug!("selecting {} touched {} listings", id, rows.len());
        rows.iter()
            .find(|row| row.get::<_, uuid::Uuid>("id") == id.inner())
            .map(listing)
            .transpose()
    }

    async fn attach(&self, id: ID<Listing>, urls: &[String]) -> Result<Option<Listing>, Error> {
        const SQL: &str = const_format::concatcp!(
            "UPDATE ",
            LISTINGS,
            " SET photos = photos || $2, updated_at = now() WHERE id = $1 RETURNING ",
            LISTING_COLUMNS
        );
        self.query_opt(SQL, &[&id.inner(), &urls])
            .await
            .map_err(fail)?
            .as_ref()
            .map(listing)
            .transpose()
    }

    async fn viewings(&self, listing: ID<Listing>) -> Result<Vec<Viewing>, Error> {
        const SQL: &str = const_format::concatcp!(
            "SELECT ",
            VIEWING_COLUMNS,
            " FROM ",
            VIEWINGS,
            " WHERE listing_id = $1 ORDER BY scheduled_at"
        );
        self.query(SQL, &[&listing.inner()])
            .await
            .map(|rows| rows.iter().map(viewing).collect())
            .map_err(fail)
    }

    async fn viewing(&self, id: ID<Viewing>) -> Result<Option<Viewing>, Error> {
        const SQL: &str = const_format::concatcp!(
            "SELECT ",
            VIEWING_COLUMNS,
            " FROM ",
            VIEWINGS,
            " WHERE id = $1"
        );
        self.query_opt(SQL, &[&id.inner()])
            .await
            .map(|opt| opt.as_ref().map(viewing))
            .map_err(fail)
    }

    async fn schedule(&self, viewing: &Viewing) -> Result<(), Error> {
        const SQL: &str = const_format::concatcp!(
            "INSERT INTO ",
            VIEWINGS,
            " (",
            VIEWING_COLUMNS,
            ") VALUES ($1, $2, $3, $4, $5, $6, $7)"
        );
        self.execute(
            SQL,
            &[
                &viewing.id().inner(),
                &viewing.listing_id.inner(),
                &viewing.scheduled_at,
                &viewing.notes,
                &viewing.completed,
                &viewing.created_by.inner(),
                &viewing.created_at,
            ],
        )
        .await
        .map(|_| ())
        .map_err(fail)
    }

    async fn reschedule(&self, viewing: &Viewing) -> Result<(), Error> {
        const SQL: &str = const_format::concatcp!(
            "UPDATE ",
            VIEWINGS,
            " SET scheduled_at = $2, notes = $3, completed = $4 WHERE id = $1"
        );
        self.execute(
            SQL,
            &[
                &viewing.id().inner(),
                &viewing.scheduled_at,
                &viewing.notes,
                &viewing.completed,
            ],
        )
        .await
        .map(|_| ())
        .map_err(fail)
    }

    async fn cancel(&self, id: ID<Viewing>) -> Result<bool, Error> {
        const SQL: &str = const_format::concatcp!("DELETE FROM ", VIEWINGS, " WHERE id = $1");
        self.execute(SQL, &[&id.inner()])
            .await
            .map(|n| n > 0)
            .map_err(fail)
    }

    async fn notes(&self, listing: ID<Listing>) -> Result<Vec<Note>, Error> {
        const SQL: &str = const_format::concatcp!(
            "SELECT ",
            NOTE_COLUMNS,
            " FROM ",
            NOTES,
            " WHERE listing_id = $1 ORDER BY created_at"
        );
        self.query(SQL, &[&listing.inner()])
            .await
            .map(|rows| rows.iter().map(note).collect())
            .map_err(fail)
    }

    async fn note(&self, id: ID<Note>) -> Result<Option<Note>, Error> {
        const SQL: &str =
            const_format::concatcp!("SELECT ", NOTE_COLUMNS, " FROM ", NOTES, " WHERE id = $1");
        self.query_opt(SQL, &[&id.inner()])
            .await
            .map(|opt| opt.as_ref().map(note))
            .map_err(fail)
    }

    async fn annotate(&self, note: &Note) -> Result<(), Error> {
        const SQL: &str = const_format::concatcp!(
            "INSERT INTO ",
            NOTES,
            " (",
            NOTE_COLUMNS,
            ") VALUES ($1, $2, $3, $4, $5, $6)"
        );
        self.execute(
            SQL,
            &[
                &note.id().inner(),
                &note.listing_id.inner(),
                &note.author_id.inner(),
                &note.body,
                &note.created_at,
                &note.updated_at,
            ],
        )
        .await
        .map(|_| ())
        .map_err(fail)
    }

    async fn revise(&self, note: &Note) -> Result<(), Error> {
        const SQL: &str = const_format::concatcp!(
            "UPDATE ",
            NOTES,
            " SET body = $2, updated_at = $3 WHERE id = $1"
        );
        self.execute(SQL, &[&note.id().inner(), &note.body, &note.updated_at])
            .await
            .map(|_| ())
            .map_err(fail)
    }

    async fn erase(&self, id: ID<Note>) -> Result<bool, Error> {
        const SQL: &str = const_format::concatcp!("DELETE FROM ", NOTES, " WHERE id = $1");
        self.execute(SQL, &[&id.inner()])
            .await
            .map(|n| n > 0)
            .map_err(fail)
    }

    async fn score(&self, listing: ID<Listing>) -> Result<Option<Score>, Error> {
        const SQL: &str = const_format::concatcp!(
            "SELECT ",
            SCORE_COLUMNS,
            " FROM ",
            SCORES,
            " WHERE listing_id = $1"
        );
        self.query_opt(SQL, &[&listing.inner()])
            .await
            .map(|opt| opt.as_ref().map(score))
            .map_err(fail)
    }

    async fn rate(&self, score: &Score) -> Result<(), Error> {
        const SQL: &str = const_format::concatcp!(
            "INSERT INTO ",
            SCORES,
            " (",
            SCORE_COLUMNS,
            ") VALUES ($1, $2, $3, $4, $5)
              ON CONFLICT (listing_id) DO UPDATE SET
                  ai_overall_score      = EXCLUDED.ai_overall_score,
                  manual_override_score = EXCLUDED.manual_override_score,
                  updated_by            = EXCLUDED.updated_by,
                  updated_at            = EXCLUDED.updated_at"
        );
        self.execute(
            SQL,
            &[
                &score.listing_id.inner(),
                &score.ai_overall_score,
                &score.manual_override_score,
                &score.updated_by.map(|u| u.inner()),
                &score.updated_at,
            ],
        )
        .await
        .map(|_| ())
        .map_err(fail)
    }
}

#[async_trait::async_trait]
impl Household for Arc<Client> {
    async fn preferences(&self, user: ID<Member>) -> Result<Option<Preferences>, Error> {
        const SQL: &str = const_format::concatcp!(
            "SELECT user_id, max_rent, min_bedrooms, must_haves, updated_at FROM ",
            PREFERENCES,
            " WHERE user_id = $1"
        );
        self.query_opt(SQL, &[&user.inner()])
            .await
            .map(|opt| {
                opt.map(|ref row| Preferences {
                    user_id: id(row, "user_id"),
                    max_rent: row.get("max_rent"),
                    min_bedrooms: row.get("min_bedrooms"),
                    must_haves: row.get("must_haves"),
                    updated_at: row.get("updated_at"),
                })
            })
            .map_err(fail)
    }

    async fn prefer(&self, preferences: &Preferences) -> Result<(), Error> {
        const SQL: &str = const_format::concatcp!(
            "INSERT INTO ",
            PREFERENCES,
            " (user_id, max_rent, min_bedrooms, must_haves, updated_at) VALUES ($1, $2, $3, $4, $5)
              ON CONFLICT (user_id) DO UPDATE SET
                  max_rent     = EXCLUDED.max_rent,
                  min_bedrooms = EXCLUDED.min_bedrooms,
                  must_haves   = EXCLUDED.must_haves,
                  updated_at   = EXCLUDED.updated_at"
        );
        self.execute(
            SQL,
            &[
                &preferences.user_id.inner(),
                &preferences.max_rent,
                &preferences.min_bedrooms,
                &preferences.must_haves,
                &preferences.updated_at,
            ],
        )
        .await
        .map(|_| ())
        .map_err(fail)
    }

    async fn areas(&self, user: ID<Member>) -> Result<Vec<AreaPreference>, Error> {
        const SQL: &str = const_format::concatcp!(
            "SELECT ",
            AREA_COLUMNS,
            " FROM ",
            AREAS,
            " WHERE user_id = $1 ORDER BY rating DESC, area_name"
        );
        self.query(SQL, &[&user.inner()])
            .await
            .map(|rows| rows.iter().map(area).collect())
            .map_err(fail)
    }

    async fn area(&self, user: ID<Member>, name: &str) -> Result<Option<AreaPreference>, Error> {
        const SQL: &str = const_format::concatcp!(
            "SELECT ",
            AREA_COLUMNS,
            " FROM ",
            AREAS,
            " WHERE user_id = $1 AND area_name = $2"
        );
        self.query_opt(SQL, &[&user.inner(), &name])
            .await
            .map(|opt| opt.as_ref().map(area))
            .map_err(fail)
    }

    async fn add_area(&self, area: &AreaPreference) -> Result<(), Error> {
        const SQL: &str = const_format::concatcp!(
            "INSERT INTO ",
            AREAS,
            " (",
            AREA_COLUMNS,
            ") VALUES ($1, $2, $3, $4, $5)"
        );
        self.execute(
            SQL,
            &[
                &area.user_id.inner(),
                &area.area_name,
                &area.rating,
                &area.notes,
                &area.created_at,
            ],
        )
        .await
        .map(|_| ())
        .map_err(|e| match fail(e) {
            Error::Conflict(_) => Error::conflict(format!(
                "area '{}' already has a preference",
                area.area_name
            )),
            other => other,
        })
    }

    async fn update_area(&self, area: &AreaPreference) -> Result<(), Error> {
        const SQL: &str = const_format::concatcp!(
            "UPDATE ",
            AREAS,
            " SET rating = $3, notes = $4 WHERE user_id = $1 AND area_name = $2"
        );
        self.execute(
            SQL,
            &[&area.user_id.inner(), &area.area_name, &area.rating, &area.notes],
        )
        .await
        .map(|_| ())
        .map_err(fail)
    }

    async fn remove_area(&self, user: ID<Member>, name: &str) -> Result<bool, Error> {
        const SQL: &str = const_format::concatcp!(
            "DELETE FROM ",
            AREAS,
            " WHERE user_id = $1 AND area_name = $2"
        );
        self.execute(SQL, &[&user.inner(), &name])
            .await
            .map(|n| n > 0)
            .map_err(fail)
    }

    async fn budget(&self) -> Result<Option<Budget>, Error> {
        const SQL: &str = const_format::concatcp!(
            "SELECT monthly_limit, utilities_estimate, updated_by, updated_at FROM ",
            BUDGET,
            " WHERE id"
        );
        self.query_opt(SQL, &[])
            .await
            .map(|opt| {
                opt.map(|ref row| Budget {
                    monthly_limit: row.get("monthly_limit"),
                    utilities_estimate: row.get("utilities_estimate"),
                    updated_by: row.get::<_, Option<uuid::Uuid>>("updated_by").map(ID::from),
                    updated_at: row.get("updated_at"),
                })
            })
            .map_err(fail)
    }

    async fn set_budget(&self, budget: &Budget) -> Result<(), Error> {
        const SQL: &str = const_format::concatcp!(
            "INSERT INTO ",
            BUDGET,
            " (id, monthly_limit, utilities_estimate, updated_by, updated_at)
              VALUES (TRUE, $1, $2, $3, $4)
              ON CONFLICT (id) DO UPDATE SET
                  monthly_limit      = EXCLUDED.monthly_limit,
                  utilities_estimate = EXCLUDED.utilities_estimate,
                  updated_by         = EXCLUDED.updated_by,
                  updated_at         = EXCLUDED.updated_at"
        );
        self.execute(
            SQL,
            &[
                &budget.monthly_limit,
                &budget.utilities_estimate,
                &budget.updated_by.map(|u| u.inner()),
                &budget.updated_at,
            ],
        )
        .await
        .map(|_| ())
        .map_err(fail)
    }
}

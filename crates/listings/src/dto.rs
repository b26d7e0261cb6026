use super::*;
use hh_auth::Member;
use hh_core::Error;
use hh_core::ID;
use serde::Deserialize;
use serde::Deserializer;

const MAX_TITLE_LEN: usize = 200;
const MAX_TEXT_LEN: usize = 5000;

/// Distinguishes an absent field (`None`) from an explicit null (`Some(None)`).
/// Pair with `#[serde(default)]`.
fn double<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn text(field: &str, value: Option<String>) -> Result<Option<String>, Error> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) if v.chars().count() > MAX_TEXT_LEN => Err(Error::invalid(format!(
            "{} must be at most {} characters",
            field, MAX_TEXT_LEN
        ))),
        other => Ok(other),
    }
}

fn title(value: String) -> Result<String, Error> {
    match value.trim() {
        "" => Err(Error::invalid("title is required")),
        t if t.chars().count() > MAX_TITLE_LEN => Err(Error::invalid(format!(
            "title must be at most {} characters",
            MAX_TITLE_LEN
        ))),
        t => Ok(t.to_string()),
    }
}

fn link(value: Option<String>) -> Result<Option<String>, Error> {
    match text("url", value)? {
        Some(u) if !(u.starts_with("http://") || u.starts_with("https://")) => {
            Err(Error::invalid("url must start with http:// or https://"))
        }
        other => Ok(other),
    }
}

fn nonnegative<T: PartialOrd + Default>(field: &str, value: Option<T>) -> Result<Option<T>, Error> {
    match value {
        Some(v) if v < T::default() => Err(Error::invalid(format!("{} cannot be negative", field))),
        other => Ok(other),
    }
}

fn finite(field: &str, value: Option<f64>) -> Result<Option<f64>, Error> {
    match value {
        Some(v) if !v.is_finite() => Err(Error::invalid(format!("{} must be a number", field))),
        other => nonnegative(field, other),
    }
}

fn coordinates(lat: Option<f64>, lon: Option<f64>) -> Result<(Option<f64>, Option<f64>), Error> {
    match (lat, lon) {
        (None, None) => Ok((None, None)),
        (Some(lat), Some(lon)) if (-90. ..=90.).contains(&lat) && (-180. ..=180.).contains(&lon) => {
            Ok((Some(lat), Some(lon)))
        }
        (Some(_), Some(_)) => Err(Error::invalid("coordinates out of range")),
        _ => Err(Error::invalid("latitude and longitude must be given together")),
    }
}

fn score(field: &str, value: Option<f64>) -> Result<Option<f64>, Error> {
    match value {
        Some(v) if !v.is_finite() || !(hh_core::SCORE_MIN..=hh_core::SCORE_MAX).contains(&v) => {
            Err(Error::invalid(format!(
                "{} must be between {} and {}",
                field,
                hh_core::SCORE_MIN,
                hh_core::SCORE_MAX
            )))
        }
        other => Ok(other),
    }
}

// ============================================================================
// LISTINGS
// ============================================================================
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRequest {
    #[serde(default)]
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
    #[serde(default)]
    pub photos: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPatchRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double")]
    pub url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double")]
    pub monthly_rent: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double")]
    pub bedrooms: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double")]
    pub bathrooms: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double")]
    pub square_feet: Option<Option<i32>>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct ListingQuery {
    pub status: Option<String>,
}

impl ListingQuery {
    pub fn status(&self) -> Result<Option<Status>, Error> {
        self.status
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(Status::try_from)
            .transpose()
    }
}

/// Validated listing creation.
pub struct NewListing {
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
}

impl TryFrom<ListingRequest> for NewListing {
    type Error = Error;
    fn try_from(req: ListingRequest) -> Result<Self, Self::Error> {
        let (latitude, longitude) = coordinates(req.latitude, req.longitude)?;
        Ok(Self {
            title: title(req.title)?,
            url: link(req.url)?,
            address: text("address", req.address)?,
            description: text("description", req.description)?,
            monthly_rent: finite("monthlyRent", req.monthly_rent)?,
            bedrooms: nonnegative("bedrooms", req.bedrooms)?,
            bathrooms: finite("bathrooms", req.bathrooms)?,
            square_feet: nonnegative("squareFeet", req.square_feet)?,
            latitude,
            longitude,
            photos: req
                .photos
                .into_iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
        })
    }
}

impl NewListing {
    pub fn into_listing(self, by: ID<Member>) -> Listing {
        let now = chrono::Utc::now();
        Listing {
            id: ID::default(),
            title: self.title,
            url: self.url,
            address: self.address,
            description: self.description,
            monthly_rent: self.monthly_rent,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            square_feet: self.square_feet,
            latitude: self.latitude,
            longitude: self.longitude,
            photos: self.photos,
            status: Status::Active,
            created_by: by,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated partial listing update. A changed address drops stale coordinates.
pub struct ListingPatch {
    pub title: Option<String>,
    pub url: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub monthly_rent: Option<Option<f64>>,
    pub bedrooms: Option<Option<i32>>,
    pub bathrooms: Option<Option<f64>>,
    pub square_feet: Option<Option<i32>>,
    pub status: Option<Status>,
}

impl TryFrom<ListingPatchRequest> for ListingPatch {
    type Error = Error;
    fn try_from(req: ListingPatchRequest) -> Result<Self, Self::Error> {
        let status = req.status.as_deref().map(Status::try_from).transpose()?;
        if status == Some(Status::Selected) {
            return Err(Error::invalid(
                "use POST /api/listings/{id}/select to select a listing",
            ));
        }
        Ok(Self {
            title: req.title.map(title).transpose()?,
            url: req.url.map(link).transpose()?,
            address: req.address.map(|v| text("address", v)).transpose()?,
            description: req.description.map(|v| text("description", v)).transpose()?,
            monthly_rent: req.monthly_rent.map(|v| finite("monthlyRent", v)).transpose()?,
            bedrooms: req.bedrooms.map(|v| nonnegative("bedrooms", v)).transpose()?,
            bathrooms: req.bathrooms.map(|v| finite("bathrooms", v)).transpose()?,
            square_feet: req.square_feet.map(|v| nonnegative("squareFeet", v)).transpose()?,
            status,
        })
    }
}

impl ListingPatch {
    pub fn readdressed(&self) -> bool {
        self.address.is_some()
    }
    pub fn apply(self, listing: &mut Listing) {
        if let Some(address) = self.address {
            if address != listing.address {
                listing.latitude = None;
                listing.longitude = None;
            }
            listing.address = address;
        }
        if let Some(v) = self.title {
            listing.title = v;
        }
        if let Some(v) = self.url {
            listing.url = v;
        }
        if let Some(v) = self.description {
            listing.description = v;
        }
        if let Some(v) = self.monthly_rent {
            listing.monthly_rent = v;
        }
        if let Some(v) = self.bedrooms {
            listing.bedrooms = v;
        }
        if let Some(v) = self.bathrooms {
            listing.bathrooms = v;
        }
        if let Some(v) = self.square_feet {
            listing.square_feet = v;
        }
        if let Some(v) = self.status {
            listing.status = v;
        }
        listing.touch();
    }
}

// ============================================================================
// VIEWINGS
// ============================================================================
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewingRequest {
    pub scheduled_at: Option<chrono::DateTime<chrono::Utc>>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewingPatchRequest {
    pub scheduled_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, deserialize_with = "double")]
    pub notes: Option<Option<String>>,
    pub completed: Option<bool>,
}

/// Validated viewing creation.
pub struct NewViewing {
    pub scheduled_at: chrono::DateTime<chrono::Utc>,
    pub notes: Option<String>,
}

impl TryFrom<ViewingRequest> for NewViewing {
    type Error = Error;
    fn try_from(req: ViewingRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            scheduled_at: req
                .scheduled_at
                .ok_or_else(|| Error::invalid("scheduledAt is required"))?,
            notes: text("notes", req.notes)?,
        })
    }
}

impl NewViewing {
    pub fn into_viewing(self, listing: ID<Listing>, by: ID<Member>) -> Viewing {
        Viewing {
            id: ID::default(),
            listing_id: listing,
            scheduled_at: self.scheduled_at,
            notes: self.notes,
            completed: false,
            created_by: by,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Validated partial viewing update.
pub struct ViewingPatch {
    pub scheduled_at: Option<chrono::DateTime<chrono::Utc>>,
    pub notes: Option<Option<String>>,
    pub completed: Option<bool>,
}

impl TryFrom<ViewingPatchRequest> for ViewingPatch {
    type Error = Error;
    fn try_from(req: ViewingPatchRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            scheduled_at: req.scheduled_at,
            notes: req.notes.map(|v| text("notes", v)).transpose()?,
            completed: req.completed,
        })
    }
}

impl ViewingPatch {
    pub fn apply(self, viewing: &mut Viewing) {
        if let Some(v) = self.scheduled_at {
            viewing.scheduled_at = v;
        }
        if let Some(v) = self.notes {
            viewing.notes = v;
        }
        if let Some(v) = self.completed {
            viewing.completed = v;
        }
    }
}

// ============================================================================
// NOTES
// ============================================================================
#[derive(Deserialize)]
pub struct NoteRequest {
    pub body: Option<String>,
}

/// Validated note body.
pub struct NoteBody(pub String);

impl TryFrom<NoteRequest> for NoteBody {
    type Error = Error;
    fn try_from(req: NoteRequest) -> Result<Self, Self::Error> {
        text("body", req.body)?
            .map(Self)
            .ok_or_else(|| Error::invalid("body is required"))
    }
}

impl NoteBody {
    pub fn into_note(self, listing: ID<Listing>, by: ID<Member>) -> Note {
        let now = chrono::Utc::now();
        Note {
            id: ID::default(),
            listing_id: listing,
            author_id: by,
            body: self.0,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// SCORES
// ============================================================================
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    #[serde(default, deserialize_with = "double")]
    pub ai_overall_score: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double")]
    pub manual_override_score: Option<Option<f64>>,
}

/// Validated score merge. Outer `None` keeps, inner `None` clears.
#[derive(Debug, Clone, PartialEq)]
pub struct ScorePatch {
    pub ai: Option<Option<f64>>,
    pub manual: Option<Option<f64>>,
}

impl TryFrom<ScoreRequest> for ScorePatch {
    type Error = Error;
    fn try_from(req: ScoreRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            ai: req
                .ai_overall_score
                .map(|v| score("aiOverallScore", v))
                .transpose()?,
            manual: req
                .manual_override_score
                .map(|v| score("manualOverrideScore", v))
                .transpose()?,
        })
    }
}

// ============================================================================
// PREFERENCES
// ============================================================================
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesRequest {
    pub max_rent: Option<f64>,
    pub min_bedrooms: Option<i32>,
    #[serde(default)]
    pub must_haves: Vec<String>,
}

impl PreferencesRequest {
    pub fn validate(self, user: ID<Member>) -> Result<Preferences, Error> {
        let mut must_haves = Vec::<String>::new();
        for item in self.must_haves.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            if !must_haves.iter().any(|m| m.eq_ignore_ascii_case(item)) {
                must_haves.push(item.to_string());
            }
        }
        Ok(Preferences {
            user_id: user,
            max_rent: finite("maxRent", self.max_rent)?,
            min_bedrooms: nonnegative("minBedrooms", self.min_bedrooms)?,
            must_haves,
            updated_at: Some(chrono::Utc::now()),
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaRequest {
    #[serde(default)]
    pub area_name: String,
    pub rating: Option<i16>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct AreaPatchRequest {
    pub rating: Option<i16>,
    #[serde(default, deserialize_with = "double")]
    pub notes: Option<Option<String>>,
}

fn rating(value: i16) -> Result<i16, Error> {
    match (hh_core::RATING_MIN..=hh_core::RATING_MAX).contains(&value) {
        true => Ok(value),
        false => Err(Error::invalid(format!(
            "rating must be between {} and {}",
            hh_core::RATING_MIN,
            hh_core::RATING_MAX
        ))),
    }
}

impl AreaRequest {
    pub fn validate(self, user: ID<Member>) -> Result<AreaPreference, Error> {
        let area_name = self.area_name.trim().to_string();
        if area_name.is_empty() {
            return Err(Error::invalid("areaName is required"));
        }
        Ok(AreaPreference {
            user_id: user,
            area_name,
            rating: rating(self.rating.ok_or_else(|| Error::invalid("rating is required"))?)?,
            notes: text("notes", self.notes)?,
            created_at: chrono::Utc::now(),
        })
    }
}

/// Validated partial area update.
pub struct AreaPatch {
    pub rating: Option<i16>,
    pub notes: Option<Option<String>>,
}

impl TryFrom<AreaPatchRequest> for AreaPatch {
    type Error = Error;
    fn try_from(req: AreaPatchRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            rating: req.rating.map(rating).transpose()?,
            notes: req.notes.map(|v| text("notes", v)).transpose()?,
        })
    }
}

impl AreaPatch {
    pub fn apply(self, area: &mut AreaPreference) {
        if let Some(v) = self.rating {
            area.rating = v;
        }
        if let Some(v) = self.notes {
            area.notes = v;
        }
    }
}

// ============================================================================
// BUDGET
// ============================================================================
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRequest {
    pub monthly_limit: Option<f64>,
    pub utilities_estimate: Option<f64>,
}

impl BudgetRequest {
    pub fn validate(self, by: ID<Member>) -> Result<Budget, Error> {
        Ok(Budget {
            monthly_limit: finite("monthlyLimit", self.monthly_limit)?,
            utilities_estimate: finite("utilitiesEstimate", self.utilities_estimate)?.unwrap_or(0.),
            updated_by: Some(by),
            updated_at: Some(chrono::Utc::now()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hh_core::Arbitrary;

    fn listing(json: serde_json::Value) -> Result<NewListing, Error> {
        NewListing::try_from(serde_json::from_value::<ListingRequest>(json).unwrap())
    }

    #[test]
    fn listings_need_a_title() {
        assert_eq!(
            listing(serde_json::json!({ "title": "   " })).err(),
            Some(Error::invalid("title is required"))
        );
        let ok = listing(serde_json::json!({ "title": " Loft ", "monthlyRent": 2100 })).unwrap();
        assert_eq!(ok.title, "Loft");
        assert_eq!(ok.monthly_rent, Some(2100.));
    }

    #[test]
    fn listing_fields_are_checked() {
        assert!(listing(serde_json::json!({ "title": "a", "monthlyRent": -1 })).is_err());
        assert!(listing(serde_json::json!({ "title": "a", "url": "ftp://x" })).is_err());
        assert!(listing(serde_json::json!({ "title": "a", "latitude": 40.0 })).is_err());
        assert!(listing(serde_json::json!({ "title": "a", "latitude": 91, "longitude": 0 })).is_err());
        assert!(listing(serde_json::json!({ "title": "a", "latitude": 40.7, "longitude": -74 })).is_ok());
    }

    #[test]
    fn patches_cannot_select() {
        let req = serde_json::from_value::<ListingPatchRequest>(serde_json::json!({
            "status": "SELECTED"
        }))
        .unwrap();
        assert!(ListingPatch::try_from(req).is_err());
    }

    #[test]
    fn patches_distinguish_null_from_absent() {
        let mut target = Listing::random();
        target.address = Some("1 Main St".into());
        target.latitude = Some(1.);
        target.longitude = Some(1.);
        let req = serde_json::from_value::<ListingPatchRequest>(serde_json::json!({
            "monthlyRent": null,
            "title": "Renamed"
        }))
        .unwrap();
        ListingPatch::try_from(req).unwrap().apply(&mut target);
        assert_eq!(target.monthly_rent, None);
        assert_eq!(target.title, "Renamed");
        assert_eq!(target.address.as_deref(), Some("1 Main St"));
        assert!(target.located());
        let req = serde_json::from_value::<ListingPatchRequest>(serde_json::json!({
            "address": "2 Side St"
        }))
        .unwrap();
        ListingPatch::try_from(req).unwrap().apply(&mut target);
        assert!(!target.located());
    }

    #[test]
    fn scores_merge_and_validate() {
        let patch = |json| ScorePatch::try_from(serde_json::from_value::<ScoreRequest>(json).unwrap());
        assert_eq!(
            patch(serde_json::json!({ "manualOverrideScore": null })).unwrap(),
            ScorePatch {
                ai: None,
                manual: Some(None)
            }
        );
        assert_eq!(
            patch(serde_json::json!({ "aiOverallScore": 7.5 })).unwrap(),
            ScorePatch {
                ai: Some(Some(7.5)),
                manual: None
            }
        );
        assert!(patch(serde_json::json!({ "aiOverallScore": 10.5 })).is_err());
        assert!(patch(serde_json::json!({ "manualOverrideScore": -0.1 })).is_err());
    }

    #[test]
    fn areas_need_a_rating_in_range() {
        let area = |json| serde_json::from_value::<AreaRequest>(json).unwrap().validate(ID::random());
        assert!(area(serde_json::json!({ "areaName": "Astoria", "rating": 4 })).is_ok());
        assert!(area(serde_json::json!({ "areaName": "Astoria", "rating": 6 })).is_err());
        assert!(area(serde_json::json!({ "areaName": "Astoria" })).is_err());
        assert!(area(serde_json::json!({ "areaName": " ", "rating": 3 })).is_err());
    }

    #[test]
    fn must_haves_are_deduplicated() {
        let prefs = PreferencesRequest {
            max_rent: Some(3000.),
            min_bedrooms: Some(2),
            must_haves: vec!["Laundry".into(), " laundry ".into(), "".into(), "Dishwasher".into()],
        }
        .validate(ID::random())
        .unwrap();
        assert_eq!(prefs.must_haves, vec!["Laundry", "Dishwasher"]);
    }

    #[test]
    fn viewings_need_a_time() {
        let req = ViewingRequest {
            scheduled_at: None,
            notes: Some("bring tape measure".into()),
        };
        assert_eq!(
            NewViewing::try_from(req).err(),
            Some(Error::invalid("scheduledAt is required"))
        );
    }
}

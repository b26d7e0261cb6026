use super::*;
use hh_auth::Member;
use hh_core::ID;
use serde::Serialize;

/// AI and manual scores for one listing.
///
/// The manual override, when present, always wins.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub listing_id: ID<Listing>,
    pub ai_overall_score: Option<f64>,
    pub manual_override_score: Option<f64>,
    pub updated_by: Option<ID<Member>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Score {
    /// Unscored placeholder for a listing nobody has rated yet.
    pub fn blank(listing: ID<Listing>) -> Self {
        Self {
            listing_id: listing,
            ai_overall_score: None,
            manual_override_score: None,
            updated_by: None,
            updated_at: None,
        }
    }
    pub fn effective(&self) -> Option<f64> {
        self.manual_override_score.or(self.ai_overall_score)
    }
    /// Absent fields keep the stored value; explicit nulls clear it.
    pub fn merge(mut self, patch: ScorePatch, by: ID<Member>) -> Self {
        if let Some(ai) = patch.ai {
            self.ai_overall_score = ai;
        }
        if let Some(manual) = patch.manual {
            self.manual_override_score = manual;
        }
        self.updated_by = Some(by);
        self.updated_at = Some(chrono::Utc::now());
        self
    }
}

/// Score as returned over HTTP, with the effective value resolved.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreView {
    #[serde(flatten)]
    pub score: Score,
    pub effective_score: Option<f64>,
}

impl From<Score> for ScoreView {
    fn from(score: Score) -> Self {
        Self {
            effective_score: score.effective(),
            score,
        }
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use hh_database::*;

    impl Schema for Score {
        fn name() -> &'static str {
            SCORES
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                SCORES,
                " (
                    listing_id             UUID PRIMARY KEY REFERENCES ",
                LISTINGS,
                " (id) ON DELETE CASCADE,
                    ai_overall_score       DOUBLE PRECISION
                                           CHECK (ai_overall_score BETWEEN 0 AND 10),
                    manual_override_score  DOUBLE PRECISION
                                           CHECK (manual_override_score BETWEEN 0 AND 10),
                    updated_by             UUID,
                    updated_at             TIMESTAMPTZ
                );"
            )
        }
        fn indices() -> &'static str {
            ""
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hh_core::Arbitrary;

    #[test]
    fn override_wins_over_ai() {
        let mut score = Score::blank(ID::random());
        score.ai_overall_score = Some(7.5);
        assert_eq!(score.effective(), Some(7.5));
        score.manual_override_score = Some(9.0);
        assert_eq!(score.effective(), Some(9.0));
    }

    #[test]
    fn cleared_override_falls_through_to_ai() {
        let mut score = Score::blank(ID::random());
        score.ai_overall_score = Some(7.5);
        score.manual_override_score = Some(3.0);
        let score = score.merge(
            ScorePatch {
                ai: None,
                manual: Some(None),
            },
            ID::random(),
        );
        assert_eq!(score.ai_overall_score, Some(7.5));
        assert_eq!(score.manual_override_score, None);
        assert_eq!(score.effective(), Some(7.5));
    }

    #[test]
    fn view_carries_effective_score() {
        let mut score = Score::blank(ID::random());
        score.ai_overall_score = Some(6.0);
        let json = serde_json::to_value(ScoreView::from(score)).unwrap();
        assert_eq!(json["aiOverallScore"], 6.0);
        assert_eq!(json["manualOverrideScore"], serde_json::Value::Null);
        assert_eq!(json["effectiveScore"], 6.0);
    }
}

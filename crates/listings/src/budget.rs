use super::*;
use hh_auth::Member;
use hh_core::ID;
use serde::Serialize;

/// Household-wide spending limit. There is exactly one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub monthly_limit: Option<f64>,
    pub utilities_estimate: f64,
    pub updated_by: Option<ID<Member>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            monthly_limit: None,
            utilities_estimate: 0.,
            updated_by: None,
            updated_at: None,
        }
    }
}

/// What one listing would cost the household.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetLine {
    pub listing_id: ID<Listing>,
    pub title: String,
    pub status: Status,
    pub rent: Option<f64>,
    pub total: Option<f64>,
    pub per_person: Option<f64>,
    pub within_budget: Option<bool>,
}

/// The budget together with its cost breakdown across open listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetView {
    pub monthly_limit: Option<f64>,
    pub utilities_estimate: f64,
    pub members: usize,
    pub listings: Vec<BudgetLine>,
}

fn cents(x: f64) -> f64 {
    (x * 100.).round() / 100.
}

impl Budget {
    /// Break down non-archived listings against this budget, split across
    /// `members` people. Listings without a rent have no totals.
    pub fn view(&self, listings: &[Listing], members: usize) -> BudgetView {
        let heads = members.max(1) as f64;
        let lines = listings
            .iter()
            .filter(|l| l.status != Status::Archived)
            .map(|l| {
                let total = l.monthly_rent.map(|r| cents(r + self.utilities_estimate));
                BudgetLine {
                    listing_id: l.id,
                    title: l.title.clone(),
                    status: l.status,
                    rent: l.monthly_rent,
                    total,
                    per_person: total.map(|t| cents(t / heads)),
                    within_budget: total.zip(self.monthly_limit).map(|(t, cap)| t <= cap),
                }
            })
            .collect();
        BudgetView {
            monthly_limit: self.monthly_limit,
            utilities_estimate: self.utilities_estimate,
            members,
            listings: lines,
        }
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use hh_database::*;

    impl Schema for Budget {
        fn name() -> &'static str {
            BUDGET
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                BUDGET,
                " (
                    id                  BOOLEAN PRIMARY KEY DEFAULT TRUE CHECK (id),
                    monthly_limit       DOUBLE PRECISION,
                    utilities_estimate  DOUBLE PRECISION NOT NULL DEFAULT 0,
                    updated_by          UUID,
                    updated_at          TIMESTAMPTZ
                );"
            )
        }
        fn indices() -> &'static str {
            ""
        }
    }
}

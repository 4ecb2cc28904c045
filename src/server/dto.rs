//! Request parameters and response bodies of the JSON API.
//!
//! Response keys follow the dataset's column names where the dashboard
//! reads them (`Year`, `Party`, `State_Name`, ...).

use crate::analysis::share::WinRate;
use crate::database::SearchFilter;
use serde::{Deserialize, Serialize};

/// Upper bound for every `limit` parameter.
pub const MAX_LIMIT: i64 = 100;

/// Error body shared by every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: message.into(),
        }
    }

    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self {
            code: "INSUFFICIENT_DATA".to_string(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
        }
    }
}

// Numeric parameters arrive as strings and are parsed by the handlers, so a
// blank value means "not given" and a malformed one is a 400 with our body.

#[derive(Debug, Default, Deserialize)]
pub struct YearParams {
    pub year: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub year: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct YearPairParams {
    pub year1: Option<String>,
    pub year2: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub candidate: Option<String>,
    pub constituency: Option<String>,
    pub year: Option<String>,
    pub state: Option<String>,
    pub party: Option<String>,
    pub gender: Option<String>,
}

impl SearchParams {
    pub fn into_filter(self, year: Option<i64>) -> SearchFilter {
        SearchFilter {
            candidate: self.candidate,
            constituency: self.constituency,
            year,
            state: self.state,
            party: self.party,
            gender: self.gender,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenderShare {
    #[serde(rename = "Year")]
    pub year: i64,
    #[serde(rename = "Sex")]
    pub sex: &'static str,
    pub count: i64,
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartyVoteShare {
    #[serde(rename = "Party")]
    pub party: String,
    pub total_votes: i64,
    pub vote_share_percentage: Option<f64>,
    pub seats_won: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighestTurnoutState {
    #[serde(rename = "State_Name")]
    pub state_name: String,
    pub avg_turnout: Option<f64>,
    pub year: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WomenPercentage {
    pub total_candidates: i64,
    pub women_candidates: i64,
    pub women_percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartyTypeShare {
    #[serde(rename = "Year")]
    pub year: i64,
    #[serde(rename = "Party_Type_TCPD")]
    pub party_type: String,
    pub total_votes: i64,
    pub vote_share_percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EducationLevel {
    #[serde(rename = "Education")]
    pub education: String,
    pub total_candidates: i64,
    pub winners: i64,
    pub win_percentage: Option<f64>,
}

impl From<WinRate> for EducationLevel {
    fn from(rate: WinRate) -> Self {
        Self {
            education: rate.level,
            total_candidates: rate.total_candidates,
            winners: rate.winners,
            win_percentage: rate.win_percentage,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum EducationResponse {
    Levels(Vec<EducationLevel>),
    Unavailable { message: &'static str },
}

pub const EDUCATION_UNAVAILABLE: &str = "Education data not available in dataset";

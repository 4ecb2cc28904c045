use crate::analysis::share::{ShareShift, Trend, WinRateSummary, YearShare};
use crate::analysis::SeatChange;
use crate::database::DatabaseError;
use crate::model::election::MarginRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub mod console;
pub mod generator;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Need at least 2 years of data, found {found}")]
    InsufficientData { found: usize },
    #[error("No data found for {0}")]
    NoData(String),
}

pub type ReportResult<T> = std::result::Result<T, ReportError>;

/// Turnout statistics of one state, optionally within one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateTurnout {
    #[serde(rename = "Year", skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    #[serde(rename = "State_Name")]
    pub state_name: String,
    pub avg_turnout: Option<f64>,
    pub max_turnout: Option<f64>,
    pub min_turnout: Option<f64>,
    pub constituencies: usize,
}

/// (a) States ranked by mean turnout in the latest election.
#[derive(Debug, Clone, Serialize)]
pub struct TurnoutLeaders {
    pub year: i64,
    pub states: Vec<StateTurnout>,
}

impl TurnoutLeaders {
    pub fn leader(&self) -> Option<&StateTurnout> {
        self.states.first()
    }
}

/// (b) Seat movement between two elections.
#[derive(Debug, Clone, Serialize)]
pub struct SeatSwing {
    pub year1: i64,
    pub year2: i64,
    pub changes: Vec<SeatChange>,
    pub biggest_gain: Option<SeatChange>,
    pub biggest_loss: Option<SeatChange>,
    pub largest_change: Option<SeatChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyWomenShare {
    #[serde(rename = "Year")]
    pub year: i64,
    pub total_candidates: i64,
    pub women_candidates: i64,
    pub women_percentage: Option<f64>,
    pub trend: Option<Trend>,
}

/// (c) Women among all candidates.
#[derive(Debug, Clone, Serialize)]
pub struct WomenShare {
    pub total_candidates: i64,
    pub women_candidates: i64,
    pub men_candidates: i64,
    pub women_percentage: Option<f64>,
    pub men_percentage: Option<f64>,
    pub by_year: Vec<YearlyWomenShare>,
}

/// (e) National against regional parties over time.
#[derive(Debug, Clone, Serialize)]
pub struct VoteShareTrend {
    pub series: Vec<YearShare>,
    pub national: Option<ShareShift>,
    pub regional: Option<ShareShift>,
}

/// (f) Education against winning, when the dataset carries education.
#[derive(Debug, Clone, Serialize)]
pub struct EducationCorrelation {
    pub available: bool,
    pub column: Option<&'static str>,
    pub summary: Option<WinRateSummary>,
}

/// Answers to the six dashboard questions.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    /// `None` when no election year is on record.
    pub turnout: Option<TurnoutLeaders>,
    /// `None` when fewer than two elections are on record.
    pub seat_change: Option<SeatSwing>,
    pub women: WomenShare,
    pub narrowest_margins: Vec<MarginRecord>,
    pub vote_share: VoteShareTrend,
    pub education: EducationCorrelation,
}

impl AnalysisReport {
    pub fn to_json(&self) -> ReportResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

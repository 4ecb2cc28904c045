use serde::{Deserialize, Serialize};
use std::fmt;

/// First general election covered by every query.
pub const FIRST_YEAR: i64 = 1991;
/// Last general election covered by every query.
pub const LAST_YEAR: i64 = 2019;

/// One candidate's result in one constituency in one year.
///
/// Field names serialize to the column names of `election_results` so the
/// dashboard can read search results without a mapping layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ElectionResultRow {
    #[sqlx(rename = "Year")]
    #[serde(rename = "Year")]
    pub year: i64,
    #[sqlx(rename = "State_Name")]
    #[serde(rename = "State_Name")]
    pub state_name: Option<String>,
    #[sqlx(rename = "Constituency_Name")]
    #[serde(rename = "Constituency_Name")]
    pub constituency_name: Option<String>,
    #[sqlx(rename = "Candidate")]
    #[serde(rename = "Candidate")]
    pub candidate: Option<String>,
    #[sqlx(rename = "Party")]
    #[serde(rename = "Party")]
    pub party: Option<String>,
    #[sqlx(rename = "Sex")]
    #[serde(rename = "Sex")]
    pub sex: Option<String>,
    #[sqlx(rename = "Position")]
    #[serde(rename = "Position")]
    pub position: i64,
    #[sqlx(rename = "Votes")]
    #[serde(rename = "Votes")]
    pub votes: Option<i64>,
    #[sqlx(rename = "Valid_Votes")]
    #[serde(rename = "Valid_Votes")]
    pub valid_votes: Option<i64>,
    #[sqlx(rename = "Margin")]
    #[serde(rename = "Margin")]
    pub margin: Option<i64>,
    #[sqlx(rename = "Margin_Percentage")]
    #[serde(rename = "Margin_Percentage")]
    pub margin_percentage: Option<f64>,
    #[sqlx(rename = "Turnout_Percentage")]
    #[serde(rename = "Turnout_Percentage")]
    pub turnout_percentage: Option<f64>,
    #[sqlx(rename = "Party_Type_TCPD")]
    #[serde(rename = "Party_Type_TCPD")]
    pub party_type: Option<String>,
}

/// Winning row of a constituency-year, projected for margin ranking.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct MarginRecord {
    #[sqlx(rename = "Year")]
    #[serde(rename = "Year")]
    pub year: i64,
    #[sqlx(rename = "State_Name")]
    #[serde(rename = "State_Name")]
    pub state_name: Option<String>,
    #[sqlx(rename = "Constituency_Name")]
    #[serde(rename = "Constituency_Name")]
    pub constituency_name: Option<String>,
    #[sqlx(rename = "Candidate")]
    #[serde(rename = "Candidate")]
    pub candidate: Option<String>,
    #[sqlx(rename = "Party")]
    #[serde(rename = "Party")]
    pub party: Option<String>,
    #[sqlx(rename = "Margin_Percentage")]
    #[serde(rename = "Margin_Percentage")]
    pub margin_percentage: Option<f64>,
    #[sqlx(rename = "Margin")]
    #[serde(rename = "Margin")]
    pub margin: Option<i64>,
    #[sqlx(rename = "Votes")]
    #[serde(rename = "Votes")]
    pub votes: Option<i64>,
    #[sqlx(rename = "Valid_Votes")]
    #[serde(rename = "Valid_Votes")]
    pub valid_votes: Option<i64>,
}

/// Per-constituency turnout, one row per candidate as stored.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TurnoutRecord {
    #[sqlx(rename = "Year")]
    pub year: i64,
    #[sqlx(rename = "State_Name")]
    pub state_name: String,
    #[sqlx(rename = "Constituency_Name")]
    pub constituency_name: Option<String>,
    #[sqlx(rename = "Turnout_Percentage")]
    pub turnout_percentage: Option<f64>,
}

/// Votes and seats of one party type in one year.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PartyTypeTally {
    #[sqlx(rename = "Year")]
    pub year: i64,
    #[sqlx(rename = "Party_Type_TCPD")]
    pub party_type: Option<String>,
    pub votes: i64,
    pub seats: i64,
}

/// Candidates and winners at one level of an optional column such as education.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct LevelOutcome {
    pub level: String,
    pub total: i64,
    pub winners: i64,
    pub avg_vote_share: Option<f64>,
}

impl PartyTypeTally {
    pub fn party_type(&self) -> PartyType {
        PartyType::from_label(self.party_type.as_deref())
    }
}

/// Candidate sex as coded in the dataset. Null and unknown codes are `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sex {
    Male,
    Female,
    Other,
}

impl Sex {
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some("M") => Sex::Male,
            Some("F") => Sex::Female,
            _ => Sex::Other,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
            Sex::Other => "O",
        }
    }
}

/// TCPD party classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PartyType {
    #[serde(rename = "National Party")]
    National,
    #[serde(rename = "Regional Party")]
    Regional,
    #[serde(rename = "Other")]
    Other,
}

impl PartyType {
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some("National Party") => PartyType::National,
            Some("Regional Party") => PartyType::Regional,
            _ => PartyType::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PartyType::National => "National Party",
            PartyType::Regional => "Regional Party",
            PartyType::Other => "Other",
        }
    }
}

impl fmt::Display for PartyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// State names are stored with underscores (`Uttar_Pradesh`).
pub fn display_state(name: &str) -> String {
    name.replace('_', " ")
}

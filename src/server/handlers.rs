//! Axum handlers for the dashboard API.

use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::analysis::percentage;
use crate::database::schema::ColumnRegistry;
use crate::database::{DatabaseError, ElectionDatabase, PartySeats};
use crate::model::election::{ElectionResultRow, MarginRecord, Sex};
use crate::reports::generator::{self, rank_state_turnout};
use crate::reports::{ReportError, SeatSwing, StateTurnout};

use super::dto::{
    EducationLevel, EducationResponse, ErrorResponse, GenderShare, HealthResponse,
    HighestTurnoutState, LimitParams, PartyTypeShare, PartyVoteShare, SearchParams,
    WomenPercentage, YearPairParams, YearParams, EDUCATION_UNAVAILABLE, MAX_LIMIT,
};

const DEFAULT_PARTY_LIMIT: i64 = 10;
const DEFAULT_MARGIN_LIMIT: i64 = 20;

// ════════════════════════════════════════════════════════════════════════════════
// Error Type
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    InsufficientData(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg)),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::not_found(msg)),
            ApiError::InsufficientData(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::insufficient_data(msg),
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::internal(msg),
            ),
        };
        (status, Json(error)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(error: DatabaseError) -> Self {
        tracing::error!(%error, "query failed");
        ApiError::Internal("Database error".to_string())
    }
}

impl From<ReportError> for ApiError {
    fn from(error: ReportError) -> Self {
        match error {
            ReportError::InsufficientData { .. } => ApiError::InsufficientData(error.to_string()),
            ReportError::NoData(_) => ApiError::NotFound(error.to_string()),
            ReportError::Database(inner) => inner.into(),
            ReportError::Serialization(_) => {
                tracing::error!(%error, "serialization failed");
                ApiError::Internal("Serialization error".to_string())
            }
        }
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct AppState {
    pub db: ElectionDatabase,
    /// Optional columns found when the server started.
    pub columns: ColumnRegistry,
}

// ════════════════════════════════════════════════════════════════════════════════
// Parameter Parsing
// ════════════════════════════════════════════════════════════════════════════════

fn parse_int(name: &str, raw: &Option<String>) -> Result<Option<i64>, ApiError> {
    match raw.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("{} must be an integer, got {:?}", name, value))),
    }
}

fn parse_limit(raw: &Option<String>, default: i64) -> Result<i64, ApiError> {
    Ok(parse_int("limit", raw)?
        .unwrap_or(default)
        .clamp(1, MAX_LIMIT))
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// GET /api/party-seat-share?year=
pub async fn party_seat_share(
    State(state): State<AppState>,
    Query(params): Query<YearParams>,
) -> ApiResult<Vec<PartySeats>> {
    let year = parse_int("year", &params.year)?;
    let mut reader = state.db.reader().await?;
    Ok(Json(reader.seat_share(year).await?))
}

/// GET /api/state-turnout?year=
///
/// Without a year, states are ranked within each year.
pub async fn state_turnout(
    State(state): State<AppState>,
    Query(params): Query<YearParams>,
) -> ApiResult<Vec<StateTurnout>> {
    let year = parse_int("year", &params.year)?;
    let mut reader = state.db.reader().await?;
    let records = reader.turnout_records(year).await?;
    Ok(Json(rank_state_turnout(&records, year.is_none(), usize::MAX)))
}

/// GET /api/gender-representation
pub async fn gender_representation(State(state): State<AppState>) -> ApiResult<Vec<GenderShare>> {
    let mut reader = state.db.reader().await?;
    let tallies = reader.gender_tallies().await?;

    let shares = tallies
        .iter()
        .flat_map(|tally| {
            [(Sex::Female, tally.women), (Sex::Male, tally.men)]
                .into_iter()
                .filter(|(_, count)| *count > 0)
                .map(move |(sex, count)| GenderShare {
                    year: tally.year,
                    sex: sex.code(),
                    count,
                    percentage: percentage(count, tally.total),
                })
        })
        .collect();

    Ok(Json(shares))
}

/// GET /api/top-parties-vote-share?year=&limit=10
pub async fn top_parties_vote_share(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> ApiResult<Vec<PartyVoteShare>> {
    let year = parse_int("year", &params.year)?;
    let limit = parse_limit(&params.limit, DEFAULT_PARTY_LIMIT)?;

    let mut reader = state.db.reader().await?;
    let total = reader.total_votes(year).await?;
    let parties = reader
        .party_votes(year, limit)
        .await?
        .into_iter()
        .map(|party| PartyVoteShare {
            vote_share_percentage: percentage(party.total_votes, total),
            party: party.party,
            total_votes: party.total_votes,
            seats_won: party.seats_won,
        })
        .collect();

    Ok(Json(parties))
}

/// GET /api/margin-distribution?year=
pub async fn margin_distribution(
    State(state): State<AppState>,
    Query(params): Query<YearParams>,
) -> ApiResult<Vec<f64>> {
    let year = parse_int("year", &params.year)?;
    Ok(Json(generator::margin_distribution(&state.db, year).await?))
}

/// GET /api/search
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Vec<ElectionResultRow>> {
    let year = parse_int("year", &params.year)?;
    let filter = params.into_filter(year);
    let mut reader = state.db.reader().await?;
    Ok(Json(reader.search(&filter).await?))
}

/// GET /api/filters/years
pub async fn filter_years(State(state): State<AppState>) -> ApiResult<Vec<i64>> {
    let mut reader = state.db.reader().await?;
    Ok(Json(reader.years().await?))
}

/// GET /api/filters/states
pub async fn filter_states(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let mut reader = state.db.reader().await?;
    Ok(Json(reader.states().await?))
}

/// GET /api/filters/parties
pub async fn filter_parties(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let mut reader = state.db.reader().await?;
    Ok(Json(reader.parties().await?))
}

/// GET /api/analytics/highest-turnout-state
pub async fn highest_turnout_state(State(state): State<AppState>) -> ApiResult<HighestTurnoutState> {
    let leaders = generator::turnout_leaders(&state.db, 1).await?;
    let leader = leaders
        .leader()
        .ok_or_else(|| ApiError::NotFound(format!("No turnout figures for {}", leaders.year)))?;

    Ok(Json(HighestTurnoutState {
        state_name: leader.state_name.clone(),
        avg_turnout: leader.avg_turnout,
        year: leaders.year,
    }))
}

/// GET /api/analytics/seat-change?year1=&year2=
///
/// Both years are needed to pick a pair; otherwise the last two elections are compared.
pub async fn seat_change(
    State(state): State<AppState>,
    Query(params): Query<YearPairParams>,
) -> ApiResult<SeatSwing> {
    let year1 = parse_int("year1", &params.year1)?;
    let year2 = parse_int("year2", &params.year2)?;
    let years = year1.zip(year2);
    Ok(Json(generator::seat_swing(&state.db, years).await?))
}

/// GET /api/analytics/women-percentage
pub async fn women_percentage(State(state): State<AppState>) -> ApiResult<WomenPercentage> {
    let share = generator::women_share(&state.db).await?;
    Ok(Json(WomenPercentage {
        total_candidates: share.total_candidates,
        women_candidates: share.women_candidates,
        women_percentage: share.women_percentage,
    }))
}

/// GET /api/analytics/narrowest-margins?limit=20&year=
pub async fn narrowest_margins(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> ApiResult<Vec<MarginRecord>> {
    let year = parse_int("year", &params.year)?;
    let limit = parse_limit(&params.limit, DEFAULT_MARGIN_LIMIT)?;
    let margins = generator::narrowest_margins(&state.db, year, limit as usize).await?;
    Ok(Json(margins))
}

/// GET /api/analytics/national-vs-regional
pub async fn national_vs_regional(State(state): State<AppState>) -> ApiResult<Vec<PartyTypeShare>> {
    let mut reader = state.db.reader().await?;
    let tallies = reader.party_type_tallies().await?;
    let totals = reader.total_votes_by_year().await?;

    let shares = tallies
        .into_iter()
        .map(|tally| PartyTypeShare {
            year: tally.year,
            party_type: tally.party_type().label().to_string(),
            total_votes: tally.votes,
            vote_share_percentage: percentage(
                tally.votes,
                totals.get(&tally.year).copied().unwrap_or(0),
            ),
        })
        .collect();

    Ok(Json(shares))
}

/// GET /api/analytics/education-correlation
pub async fn education_correlation(State(state): State<AppState>) -> ApiResult<EducationResponse> {
    let education = generator::education_correlation(&state.db, &state.columns).await?;
    let response = match education.summary {
        Some(summary) => {
            EducationResponse::Levels(summary.levels.into_iter().map(EducationLevel::from).collect())
        }
        None => EducationResponse::Unavailable {
            message: EDUCATION_UNAVAILABLE,
        },
    };
    Ok(Json(response))
}

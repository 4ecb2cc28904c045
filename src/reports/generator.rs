use super::{
    AnalysisReport, EducationCorrelation, ReportError, ReportResult, SeatSwing, StateTurnout,
    TurnoutLeaders, VoteShareTrend, WomenShare, YearlyWomenShare,
};
use crate::analysis::share::{share_shift, summarize_win_rates, trend_series, vote_share_series};
use crate::analysis::{
    compare_seats, percentage, rank_by, top_k, top_k_groups, Aggregate, Direction,
};
use crate::database::schema::ColumnRegistry;
use crate::database::ElectionDatabase;
use crate::model::election::{MarginRecord, PartyType, TurnoutRecord};
use std::collections::{BTreeMap, BTreeSet};

/// States listed for the turnout question.
pub const TOP_STATES: usize = 5;
/// Seat changes listed for the seat-change question.
pub const TOP_CHANGES: usize = 10;
/// Constituencies listed for the narrowest-margin question.
pub const NARROWEST_MARGINS: usize = 20;

type StateKey = (Option<i64>, String);

/// Mean, max and min turnout per state, highest mean first.
///
/// With `per_year` set, states are grouped within each year and the result
/// is ordered by year, then by mean turnout. States without any turnout
/// figure are left out.
pub fn rank_state_turnout(
    records: &[TurnoutRecord],
    per_year: bool,
    limit: usize,
) -> Vec<StateTurnout> {
    let key = |record: &TurnoutRecord| -> StateKey {
        (per_year.then(|| record.year), record.state_name.clone())
    };

    let mut constituencies: BTreeMap<StateKey, BTreeSet<&str>> = BTreeMap::new();
    for record in records {
        if let Some(name) = record.constituency_name.as_deref() {
            constituencies.entry(key(record)).or_default().insert(name);
        }
    }

    let mut states: Vec<StateTurnout> = top_k_groups(
        records.iter(),
        |record| key(*record),
        |record| record.turnout_percentage,
        Aggregate::Mean,
        Direction::Descending,
        limit,
    )
    .into_iter()
    .map(|summary| {
        let seats = constituencies.get(&summary.group).map_or(0, BTreeSet::len);
        let (year, state_name) = summary.group;
        StateTurnout {
            year,
            state_name,
            avg_turnout: summary.mean,
            max_turnout: summary.max,
            min_turnout: summary.min,
            constituencies: seats,
        }
    })
    .collect();

    if per_year {
        states.sort_by_key(|state| state.year);
    }
    states
}

/// The two most recent years on record, oldest first.
pub fn last_two_years(years: &[i64]) -> ReportResult<(i64, i64)> {
    match years {
        [.., year1, year2] => Ok((*year1, *year2)),
        _ => Err(ReportError::InsufficientData { found: years.len() }),
    }
}

pub async fn turnout_leaders(db: &ElectionDatabase, limit: usize) -> ReportResult<TurnoutLeaders> {
    let mut reader = db.reader().await?;
    let year = reader
        .latest_year()
        .await?
        .ok_or_else(|| ReportError::NoData("any election year".to_string()))?;
    let records = reader.turnout_records(Some(year)).await?;

    Ok(TurnoutLeaders {
        year,
        states: rank_state_turnout(&records, false, limit),
    })
}

/// Compare seats between `years`, or the last two elections when not given.
pub async fn seat_swing(db: &ElectionDatabase, years: Option<(i64, i64)>) -> ReportResult<SeatSwing> {
    let mut reader = db.reader().await?;
    let (year1, year2) = match years {
        Some(pair) => pair,
        None => last_two_years(&reader.years().await?)?,
    };

    let before = reader.seats_by_party(year1).await?;
    let after = reader.seats_by_party(year2).await?;
    let comparison = compare_seats(&before, &after);
    if comparison.is_empty() {
        tracing::warn!(year1, year2, "no seats recorded for either year");
    }

    Ok(SeatSwing {
        year1,
        year2,
        changes: comparison.top(TOP_CHANGES).to_vec(),
        biggest_gain: comparison.biggest_gain().cloned(),
        biggest_loss: comparison.biggest_loss().cloned(),
        largest_change: comparison.largest_change().cloned(),
    })
}

pub async fn women_share(db: &ElectionDatabase) -> ReportResult<WomenShare> {
    let mut reader = db.reader().await?;
    let tallies = reader.gender_tallies().await?;

    let total: i64 = tallies.iter().map(|t| t.total).sum();
    let women: i64 = tallies.iter().map(|t| t.women).sum();
    let men: i64 = tallies.iter().map(|t| t.men).sum();

    let shares: Vec<Option<f64>> = tallies
        .iter()
        .map(|t| percentage(t.women, t.total))
        .collect();
    let trends = trend_series(&shares);

    let by_year = tallies
        .iter()
        .zip(shares)
        .zip(trends)
        .map(|((tally, share), trend)| YearlyWomenShare {
            year: tally.year,
            total_candidates: tally.total,
            women_candidates: tally.women,
            women_percentage: share,
            trend,
        })
        .collect();

    Ok(WomenShare {
        total_candidates: total,
        women_candidates: women,
        men_candidates: men,
        women_percentage: percentage(women, total),
        men_percentage: percentage(men, total),
        by_year,
    })
}

pub async fn narrowest_margins(
    db: &ElectionDatabase,
    year: Option<i64>,
    limit: usize,
) -> ReportResult<Vec<MarginRecord>> {
    let mut reader = db.reader().await?;
    let records = reader.winning_margins(year).await?;
    Ok(top_k(
        records,
        |record| record.margin_percentage,
        Direction::Ascending,
        limit,
    ))
}

/// Every winner's margin percentage, smallest first.
pub async fn margin_distribution(db: &ElectionDatabase, year: Option<i64>) -> ReportResult<Vec<f64>> {
    let mut reader = db.reader().await?;
    let records = reader.winning_margins(year).await?;
    Ok(
        rank_by(records, |record| record.margin_percentage, Direction::Ascending)
            .into_iter()
            .filter_map(|record| record.margin_percentage)
            .collect(),
    )
}

pub async fn vote_share_trend(db: &ElectionDatabase) -> ReportResult<VoteShareTrend> {
    let mut reader = db.reader().await?;
    let tallies = reader.party_type_tallies().await?;
    let totals = reader.total_votes_by_year().await?;
    let series = vote_share_series(&tallies, &totals);

    Ok(VoteShareTrend {
        national: share_shift(&series, PartyType::National),
        regional: share_shift(&series, PartyType::Regional),
        series,
    })
}

pub async fn education_correlation(
    db: &ElectionDatabase,
    columns: &ColumnRegistry,
) -> ReportResult<EducationCorrelation> {
    let Some(field) = columns.education() else {
        return Ok(EducationCorrelation {
            available: false,
            column: None,
            summary: None,
        });
    };

    let mut reader = db.reader().await?;
    let outcomes = reader.field_outcomes(field).await?;

    Ok(EducationCorrelation {
        available: true,
        column: Some(field.column),
        summary: Some(summarize_win_rates(outcomes)),
    })
}

/// Answer all six questions. A dataset with a single election still gets a
/// report with the seat-change answer left out, and an empty dataset also
/// loses the turnout answer.
pub async fn generate_report(
    db: &ElectionDatabase,
    columns: &ColumnRegistry,
) -> ReportResult<AnalysisReport> {
    tracing::info!("generating analysis report");

    let turnout = match turnout_leaders(db, TOP_STATES).await {
        Ok(leaders) => Some(leaders),
        Err(ReportError::NoData(what)) => {
            tracing::warn!(%what, "no election data for the turnout ranking");
            None
        }
        Err(e) => return Err(e),
    };
    let seat_change = match seat_swing(db, None).await {
        Ok(swing) => Some(swing),
        Err(ReportError::InsufficientData { found }) => {
            tracing::warn!(found, "not enough elections for a seat comparison");
            None
        }
        Err(e) => return Err(e),
    };
    let women = women_share(db).await?;
    let narrowest_margins = narrowest_margins(db, None, NARROWEST_MARGINS).await?;
    let vote_share = vote_share_trend(db).await?;
    let education = education_correlation(db, columns).await?;

    Ok(AnalysisReport {
        generated_at: chrono::Utc::now(),
        turnout,
        seat_change,
        women,
        narrowest_margins,
        vote_share,
        education,
    })
}

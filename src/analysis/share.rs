//! Percentages of a subset over a total, year-over-year trends, and win rates.

use crate::analysis::ranking::{rank_by, Direction};
use crate::model::election::{LevelOutcome, PartyType, PartyTypeTally};
use serde::Serialize;
use std::collections::BTreeMap;

/// Decimal places used whenever a percentage is printed.
pub const DISPLAY_DECIMALS: usize = 2;

/// `part / total` as a percentage, or `None` when `total` is zero.
pub fn percentage(part: i64, total: i64) -> Option<f64> {
    (total != 0).then(|| part as f64 * 100.0 / total as f64)
}

/// The value a reader sees after formatting with `decimals` places.
pub fn display_rounded(value: f64, decimals: usize) -> f64 {
    format!("{:.*}", decimals, value)
        .parse()
        .unwrap_or(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increase,
    Decrease,
    Equal,
}

impl Trend {
    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Increase => "↑",
            Trend::Decrease => "↓",
            Trend::Equal => "→",
        }
    }
}

/// Compares the displayed values, so two floats that print the same are `Equal`.
pub fn classify_trend(previous: Option<f64>, current: Option<f64>) -> Option<Trend> {
    let previous = display_rounded(previous?, DISPLAY_DECIMALS);
    let current = display_rounded(current?, DISPLAY_DECIMALS);
    Some(if current > previous {
        Trend::Increase
    } else if current < previous {
        Trend::Decrease
    } else {
        Trend::Equal
    })
}

/// Trend of each value against its predecessor; the first entry has none.
pub fn trend_series(values: &[Option<f64>]) -> Vec<Option<Trend>> {
    let mut trends = Vec::with_capacity(values.len());
    let mut previous = None;
    for (i, value) in values.iter().enumerate() {
        trends.push(if i == 0 {
            None
        } else {
            classify_trend(previous, *value)
        });
        previous = *value;
    }
    trends
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearShare {
    pub year: i64,
    pub national: Option<f64>,
    pub regional: Option<f64>,
    pub national_seats: i64,
    pub regional_seats: i64,
}

impl YearShare {
    pub fn share(&self, party_type: PartyType) -> Option<f64> {
        match party_type {
            PartyType::National => self.national,
            PartyType::Regional => self.regional,
            PartyType::Other => None,
        }
    }

    /// National minus regional share, in percentage points.
    pub fn gap(&self) -> Option<f64> {
        Some(self.national? - self.regional?)
    }
}

/// National and regional vote share per year. `totals` holds all votes cast
/// per year; a party type absent from a year counts as zero votes.
pub fn vote_share_series(tallies: &[PartyTypeTally], totals: &BTreeMap<i64, i64>) -> Vec<YearShare> {
    let mut by_year: BTreeMap<i64, [(i64, i64); 2]> = BTreeMap::new();
    for tally in tallies {
        let slot = match tally.party_type() {
            PartyType::National => 0,
            PartyType::Regional => 1,
            PartyType::Other => continue,
        };
        let entry = by_year.entry(tally.year).or_default();
        entry[slot].0 += tally.votes;
        entry[slot].1 += tally.seats;
    }

    by_year
        .into_iter()
        .map(|(year, [(nat_votes, nat_seats), (reg_votes, reg_seats)])| {
            let total = totals.get(&year).copied().unwrap_or(0);
            YearShare {
                year,
                national: percentage(nat_votes, total),
                regional: percentage(reg_votes, total),
                national_seats: nat_seats,
                regional_seats: reg_seats,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareShift {
    pub party_type: PartyType,
    pub first_year: i64,
    pub last_year: i64,
    pub first: Option<f64>,
    pub last: Option<f64>,
    /// Percentage points gained from the first to the last year.
    pub change: Option<f64>,
}

pub fn share_shift(series: &[YearShare], party_type: PartyType) -> Option<ShareShift> {
    let first = series.first()?;
    let last = series.last()?;
    let (from, to) = (first.share(party_type), last.share(party_type));
    Some(ShareShift {
        party_type,
        first_year: first.year,
        last_year: last.year,
        first: from,
        last: to,
        change: from.zip(to).map(|(a, b)| b - a),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinRate {
    pub level: String,
    pub total_candidates: i64,
    pub winners: i64,
    pub win_percentage: Option<f64>,
    /// Mean vote share of the level's candidates, over rows that record one.
    pub avg_vote_share: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Correlation {
    Positive,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinRateSummary {
    /// Levels ordered by win rate, highest first.
    pub levels: Vec<WinRate>,
    pub highest: Option<WinRate>,
    pub lowest: Option<WinRate>,
    pub overall_win_percentage: Option<f64>,
    pub correlation: Option<Correlation>,
}

/// Win rate per level.
pub fn summarize_win_rates(outcomes: impl IntoIterator<Item = LevelOutcome>) -> WinRateSummary {
    let rates: Vec<WinRate> = outcomes
        .into_iter()
        .map(|outcome| WinRate {
            win_percentage: percentage(outcome.winners, outcome.total),
            level: outcome.level,
            total_candidates: outcome.total,
            winners: outcome.winners,
            avg_vote_share: outcome.avg_vote_share.filter(|v| !v.is_nan()),
        })
        .collect();

    let total: i64 = rates.iter().map(|r| r.total_candidates).sum();
    let winners: i64 = rates.iter().map(|r| r.winners).sum();
    let overall = percentage(winners, total);

    let levels = rank_by(rates, |r| r.win_percentage, Direction::Descending);
    let highest = levels.first().cloned();
    let mut lowest: Option<&WinRate> = None;
    for rate in &levels {
        if lowest.map_or(true, |l| rate.win_percentage < l.win_percentage) {
            lowest = Some(rate);
        }
    }
    let lowest = lowest.cloned();

    let correlation = highest
        .as_ref()
        .and_then(|h| h.win_percentage)
        .zip(overall)
        .map(|(best, overall)| {
            if best > overall {
                Correlation::Positive
            } else {
                Correlation::Negative
            }
        });

    WinRateSummary {
        levels,
        highest,
        lowest,
        overall_win_percentage: overall,
        correlation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(year: i64, party_type: &str, votes: i64, seats: i64) -> PartyTypeTally {
        PartyTypeTally {
            year,
            party_type: Some(party_type.to_string()),
            votes,
            seats,
        }
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(25, 200), Some(12.5));
        assert_eq!(percentage(0, 10), Some(0.0));
    }

    #[test]
    fn test_zero_total_is_undefined() {
        assert_eq!(percentage(0, 0), None);
        assert_eq!(percentage(3, 0), None);
    }

    #[test]
    fn test_trend_uses_displayed_value() {
        // 7.004 and 6.996 both print as 7.00.
        assert_eq!(classify_trend(Some(7.004), Some(6.996)), Some(Trend::Equal));
        assert_eq!(classify_trend(Some(7.0), Some(7.01)), Some(Trend::Increase));
        assert_eq!(classify_trend(Some(7.0), Some(6.99)), Some(Trend::Decrease));
    }

    #[test]
    fn test_trend_with_undefined_side() {
        assert_eq!(classify_trend(None, Some(1.0)), None);
        assert_eq!(classify_trend(Some(1.0), None), None);
    }

    #[test]
    fn test_trend_series() {
        let trends = trend_series(&[Some(4.0), Some(5.5), Some(5.5), None, Some(2.0)]);
        assert_eq!(
            trends,
            vec![
                None,
                Some(Trend::Increase),
                Some(Trend::Equal),
                None,
                None,
            ]
        );
        assert_eq!(Trend::Decrease.arrow(), "↓");
    }

    #[test]
    fn test_vote_share_series() {
        let tallies = vec![
            tally(2014, "National Party", 600, 300),
            tally(2014, "Regional Party", 300, 200),
            tally(2019, "National Party", 700, 350),
            tally(2019, "Independents", 50, 0),
        ];
        let totals = BTreeMap::from([(2014, 1000), (2019, 1000)]);
        let series = vote_share_series(&tallies, &totals);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].national, Some(60.0));
        assert_eq!(series[0].regional, Some(30.0));
        assert_eq!(series[0].gap(), Some(30.0));
        // Missing regional row in 2019 is zero votes, not undefined.
        assert_eq!(series[1].regional, Some(0.0));
        assert_eq!(series[1].national_seats, 350);

        let shift = share_shift(&series, PartyType::National).unwrap();
        assert_eq!((shift.first_year, shift.last_year), (2014, 2019));
        assert!((shift.change.unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_vote_share_without_total_is_undefined() {
        let tallies = vec![tally(2009, "National Party", 0, 0)];
        let series = vote_share_series(&tallies, &BTreeMap::new());
        assert_eq!(series[0].national, None);
        assert_eq!(series[0].gap(), None);
        assert!(share_shift(&[], PartyType::Regional).is_none());
    }

    fn outcome(level: &str, total: i64, winners: i64, avg_vote_share: Option<f64>) -> LevelOutcome {
        LevelOutcome {
            level: level.to_string(),
            total,
            winners,
            avg_vote_share,
        }
    }

    #[test]
    fn test_win_rate_summary() {
        let summary = summarize_win_rates(vec![
            outcome("Graduate", 100, 20, Some(21.5)),
            outcome("Illiterate", 50, 1, None),
            outcome("Post Graduate", 40, 12, Some(30.25)),
        ]);

        let order: Vec<&str> = summary.levels.iter().map(|l| l.level.as_str()).collect();
        assert_eq!(order, vec!["Post Graduate", "Graduate", "Illiterate"]);
        let vote_shares: Vec<Option<f64>> =
            summary.levels.iter().map(|l| l.avg_vote_share).collect();
        assert_eq!(vote_shares, vec![Some(30.25), Some(21.5), None]);
        assert_eq!(summary.highest.unwrap().level, "Post Graduate");
        assert_eq!(summary.lowest.unwrap().level, "Illiterate");
        let overall = summary.overall_win_percentage.unwrap();
        assert!((overall - 33.0 * 100.0 / 190.0).abs() < 1e-9);
        assert_eq!(summary.correlation, Some(Correlation::Positive));
    }

    #[test]
    fn test_win_rate_summary_empty() {
        let summary = summarize_win_rates(Vec::new());
        assert!(summary.levels.is_empty());
        assert!(summary.highest.is_none());
        assert!(summary.lowest.is_none());
        assert_eq!(summary.overall_win_percentage, None);
        assert_eq!(summary.correlation, None);
    }
}

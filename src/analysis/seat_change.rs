//! Year-over-year seat comparison per party.

use itertools::Itertools;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Party -> constituencies won (rows with `Position = 1`) in one year.
pub type SeatCount = HashMap<String, i64>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatChange {
    pub party: String,
    pub year1_seats: i64,
    pub year2_seats: i64,
    pub change: i64,
}

/// Changes for the union of parties in two years, ranked by absolute change.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SeatComparison {
    changes: Vec<SeatChange>,
}

impl SeatComparison {
    /// Ranked descending by `|change|`; equal magnitudes are ordered by party name.
    pub fn ranked(&self) -> &[SeatChange] {
        &self.changes
    }

    pub fn top(&self, n: usize) -> &[SeatChange] {
        &self.ranked()[..n.min(self.len())]
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Maximum signed change, taken over all records rather than the ranked head.
    pub fn biggest_gain(&self) -> Option<&SeatChange> {
        self.changes
            .iter()
            .min_by(|a, b| b.change.cmp(&a.change).then_with(|| a.party.cmp(&b.party)))
    }

    /// Minimum signed change.
    pub fn biggest_loss(&self) -> Option<&SeatChange> {
        self.changes
            .iter()
            .min_by(|a, b| a.change.cmp(&b.change).then_with(|| a.party.cmp(&b.party)))
    }

    pub fn largest_change(&self) -> Option<&SeatChange> {
        self.changes.first()
    }
}

pub fn compare_seats(year1: &SeatCount, year2: &SeatCount) -> SeatComparison {
    let mut changes: Vec<SeatChange> = year1
        .keys()
        .chain(year2.keys())
        .unique()
        .map(|party| {
            let year1_seats = year1.get(party).copied().unwrap_or(0);
            let year2_seats = year2.get(party).copied().unwrap_or(0);
            SeatChange {
                party: party.clone(),
                year1_seats,
                year2_seats,
                change: year2_seats - year1_seats,
            }
        })
        .collect();

    changes.sort_by(by_magnitude);
    SeatComparison { changes }
}

fn by_magnitude(a: &SeatChange, b: &SeatChange) -> Ordering {
    b.change
        .abs()
        .cmp(&a.change.abs())
        .then_with(|| a.party.cmp(&b.party))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn seats(entries: &[(&str, i64)]) -> SeatCount {
        entries
            .iter()
            .map(|(party, n)| (party.to_string(), *n))
            .collect()
    }

    fn change_of<'a>(cmp: &'a SeatComparison, party: &str) -> &'a SeatChange {
        cmp.ranked().iter().find(|c| c.party == party).unwrap()
    }

    #[test]
    fn test_worked_example() {
        let cmp = compare_seats(
            &seats(&[("A", 100), ("B", 50)]),
            &seats(&[("A", 80), ("C", 30)]),
        );

        assert_eq!(cmp.len(), 3);
        assert_eq!(change_of(&cmp, "A").change, -20);
        assert_eq!(change_of(&cmp, "B").change, -50);
        assert_eq!(change_of(&cmp, "C").change, 30);

        let order: Vec<&str> = cmp.ranked().iter().map(|c| c.party.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "A"]);

        assert_eq!(cmp.biggest_gain().unwrap().party, "C");
        assert_eq!(cmp.biggest_loss().unwrap().party, "B");
        assert_eq!(cmp.largest_change().unwrap().party, "B");
    }

    #[test]
    fn test_missing_keys_default_to_zero() {
        let cmp = compare_seats(&seats(&[("A", 10)]), &seats(&[("B", 4)]));
        let a = change_of(&cmp, "A");
        assert_eq!((a.year1_seats, a.year2_seats, a.change), (10, 0, -10));
        let b = change_of(&cmp, "B");
        assert_eq!((b.year1_seats, b.year2_seats, b.change), (0, 4, 4));
    }

    #[test]
    fn test_one_empty_year_is_full_gain() {
        let cmp = compare_seats(&SeatCount::new(), &seats(&[("A", 3), ("B", 7)]));
        assert!(cmp.ranked().iter().all(|c| c.change == c.year2_seats));
        assert_eq!(cmp.biggest_loss().unwrap().party, "A");
        assert_eq!(cmp.biggest_gain().unwrap().party, "B");
    }

    #[test]
    fn test_both_empty_yields_no_result() {
        let cmp = compare_seats(&SeatCount::new(), &SeatCount::new());
        assert!(cmp.is_empty());
        assert!(cmp.top(10).is_empty());
        assert!(cmp.biggest_gain().is_none());
        assert!(cmp.biggest_loss().is_none());
        assert!(cmp.largest_change().is_none());
    }

    #[test]
    fn test_equal_magnitudes_break_on_party_name() {
        let cmp = compare_seats(
            &seats(&[("Z", 10), ("M", 0), ("A", 5)]),
            &seats(&[("Z", 0), ("M", 10), ("A", 0)]),
        );

        let tied: HashSet<&str> = cmp.ranked()[..2]
            .iter()
            .map(|c| c.party.as_str())
            .collect();
        assert_eq!(tied, HashSet::from(["M", "Z"]));

        let order: Vec<&str> = cmp.ranked().iter().map(|c| c.party.as_str()).collect();
        assert_eq!(order, vec!["M", "Z", "A"]);
    }

    #[test]
    fn test_gain_and_loss_differ_from_ranked_head() {
        // Largest magnitude is a loss, so the gain is nowhere near the head.
        let cmp = compare_seats(
            &seats(&[("A", 200), ("B", 10), ("C", 40)]),
            &seats(&[("A", 20), ("B", 15), ("C", 38)]),
        );
        assert_eq!(cmp.largest_change().unwrap().party, "A");
        assert_eq!(cmp.biggest_gain().unwrap().party, "B");
        assert_eq!(cmp.biggest_loss().unwrap().party, "A");
        assert_eq!(cmp.ranked().last().unwrap().party, "C");
    }

    #[test]
    fn test_top_truncates() {
        let cmp = compare_seats(&seats(&[("A", 1), ("B", 2), ("C", 3)]), &SeatCount::new());
        assert_eq!(cmp.top(2).len(), 2);
        assert_eq!(cmp.top(10).len(), 3);
    }

    fn seat_map() -> impl Strategy<Value = SeatCount> {
        prop::collection::hash_map("[A-H]{1,2}", 0i64..400, 0..12)
    }

    proptest! {
        #[test]
        fn prop_union_and_sum(m1 in seat_map(), m2 in seat_map()) {
            let cmp = compare_seats(&m1, &m2);

            let union: HashSet<&String> = m1.keys().chain(m2.keys()).collect();
            prop_assert_eq!(cmp.len(), union.len());

            let total: i64 = cmp.ranked().iter().map(|c| c.change).sum();
            prop_assert_eq!(total, m2.values().sum::<i64>() - m1.values().sum::<i64>());
        }

        #[test]
        fn prop_per_party_change(m1 in seat_map(), m2 in seat_map()) {
            let cmp = compare_seats(&m1, &m2);
            for c in cmp.ranked() {
                let expected = match (m1.get(&c.party), m2.get(&c.party)) {
                    (Some(a), Some(b)) => b - a,
                    (None, Some(b)) => *b,
                    (Some(a), None) => -a,
                    (None, None) => unreachable!(),
                };
                prop_assert_eq!(c.change, expected);
            }
        }

        #[test]
        fn prop_ranked_by_magnitude(m1 in seat_map(), m2 in seat_map()) {
            let cmp = compare_seats(&m1, &m2);
            for pair in cmp.ranked().windows(2) {
                prop_assert!(pair[0].change.abs() >= pair[1].change.abs());
            }
        }

        #[test]
        fn prop_idempotent(m1 in seat_map(), m2 in seat_map()) {
            prop_assert_eq!(compare_seats(&m1, &m2), compare_seats(&m1, &m2));
        }

        #[test]
        fn prop_largest_agrees_with_gain_or_loss(m1 in seat_map(), m2 in seat_map()) {
            let cmp = compare_seats(&m1, &m2);
            if let Some(largest) = cmp.largest_change() {
                let gain = cmp.biggest_gain().unwrap();
                let loss = cmp.biggest_loss().unwrap();
                prop_assert!(largest.change == gain.change || largest.change == loss.change);
                prop_assert_eq!(
                    largest.change.abs(),
                    gain.change.abs().max(loss.change.abs())
                );
            } else {
                prop_assert!(cmp.biggest_gain().is_none());
                prop_assert!(cmp.biggest_loss().is_none());
            }
        }
    }
}

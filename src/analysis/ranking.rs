//! Top-K extraction over a nullable numeric key.
//!
//! Records whose key is missing (or NaN) are dropped before ranking, never
//! treated as zero or infinity. Sorting is stable: records with equal keys
//! keep the order they arrived in.

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smallest first, e.g. narrowest margin.
    Ascending,
    /// Largest first, e.g. highest turnout.
    Descending,
}

/// Every record with a usable key, sorted in `direction`.
pub fn rank_by<T, F>(records: impl IntoIterator<Item = T>, key: F, direction: Direction) -> Vec<T>
where
    F: Fn(&T) -> Option<f64>,
{
    let mut keyed: Vec<(f64, T)> = records
        .into_iter()
        .filter_map(|record| match key(&record) {
            Some(value) if !value.is_nan() => Some((value, record)),
            _ => None,
        })
        .collect();

    match direction {
        Direction::Ascending => keyed.sort_by(|a, b| a.0.total_cmp(&b.0)),
        Direction::Descending => keyed.sort_by(|a, b| b.0.total_cmp(&a.0)),
    }

    keyed.into_iter().map(|(_, record)| record).collect()
}

/// First `limit` records of [`rank_by`]. Fewer qualifying records is not an error.
pub fn top_k<T, F>(
    records: impl IntoIterator<Item = T>,
    key: F,
    direction: Direction,
    limit: usize,
) -> Vec<T>
where
    F: Fn(&T) -> Option<f64>,
{
    let mut ranked = rank_by(records, key, direction);
    ranked.truncate(limit);
    ranked
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Mean,
    Max,
    Min,
}

/// Per-group statistics of a nullable key. Null keys are skipped, so `mean`
/// and friends are `None` when a group has no usable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary<G> {
    pub group: G,
    pub mean: Option<f64>,
    pub max: Option<f64>,
    pub min: Option<f64>,
    /// Records in the group, including those with a null key.
    pub records: usize,
}

impl<G> GroupSummary<G> {
    pub fn value(&self, aggregate: Aggregate) -> Option<f64> {
        match aggregate {
            Aggregate::Mean => self.mean,
            Aggregate::Max => self.max,
            Aggregate::Min => self.min,
        }
    }
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
    max: Option<f64>,
    min: Option<f64>,
    records: usize,
}

impl Accumulator {
    fn push(&mut self, value: Option<f64>) {
        self.records += 1;
        let Some(value) = value.filter(|v| !v.is_nan()) else {
            return;
        };
        self.sum += value;
        self.count += 1;
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
    }
}

/// Groups records and summarizes `key` per group, in ascending group order.
pub fn summarize_by<T, G, GF, KF>(
    records: impl IntoIterator<Item = T>,
    group: GF,
    key: KF,
) -> Vec<GroupSummary<G>>
where
    G: Ord,
    GF: Fn(&T) -> G,
    KF: Fn(&T) -> Option<f64>,
{
    let mut groups: BTreeMap<G, Accumulator> = BTreeMap::new();
    for record in records {
        groups
            .entry(group(&record))
            .or_default()
            .push(key(&record));
    }

    groups
        .into_iter()
        .map(|(group, acc)| GroupSummary {
            group,
            mean: (acc.count > 0).then(|| acc.sum / acc.count as f64),
            max: acc.max,
            min: acc.min,
            records: acc.records,
        })
        .collect()
}

/// Aggregate per group, then rank the groups on the chosen aggregate.
pub fn top_k_groups<T, G, GF, KF>(
    records: impl IntoIterator<Item = T>,
    group: GF,
    key: KF,
    aggregate: Aggregate,
    direction: Direction,
    limit: usize,
) -> Vec<GroupSummary<G>>
where
    G: Ord,
    GF: Fn(&T) -> G,
    KF: Fn(&T) -> Option<f64>,
{
    top_k(
        summarize_by(records, group, key),
        |summary| summary.value(aggregate),
        direction,
        limit,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: &'static str,
        margin: Option<f64>,
    }

    fn rows(values: &[(&'static str, Option<f64>)]) -> Vec<Row> {
        values
            .iter()
            .map(|(name, margin)| Row {
                name: *name,
                margin: *margin,
            })
            .collect()
    }

    #[test]
    fn test_narrowest_excludes_nulls() {
        let input = rows(&[
            ("a", Some(0.5)),
            ("b", None),
            ("c", Some(0.1)),
            ("d", Some(2.0)),
            ("e", Some(0.1)),
        ]);
        let top = top_k(input, |r| r.margin, Direction::Ascending, 2);

        assert_eq!(top.len(), 2);
        assert!(top.iter().all(|r| r.margin == Some(0.1)));
        assert!(top.iter().all(|r| r.name != "b"));
    }

    #[test]
    fn test_ties_keep_source_order() {
        let input = rows(&[("x", Some(1.0)), ("y", Some(1.0)), ("z", Some(0.5))]);
        let ranked = rank_by(input, |r| r.margin, Direction::Descending);
        let names: Vec<&str> = ranked.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_descending_and_short_input() {
        let input = rows(&[("a", Some(61.0)), ("b", Some(78.5)), ("c", None)]);
        let top = top_k(input, |r| r.margin, Direction::Descending, 10);
        let names: Vec<&str> = top.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_nan_is_treated_as_missing() {
        let input = rows(&[("a", Some(f64::NAN)), ("b", Some(3.0))]);
        let ranked = rank_by(input, |r| r.margin, Direction::Ascending);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].name, "b");
    }

    #[test]
    fn test_zero_limit_and_empty_input() {
        let input = rows(&[("a", Some(1.0))]);
        assert!(top_k(input, |r| r.margin, Direction::Ascending, 0).is_empty());
        assert!(top_k(Vec::<Row>::new(), |r| r.margin, Direction::Ascending, 5).is_empty());
    }

    #[test]
    fn test_summarize_skips_null_keys() {
        let input = vec![
            ("Kerala", Some(70.0)),
            ("Kerala", Some(80.0)),
            ("Kerala", None),
            ("Bihar", Some(55.0)),
            ("Goa", None),
        ];
        let summary = summarize_by(input, |r| r.0, |r| r.1);

        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0].group, "Bihar");
        let goa = &summary[1];
        assert_eq!(goa.group, "Goa");
        assert_eq!(goa.mean, None);
        assert_eq!(goa.records, 1);
        let kerala = &summary[2];
        assert_eq!(kerala.mean, Some(75.0));
        assert_eq!(kerala.max, Some(80.0));
        assert_eq!(kerala.min, Some(70.0));
        assert_eq!(kerala.records, 3);
    }

    #[test]
    fn test_top_groups_by_mean() {
        let input = vec![
            ("Kerala", Some(70.0)),
            ("Kerala", Some(80.0)),
            ("Bihar", Some(55.0)),
            ("Goa", None),
            ("Assam", Some(81.0)),
        ];
        let top = top_k_groups(
            input,
            |r| r.0,
            |r| r.1,
            Aggregate::Mean,
            Direction::Descending,
            2,
        );
        let groups: Vec<&str> = top.iter().map(|g| g.group).collect();
        assert_eq!(groups, vec!["Assam", "Kerala"]);
    }

    #[test]
    fn test_top_groups_by_min_ascending() {
        let input = vec![("a", Some(3.0)), ("a", Some(9.0)), ("b", Some(4.0))];
        let top = top_k_groups(
            input,
            |r| r.0,
            |r| r.1,
            Aggregate::Min,
            Direction::Ascending,
            1,
        );
        assert_eq!(top[0].group, "a");
        assert_eq!(top[0].value(Aggregate::Max), Some(9.0));
    }
}

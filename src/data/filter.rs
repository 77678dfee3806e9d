use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{BatterSide, PitchDataset, PitchRecord};

// ---------------------------------------------------------------------------
// Filter selections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthFilter {
    #[default]
    All,
    /// 1 = January.
    Month(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SideFilter {
    #[default]
    All,
    Only(BatterSide),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunnerFilter {
    #[default]
    All,
    BasesEmpty,
    /// Anything that is not "bases empty", including an unrecorded state.
    RunnersOn,
}

/// Everything the user selected before pressing Run.
///
/// Defaults leave every filter inactive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    /// Inclusive `(start, end)`. A reversed range matches nothing.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub year: Option<i32>,
    pub month: MonthFilter,
    pub pitcher: Option<String>,
    pub batter_side: SideFilter,
    /// Empty set means every pitch type.
    pub pitch_types: BTreeSet<String>,
    pub runners: RunnerFilter,
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// One active filter condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    DateRange { start: NaiveDate, end: NaiveDate },
    Year(i32),
    Month(u32),
    Pitcher(String),
    BatterSide(BatterSide),
    PitchTypes(BTreeSet<String>),
    BasesEmpty(bool),
}

impl Predicate {
    pub fn matches(&self, rec: &PitchRecord) -> bool {
        match self {
            Predicate::DateRange { start, end } => *start <= rec.date && rec.date <= *end,
            Predicate::Year(year) => rec.year() == *year,
            Predicate::Month(month) => rec.month() == *month,
            Predicate::Pitcher(name) => rec.pitcher_name == *name,
            Predicate::BatterSide(side) => rec.batter_side == Some(*side),
            Predicate::PitchTypes(types) => rec
                .pitch_type
                .as_ref()
                .is_some_and(|pt| types.contains(pt)),
            Predicate::BasesEmpty(empty) => {
                let is_empty = rec.runner_state.as_ref().is_some_and(|r| r.is_empty());
                is_empty == *empty
            }
        }
    }
}

impl FilterSpec {
    /// The active filters, in table order. Inactive selections produce nothing.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut preds = Vec::new();
        if let Some((start, end)) = self.date_range {
            preds.push(Predicate::DateRange { start, end });
        }
        if let Some(year) = self.year {
            preds.push(Predicate::Year(year));
        }
        if let MonthFilter::Month(month) = self.month {
            preds.push(Predicate::Month(month));
        }
        if let Some(name) = &self.pitcher {
            preds.push(Predicate::Pitcher(name.clone()));
        }
        if let SideFilter::Only(side) = self.batter_side {
            preds.push(Predicate::BatterSide(side));
        }
        if !self.pitch_types.is_empty() {
            preds.push(Predicate::PitchTypes(self.pitch_types.clone()));
        }
        match self.runners {
            RunnerFilter::All => {}
            RunnerFilter::BasesEmpty => preds.push(Predicate::BasesEmpty(true)),
            RunnerFilter::RunnersOn => preds.push(Predicate::BasesEmpty(false)),
        }
        preds
    }
}

/// Return indices of records that pass every predicate, in dataset order.
pub fn matching_indices(records: &[PitchRecord], preds: &[Predicate]) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, rec)| preds.iter().all(|p| p.matches(rec)))
        .map(|(i, _)| i)
        .collect()
}

/// Return indices of pitches that pass all active filters of `spec`.
pub fn filtered_indices(dataset: &PitchDataset, spec: &FilterSpec) -> Vec<usize> {
    matching_indices(&dataset.records, &spec.predicates())
}

// ---------------------------------------------------------------------------
// Pitcher search
// ---------------------------------------------------------------------------

/// Pitcher names offered for selection: case-insensitive substring match on
/// the trimmed query. An empty query offers every name.
pub fn pitcher_suggestions<'a>(dataset: &'a PitchDataset, query: &str) -> Vec<&'a str> {
    let query = query.trim().to_lowercase();
    dataset
        .pitcher_names
        .iter()
        .filter(|name| query.is_empty() || name.to_lowercase().contains(&query))
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::RunnerState;
    use proptest::prelude::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pitch(date: NaiveDate, pitcher: &str, pitch_type: &str) -> PitchRecord {
        PitchRecord::new(date, pitcher, Some(pitch_type))
    }

    fn sample() -> PitchDataset {
        let mut a = pitch(day(2023, 6, 1), "Kim Kwang-hyun", "직구");
        a.batter_side = Some(BatterSide::Right);
        a.runner_state = Some(RunnerState::Empty);
        let mut b = pitch(day(2024, 4, 10), "Kim Kwang-hyun", "슬라");
        b.batter_side = Some(BatterSide::Left);
        b.runner_state = Some(RunnerState::Occupied("1루".into()));
        let mut c = pitch(day(2024, 4, 20), "Ahn Woo-jin", "직구");
        c.batter_side = Some(BatterSide::Right);
        let mut d = pitch(day(2024, 5, 2), "Ahn Woo-jin", "커브");
        d.runner_state = Some(RunnerState::Empty);
        PitchDataset::from_records(vec![a, b, c, d])
    }

    #[test]
    fn default_spec_keeps_everything() {
        let ds = sample();
        assert!(FilterSpec::default().predicates().is_empty());
        assert_eq!(filtered_indices(&ds, &FilterSpec::default()), vec![0, 1, 2, 3]);
    }

    #[test]
    fn year_and_month_narrow_by_calendar() {
        let ds = sample();
        let spec = FilterSpec {
            year: Some(2024),
            month: MonthFilter::Month(4),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &spec), vec![1, 2]);
    }

    #[test]
    fn date_range_is_inclusive() {
        let ds = sample();
        let spec = FilterSpec {
            date_range: Some((day(2024, 4, 10), day(2024, 4, 20))),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &spec), vec![1, 2]);
    }

    #[test]
    fn reversed_date_range_matches_nothing() {
        let ds = sample();
        let spec = FilterSpec {
            date_range: Some((day(2024, 5, 1), day(2024, 4, 1))),
            ..Default::default()
        };
        assert!(filtered_indices(&ds, &spec).is_empty());
    }

    #[test]
    fn date_range_and_year_compose_by_conjunction() {
        let ds = sample();
        let spec = FilterSpec {
            date_range: Some((day(2023, 1, 1), day(2023, 12, 31))),
            year: Some(2024),
            ..Default::default()
        };
        assert!(filtered_indices(&ds, &spec).is_empty());
    }

    #[test]
    fn batter_side_ignores_unrecorded_side() {
        let ds = sample();
        let spec = FilterSpec {
            batter_side: SideFilter::Only(BatterSide::Right),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &spec), vec![0, 2]);
    }

    #[test]
    fn runners_on_includes_unrecorded_state() {
        let ds = sample();
        let on = FilterSpec {
            runners: RunnerFilter::RunnersOn,
            ..Default::default()
        };
        let empty = FilterSpec {
            runners: RunnerFilter::BasesEmpty,
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &on), vec![1, 2]);
        assert_eq!(filtered_indices(&ds, &empty), vec![0, 3]);
    }

    #[test]
    fn pitch_type_set_and_pitcher_combine() {
        let ds = sample();
        let spec = FilterSpec {
            pitcher: Some("Ahn Woo-jin".into()),
            pitch_types: ["직구".to_string(), "슬라".to_string()].into(),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &spec), vec![2]);
    }

    #[test]
    fn suggestions_match_substring_case_insensitively() {
        let ds = sample();
        assert_eq!(pitcher_suggestions(&ds, "  kim "), vec!["Kim Kwang-hyun"]);
        assert_eq!(pitcher_suggestions(&ds, "WOO"), vec!["Ahn Woo-jin"]);
        assert_eq!(pitcher_suggestions(&ds, "").len(), 2);
        assert!(pitcher_suggestions(&ds, "Ryu").is_empty());
    }

    // -- properties --

    fn arb_record() -> impl Strategy<Value = PitchRecord> {
        (
            2023i32..=2024,
            1u32..=12,
            1u32..=28,
            0usize..3,
            0usize..4,
            0usize..3,
            0usize..3,
        )
            .prop_map(|(y, m, d, who, kind, side, runners)| {
                let mut rec = PitchRecord::new(
                    day(y, m, d),
                    ["Kim", "Ahn", "Park"][who],
                    Some(["직구", "슬라", "커브", "포크"][kind]),
                );
                rec.batter_side = [Some(BatterSide::Right), Some(BatterSide::Left), None][side];
                rec.runner_state = [
                    Some(RunnerState::Empty),
                    Some(RunnerState::Occupied("만루".into())),
                    None,
                ][runners]
                    .clone();
                rec
            })
    }

    fn arb_spec() -> impl Strategy<Value = FilterSpec> {
        (
            proptest::option::of((0u32..400, 0u32..400)),
            proptest::option::of(2023i32..=2024),
            0u32..=12,
            proptest::option::of(0usize..3),
            0usize..3,
            proptest::collection::btree_set(0usize..4, 0..3),
            0usize..3,
        )
            .prop_map(|(range, year, month, who, side, kinds, runners)| FilterSpec {
                date_range: range.map(|(a, b)| {
                    let base = day(2023, 1, 1);
                    (
                        base + chrono::Days::new(a as u64 * 2),
                        base + chrono::Days::new(b as u64 * 2),
                    )
                }),
                year,
                month: if month == 0 {
                    MonthFilter::All
                } else {
                    MonthFilter::Month(month)
                },
                pitcher: who.map(|i| ["Kim", "Ahn", "Park"][i].to_string()),
                batter_side: [
                    SideFilter::All,
                    SideFilter::Only(BatterSide::Right),
                    SideFilter::Only(BatterSide::Left),
                ][side],
                pitch_types: kinds
                    .into_iter()
                    .map(|k| ["직구", "슬라", "커브", "포크"][k].to_string())
                    .collect(),
                runners: [
                    RunnerFilter::All,
                    RunnerFilter::BasesEmpty,
                    RunnerFilter::RunnersOn,
                ][runners],
            })
    }

    proptest! {
        #[test]
        fn prop_result_is_ordered_subset(
            records in proptest::collection::vec(arb_record(), 0..60),
            spec in arb_spec(),
        ) {
            let ds = PitchDataset::from_records(records);
            let idx = filtered_indices(&ds, &spec);
            prop_assert!(idx.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(idx.iter().all(|&i| i < ds.len()));
        }

        #[test]
        fn prop_dropping_a_filter_never_shrinks_result(
            records in proptest::collection::vec(arb_record(), 0..60),
            spec in arb_spec(),
        ) {
            let preds = spec.predicates();
            let all = matching_indices(&records, &preds);
            for skip in 0..preds.len() {
                let fewer: Vec<Predicate> = preds
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != skip)
                    .map(|(_, p)| p.clone())
                    .collect();
                let looser = matching_indices(&records, &fewer);
                prop_assert!(all.iter().all(|i| looser.contains(i)));
            }
        }

        #[test]
        fn prop_predicate_order_is_irrelevant(
            records in proptest::collection::vec(arb_record(), 0..60),
            spec in arb_spec(),
            rotation in 0usize..7,
        ) {
            let preds = spec.predicates();
            let mut reordered = preds.clone();
            reordered.reverse();
            if !reordered.is_empty() {
                let len = reordered.len();
                reordered.rotate_left(rotation % len);
            }

            // Sequential narrowing, one predicate at a time.
            let mut sequential: Vec<usize> = (0..records.len()).collect();
            for p in &reordered {
                sequential.retain(|&i| p.matches(&records[i]));
            }

            prop_assert_eq!(matching_indices(&records, &preds), sequential);
        }
    }
}

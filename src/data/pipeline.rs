use log::info;

use super::aggregate::{summarize, PitchSummary};
use super::filter::{filtered_indices, FilterSpec};
use super::model::PitchDataset;

/// Whether the user has asked for the filters to be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunTrigger {
    #[default]
    Idle,
    Requested,
}

/// Filtered subset plus its per-pitch-type summary.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Analysis {
    /// Indices into the dataset, in dataset order.
    pub indices: Vec<usize>,
    pub summary: Vec<PitchSummary>,
}

impl Analysis {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Result of one pass through the pipeline.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Outcome {
    /// Run has not been pressed yet.
    #[default]
    NotRun,
    /// Filters matched nothing; the UI prompts for new filters.
    NoMatches,
    Ready(Analysis),
}

/// Filter `dataset` with `spec` and summarise what is left.
///
/// An empty subset skips aggregation.
pub fn apply(dataset: &PitchDataset, spec: &FilterSpec) -> Analysis {
    let indices = filtered_indices(dataset, spec);
    let summary = if indices.is_empty() {
        Vec::new()
    } else {
        summarize(&dataset.select(&indices))
    };
    Analysis { indices, summary }
}

/// [`apply`], gated on the run trigger.
pub fn run(dataset: &PitchDataset, spec: &FilterSpec, trigger: RunTrigger) -> Outcome {
    if trigger == RunTrigger::Idle {
        return Outcome::NotRun;
    }
    let analysis = apply(dataset, spec);
    info!(
        "Filters kept {} of {} pitches across {} pitch types",
        analysis.indices.len(),
        dataset.len(),
        analysis.summary.len()
    );
    if analysis.is_empty() {
        Outcome::NoMatches
    } else {
        Outcome::Ready(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::MonthFilter;
    use crate::data::model::PitchRecord;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dataset() -> PitchDataset {
        PitchDataset::from_records(vec![
            PitchRecord::new(day(2024, 4, 2), "Kim", Some("A")),
            PitchRecord::new(day(2024, 4, 2), "Kim", Some("A")),
            PitchRecord::new(day(2024, 6, 9), "Kim", Some("B")),
            PitchRecord::new(day(2024, 7, 1), "Kim", Some("A")),
        ])
    }

    #[test]
    fn idle_trigger_skips_the_pipeline() {
        let out = run(&dataset(), &FilterSpec::default(), RunTrigger::Idle);
        assert_eq!(out, Outcome::NotRun);
    }

    #[test]
    fn year_filter_matching_everything_summarises_both_types() {
        let spec = FilterSpec {
            year: Some(2024),
            ..Default::default()
        };
        let Outcome::Ready(analysis) = run(&dataset(), &spec, RunTrigger::Requested) else {
            panic!("expected a result");
        };
        assert_eq!(analysis.indices, vec![0, 1, 2, 3]);
        assert_eq!(analysis.summary.len(), 2);
        assert_eq!(analysis.summary[0].count, 3);
        assert_eq!(analysis.summary[0].share_pct, 75.0);
        assert_eq!(analysis.summary[1].count, 1);
        assert_eq!(analysis.summary[1].share_pct, 25.0);
    }

    #[test]
    fn reversed_range_yields_no_matches_without_error() {
        let spec = FilterSpec {
            date_range: Some((day(2024, 12, 1), day(2024, 1, 1))),
            ..Default::default()
        };
        assert_eq!(run(&dataset(), &spec, RunTrigger::Requested), Outcome::NoMatches);
        assert!(apply(&dataset(), &spec).summary.is_empty());
    }

    #[test]
    fn empty_pitch_type_selection_does_not_filter() {
        let ds = dataset();
        let spec = FilterSpec {
            month: MonthFilter::Month(4),
            ..Default::default()
        };
        let mut with_empty_set = spec.clone();
        with_empty_set.pitch_types.clear();
        assert_eq!(apply(&ds, &spec), apply(&ds, &with_empty_set));
        assert_eq!(apply(&ds, &spec).indices, vec![0, 1]);
    }

    proptest! {
        #[test]
        fn prop_apply_is_idempotent(month in 0u32..=12, year in proptest::option::of(2023i32..=2025)) {
            let ds = dataset();
            let spec = FilterSpec {
                year,
                month: if month == 0 { MonthFilter::All } else { MonthFilter::Month(month) },
                ..Default::default()
            };
            prop_assert_eq!(apply(&ds, &spec), apply(&ds, &spec));
        }
    }
}

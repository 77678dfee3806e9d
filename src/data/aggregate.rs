use super::model::{canonical_rank, PitchRecord, BALL_CALL};

// ---------------------------------------------------------------------------
// Per-pitch-type summary row
// ---------------------------------------------------------------------------

/// Summary statistics for one pitch type in the filtered subset.
///
/// Averages skip missing measurements and are `None` when the group has none.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchSummary {
    pub pitch_type: String,
    pub count: usize,
    /// Share of the filtered subset, one decimal.
    pub share_pct: f64,
    /// Non-ball calls over recorded calls, one decimal.
    pub strike_pct: f64,
    pub avg_speed: Option<f64>,
    pub max_speed: Option<f64>,
    pub avg_spin: Option<f64>,
    pub avg_spin_efficiency: Option<f64>,
    pub tilt_mode: Option<String>,
    pub avg_vert_break: Option<f64>,
    pub avg_horz_break: Option<f64>,
    pub avg_exit_speed: Option<f64>,
    /// Release geometry, scaled ×100 for display.
    pub avg_release_height: Option<f64>,
    pub avg_release_side: Option<f64>,
    pub avg_extension: Option<f64>,
}

/// Column headings matching [`PitchSummary::cells`].
pub const SUMMARY_COLUMNS: [&str; 15] = [
    "Pitch",
    "Count",
    "Share %",
    "Strike %",
    "Avg speed",
    "Max speed",
    "Spin",
    "Spin eff.",
    "Tilt",
    "IVB",
    "HB",
    "Exit speed",
    "Rel. height",
    "Rel. side",
    "Extension",
];

impl PitchSummary {
    /// Display text for each column, blank where a value is missing.
    pub fn cells(&self) -> [String; 15] {
        let whole = |v: Option<f64>| v.map(|v| format!("{v:.0}")).unwrap_or_default();
        let tenth = |v: Option<f64>| v.map(|v| format!("{v:.1}")).unwrap_or_default();
        [
            self.pitch_type.clone(),
            self.count.to_string(),
            format!("{:.1}", self.share_pct),
            format!("{:.1}", self.strike_pct),
            whole(self.avg_speed),
            whole(self.max_speed),
            whole(self.avg_spin),
            whole(self.avg_spin_efficiency),
            self.tilt_mode.clone().unwrap_or_default(),
            tenth(self.avg_vert_break),
            tenth(self.avg_horz_break),
            whole(self.avg_exit_speed),
            whole(self.avg_release_height),
            whole(self.avg_release_side),
            whole(self.avg_extension),
        ]
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Group `records` by pitch type and summarise each group.
///
/// Rows follow the canonical pitch-type order; types outside it come last in
/// order of first appearance. Records without a pitch type count towards the
/// total but form no row.
pub fn summarize(records: &[&PitchRecord]) -> Vec<PitchSummary> {
    let total = records.len();
    if total == 0 {
        return Vec::new();
    }

    let mut groups: Vec<(&str, Vec<&PitchRecord>)> = Vec::new();
    for &rec in records {
        let Some(pt) = rec.pitch_type.as_deref() else {
            continue;
        };
        match groups.iter_mut().find(|(name, _)| *name == pt) {
            Some((_, members)) => members.push(rec),
            None => groups.push((pt, vec![rec])),
        }
    }
    // Stable sort keeps first-appearance order among unknown types.
    groups.sort_by_key(|(name, _)| canonical_rank(name).unwrap_or(usize::MAX));

    groups
        .into_iter()
        .map(|(name, members)| summarize_group(name, &members, total))
        .collect()
}

fn summarize_group(pitch_type: &str, members: &[&PitchRecord], total: usize) -> PitchSummary {
    let count = members.len();
    let field = |get: fn(&PitchRecord) -> Option<f64>| values(members, get);

    let calls: Vec<&str> = members.iter().filter_map(|r| r.umpire_call.as_deref()).collect();
    let strikes = calls.iter().filter(|c| **c != BALL_CALL).count();
    let strike_pct = if calls.is_empty() {
        0.0
    } else {
        round_to(strikes as f64 / calls.len() as f64 * 100.0, 1)
    };

    let scaled = |v: Option<f64>| v.map(|m| round_to(m * 100.0, 0));

    PitchSummary {
        pitch_type: pitch_type.to_string(),
        count,
        share_pct: round_to(count as f64 / total as f64 * 100.0, 1),
        strike_pct,
        avg_speed: mean(field(|r| r.release_speed)).map(|m| round_to(m, 0)),
        max_speed: field(|r| r.release_speed).reduce(f64::max).map(|m| round_to(m, 0)),
        avg_spin: mean(field(|r| r.spin_rate)).map(|m| round_to(m, 0)),
        avg_spin_efficiency: mean(field(|r| r.spin_efficiency)).map(|m| round_to(m, 0)),
        tilt_mode: mode(members.iter().filter_map(|r| r.tilt.as_deref())),
        avg_vert_break: mean(field(|r| r.induced_vert_break)).map(|m| round_to(m, 1)),
        avg_horz_break: mean(field(|r| r.horz_break)).map(|m| round_to(m, 1)),
        avg_exit_speed: mean(field(|r| r.exit_speed)).map(|m| round_to(m, 0)),
        avg_release_height: scaled(mean(field(|r| r.release_height))),
        avg_release_side: scaled(mean(field(|r| r.release_side))),
        avg_extension: scaled(mean(field(|r| r.extension))),
    }
}

// ---------------------------------------------------------------------------
// Statistics helpers
// ---------------------------------------------------------------------------

/// Round half to even at `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

fn values<'a>(
    members: &'a [&'a PitchRecord],
    get: fn(&PitchRecord) -> Option<f64>,
) -> impl Iterator<Item = f64> + 'a {
    members.iter().filter_map(move |r| get(r))
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Most frequent value; ties go to the value seen first.
fn mode<'a>(values: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for v in values {
        match counts.iter_mut().find(|(seen, _)| *seen == v) {
            Some((_, n)) => *n += 1,
            None => counts.push((v, 1)),
        }
    }
    let mut best: Option<(&str, usize)> = None;
    for (v, n) in counts {
        if best.map_or(true, |(_, top)| n > top) {
            best = Some((v, n));
        }
    }
    best.map(|(v, _)| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn pitch(pitch_type: &str) -> PitchRecord {
        PitchRecord::new(NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(), "Kim", Some(pitch_type))
    }

    #[test]
    fn three_to_one_split() {
        let recs = [pitch("A"), pitch("A"), pitch("B"), pitch("A")];
        let refs: Vec<&PitchRecord> = recs.iter().collect();
        let rows = summarize(&refs);

        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].pitch_type.as_str(), rows[0].count), ("A", 3));
        assert_eq!(rows[0].share_pct, 75.0);
        assert_eq!((rows[1].pitch_type.as_str(), rows[1].count), ("B", 1));
        assert_eq!(rows[1].share_pct, 25.0);
    }

    #[test]
    fn rows_follow_canonical_order_then_first_seen() {
        let recs = [pitch("커브"), pitch("sinker"), pitch("직구"), pitch("eephus"), pitch("슬라")];
        let refs: Vec<&PitchRecord> = recs.iter().collect();
        let order: Vec<String> = summarize(&refs).into_iter().map(|r| r.pitch_type).collect();
        assert_eq!(order, vec!["직구", "슬라", "커브", "sinker", "eephus"]);
    }

    #[test]
    fn empty_input_has_no_rows() {
        assert!(summarize(&[]).is_empty());
    }

    #[test]
    fn untyped_pitches_count_towards_share_only() {
        let mut untyped = pitch("직구");
        untyped.pitch_type = None;
        let recs = [pitch("직구"), untyped];
        let refs: Vec<&PitchRecord> = recs.iter().collect();
        let rows = summarize(&refs);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].share_pct, 50.0);
    }

    #[test]
    fn measurements_are_averaged_and_rounded() {
        let mut recs = vec![pitch("직구"), pitch("직구"), pitch("직구")];
        let calls = [Some("B"), Some("S"), None];
        let speeds = [Some(145.4), Some(148.9), None];
        let tilts = [Some("1:30"), Some("12:45"), Some("12:45")];
        for (i, rec) in recs.iter_mut().enumerate() {
            rec.umpire_call = calls[i].map(str::to_string);
            rec.release_speed = speeds[i];
            rec.tilt = tilts[i].map(str::to_string);
            rec.induced_vert_break = Some(40.0 + i as f64 * 0.5);
            rec.release_height = Some(1.8);
            rec.extension = Some(1.9 + i as f64 * 0.01);
        }
        let refs: Vec<&PitchRecord> = recs.iter().collect();
        let row = &summarize(&refs)[0];

        assert_eq!(row.strike_pct, 50.0);
        assert_eq!(row.avg_speed, Some(147.0));
        assert_eq!(row.max_speed, Some(149.0));
        assert_eq!(row.tilt_mode.as_deref(), Some("12:45"));
        assert_eq!(row.avg_vert_break, Some(40.5));
        assert_eq!(row.avg_release_height, Some(180.0));
        assert_eq!(row.avg_extension, Some(191.0));
        assert_eq!(row.avg_spin, None);
        assert_eq!(row.avg_exit_speed, None);
    }

    #[test]
    fn strike_rate_is_zero_without_calls() {
        let recs = [pitch("직구")];
        let refs: Vec<&PitchRecord> = recs.iter().collect();
        assert_eq!(summarize(&refs)[0].strike_pct, 0.0);
    }

    #[test]
    fn tilt_mode_ties_go_to_first_seen() {
        assert_eq!(mode(["2:00", "1:00", "1:00", "2:00"].into_iter()).as_deref(), Some("2:00"));
        assert_eq!(mode(std::iter::empty()), None);
    }

    #[test]
    fn rounding_is_half_to_even() {
        assert_eq!(round_to(0.5, 0), 0.0);
        assert_eq!(round_to(1.5, 0), 2.0);
        assert_eq!(round_to(33.333, 1), 33.3);
        assert_eq!(round_to(-2.5, 0), -2.0);
    }

    #[test]
    fn cells_render_missing_values_blank() {
        let recs = [pitch("직구")];
        let refs: Vec<&PitchRecord> = recs.iter().collect();
        let cells = summarize(&refs)[0].cells();
        assert_eq!(cells[0], "직구");
        assert_eq!(cells[2], "100.0");
        assert_eq!(cells[4], "");
        assert_eq!(cells.len(), SUMMARY_COLUMNS.len());
    }

    proptest! {
        #[test]
        fn prop_shares_sum_to_hundred(kinds in proptest::collection::vec(0usize..6, 1..200)) {
            let labels = ["직구", "슬라", "커브", "포크", "x", "y"];
            let recs: Vec<PitchRecord> = kinds.iter().map(|&k| pitch(labels[k])).collect();
            let refs: Vec<&PitchRecord> = recs.iter().collect();
            let rows = summarize(&refs);

            let total: f64 = rows.iter().map(|r| r.share_pct).sum();
            let tolerance = 0.1 * rows.len() as f64 + 1e-9;
            prop_assert!((total - 100.0).abs() <= tolerance, "total {total}");
            prop_assert_eq!(rows.iter().map(|r| r.count).sum::<usize>(), recs.len());
        }
    }
}

//! Per-participant reduction.
//!
//! A participant may pursue several targets that each track the same metric.
//! [`Reducer`] keeps the most recent recording per target and reduces those
//! latest values to their median, in one pass over the input slice.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::period::PeriodKey;
use crate::recording::RawRecording;

/// One participant's representative value for one metric and period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReducedValue {
    pub participant_id: String,
    pub metric_id: String,
    pub period: PeriodKey,
    pub value: f64,
    /// Interpretable recordings that contributed, across all targets.
    pub recordings: usize,
    /// Fewer than two recordings: excluded from banding, still "has data".
    pub is_new: bool,
}

#[derive(Debug, Clone, Copy)]
struct Latest {
    date: NaiveDate,
    seq: usize,
    value: f64,
}

#[derive(Debug, Default)]
struct ParticipantAccumulator<'a> {
    recordings: usize,
    latest_by_target: HashMap<&'a str, Latest>,
}

/// Single-pass accumulator for one metric within one period.
#[derive(Debug)]
pub struct Reducer<'a> {
    metric_id: &'a str,
    participants: HashMap<&'a str, ParticipantAccumulator<'a>>,
    seq: usize,
}

impl<'a> Reducer<'a> {
    pub fn new(metric_id: &'a str) -> Self {
        Self {
            metric_id,
            participants: HashMap::new(),
            seq: 0,
        }
    }

    /// Record an already-interpreted value. Later pushes win ties on
    /// `effective_date` for the same target.
    pub fn push(&mut self, recording: &'a RawRecording, value: f64) {
        let seq = self.seq;
        self.seq += 1;

        let acc = self
            .participants
            .entry(recording.participant_id.as_str())
            .or_default();
        acc.recordings += 1;

        let candidate = Latest {
            date: recording.effective_date,
            seq,
            value,
        };
        acc.latest_by_target
            .entry(recording.target_id.as_str())
            .and_modify(|current| {
                if (candidate.date, candidate.seq) >= (current.date, current.seq) {
                    *current = candidate;
                }
            })
            .or_insert(candidate);
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Reduce every participant seen. Output is ordered by participant id.
    pub fn finish(self, period: PeriodKey) -> Vec<ReducedValue> {
        let metric_id = self.metric_id;
        let mut reduced: Vec<ReducedValue> = self
            .participants
            .into_iter()
            .filter_map(|(participant_id, acc)| {
                let mut latest: Vec<f64> = acc.latest_by_target.values().map(|l| l.value).collect();
                let value = median(&mut latest)?;
                Some(ReducedValue {
                    participant_id: participant_id.to_string(),
                    metric_id: metric_id.to_string(),
                    period,
                    value,
                    recordings: acc.recordings,
                    is_new: acc.recordings < 2,
                })
            })
            .collect();
        reduced.sort_by(|a, b| a.participant_id.cmp(&b.participant_id));
        reduced
    }
}

/// Median of `values`; the mean of the two central values for an even count.
/// Reorders the slice.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn rec(participant: &str, target: &str, value: f64, d: u32) -> RawRecording {
        RawRecording::new(participant, target, "wellbeing", value, day(d))
    }

    fn reduce_all(rows: &[RawRecording]) -> Vec<ReducedValue> {
        let mut reducer = Reducer::new("wellbeing");
        for r in rows {
            reducer.push(r, r.value.as_scale_value().unwrap());
        }
        reducer.finish(PeriodKey::Window)
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&mut [5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(median(&mut [4.0, 2.0]), Some(3.0));
        assert_eq!(median(&mut []), None);
    }

    #[test]
    fn test_median_across_target_latest_values() {
        let rows = vec![
            rec("p1", "goal-a", 9.0, 1),
            rec("p1", "goal-a", 1.0, 10),
            rec("p1", "goal-b", 3.0, 4),
            rec("p1", "goal-c", 5.0, 2),
        ];
        let reduced = reduce_all(&rows);
        assert_eq!(reduced.len(), 1);
        assert_eq!(reduced[0].value, 3.0);
        assert_eq!(reduced[0].recordings, 4);
        assert!(!reduced[0].is_new);
    }

    #[test]
    fn test_even_target_count_averages_central_values() {
        let rows = vec![rec("p1", "goal-a", 2.0, 1), rec("p1", "goal-b", 4.0, 1)];
        assert_eq!(reduce_all(&rows)[0].value, 3.0);
    }

    #[test]
    fn test_single_recording_is_new() {
        let rows = vec![
            rec("p1", "goal-a", 2.0, 1),
            rec("p2", "goal-a", 4.0, 1),
            rec("p2", "goal-a", 5.0, 2),
        ];
        let reduced = reduce_all(&rows);
        assert_eq!(reduced[0].participant_id, "p1");
        assert!(reduced[0].is_new);
        assert!(!reduced[1].is_new);
        assert_eq!(reduced[1].value, 5.0);
    }

    #[test]
    fn test_same_day_tie_prefers_later_row() {
        let rows = vec![rec("p1", "goal-a", 2.0, 3), rec("p1", "goal-a", 4.0, 3)];
        assert_eq!(reduce_all(&rows)[0].value, 4.0);
    }

    #[test]
    fn test_out_of_order_input_keeps_latest_date() {
        let rows = vec![rec("p1", "goal-a", 4.0, 9), rec("p1", "goal-a", 2.0, 3)];
        assert_eq!(reduce_all(&rows)[0].value, 4.0);
    }

    #[test]
    fn test_empty_reducer_finishes_empty() {
        let reducer = Reducer::new("wellbeing");
        assert!(reducer.is_empty());
        assert!(reducer.finish(PeriodKey::Window).is_empty());
    }
}

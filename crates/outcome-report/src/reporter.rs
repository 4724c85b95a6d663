//! Program report assembly.
//!
//! [`ProgramReporter`] fetches definitions, recordings, and enrollment
//! through the source traits, evaluates every metric on a [`JoinSet`], and
//! assembles a [`ProgramOutcomeReport`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use futures::future::try_join_all;
use outcome_engine::obs::{emit_definition_rejected, emit_report_built, ReportSpan};
use outcome_engine::{
    aggregate_achievement, aggregate_distribution, compare_streams, compute_completeness,
    compute_trend, count_participants_with_data, AchievementResult, DistributionResult,
    Evaluation, MetricDefinition, MetricKind, OutcomeError, RawRecording, ReportingPolicy,
    StreamRate, TrendPoint,
};
use outcome_sources::{EnrollmentSource, MetricDefinitionSource, RawValueSource};
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::error::{ReportError, ReportResult};
use crate::report::{
    IgnoredRecords, MetricConfigError, MetricTrend, ProgramOutcomeReport, StreamComparison,
};
use crate::request::ReportRequest;

/// Everything one metric produced.
#[derive(Debug)]
enum MetricEvaluation {
    Scale {
        distribution: Evaluation<DistributionResult>,
        trend: Evaluation<Vec<TrendPoint>>,
    },
    Achievement(Evaluation<AchievementResult>),
}

impl MetricEvaluation {
    fn ignored_records(&self) -> u64 {
        match self {
            Self::Scale { distribution, .. } => distribution.ignored_records,
            Self::Achievement(eval) => eval.ignored_records,
        }
    }

    fn stream_rate(&self) -> Option<StreamRate> {
        match self {
            Self::Scale { distribution, .. } => {
                distribution.result().and_then(StreamRate::from_high_band)
            }
            Self::Achievement(eval) => eval.result().and_then(StreamRate::from_achievement),
        }
    }

    fn is_withheld(&self) -> bool {
        match self {
            Self::Scale { distribution, .. } => !distribution.is_reported(),
            Self::Achievement(eval) => !eval.is_reported(),
        }
    }
}

fn evaluate_metric(
    definition: &MetricDefinition,
    recordings: &[RawRecording],
    policy: &ReportingPolicy,
) -> outcome_engine::Result<MetricEvaluation> {
    match definition.kind {
        MetricKind::Scale(_) => Ok(MetricEvaluation::Scale {
            distribution: aggregate_distribution(definition, recordings, policy)?,
            trend: compute_trend(definition, recordings, policy)?,
        }),
        MetricKind::Achievement(_) => Ok(MetricEvaluation::Achievement(aggregate_achievement(
            definition, recordings, policy,
        )?)),
    }
}

/// Builds program outcome reports from injectable data sources.
pub struct ProgramReporter {
    definitions: Arc<dyn MetricDefinitionSource>,
    recordings: Arc<dyn RawValueSource>,
    enrollment: Arc<dyn EnrollmentSource>,
    policy: Arc<ReportingPolicy>,
}

impl ProgramReporter {
    /// Create a reporter using the default reporting policy.
    pub fn new(
        definitions: Arc<dyn MetricDefinitionSource>,
        recordings: Arc<dyn RawValueSource>,
        enrollment: Arc<dyn EnrollmentSource>,
    ) -> Self {
        Self {
            definitions,
            recordings,
            enrollment,
            policy: Arc::new(ReportingPolicy::default()),
        }
    }

    /// Replace the reporting policy after validating it.
    pub fn with_policy(mut self, policy: ReportingPolicy) -> ReportResult<Self> {
        policy.validate()?;
        self.policy = Arc::new(policy);
        Ok(self)
    }

    pub fn policy(&self) -> &ReportingPolicy {
        &self.policy
    }

    /// Build the report for `request`.
    ///
    /// Source failures abort the build. A malformed metric definition is
    /// recorded in `configuration_errors` and the other metrics proceed.
    pub async fn build(&self, request: &ReportRequest) -> ReportResult<ProgramOutcomeReport> {
        let program_id = request.program_id.as_str();
        let period = request.period;
        let metric_ids = request.evaluated_metric_ids();

        tracing::debug!(
            program_id = %program_id,
            metrics = metric_ids.len(),
            period = %period,
            "fetching report inputs"
        );
        let definitions = try_join_all(
            metric_ids
                .iter()
                .map(|id| self.definitions.get_metric_definition(id)),
        )
        .await?;

        let (mut recordings, enrolled_count) = tokio::try_join!(
            self.recordings
                .get_raw_recordings(program_id, &metric_ids, &period),
            self.enrollment.get_enrolled_count(program_id, &period),
        )?;

        let fetched = recordings.len();
        recordings.retain(|r| period.contains(r.effective_date));
        if recordings.len() < fetched {
            tracing::debug!(
                program_id = %program_id,
                dropped = fetched - recordings.len(),
                "recordings outside reporting period dropped"
            );
        }
        let recordings = Arc::new(recordings);

        let mut join_set = JoinSet::new();
        for (idx, definition) in definitions.into_iter().enumerate() {
            let recordings = Arc::clone(&recordings);
            let policy = Arc::clone(&self.policy);
            join_set.spawn_blocking(move || {
                let outcome = evaluate_metric(&definition, &recordings, &policy);
                (idx, definition.id, outcome)
            });
        }

        let mut ordered: Vec<Option<(String, outcome_engine::Result<MetricEvaluation>)>> =
            (0..metric_ids.len()).map(|_| None).collect();
        while let Some(joined) = join_set.join_next().await {
            let (idx, metric_id, outcome) = joined
                .map_err(|e| ReportError::Join(format!("metric evaluation task failed: {e}")))?;
            ordered[idx] = Some((metric_id, outcome));
        }

        // Not Send: must stay below the last await.
        let _span = ReportSpan::enter(program_id);
        let mut evaluations: Vec<(String, MetricEvaluation)> = Vec::new();
        let mut configuration_errors = Vec::new();
        for (slot, requested_id) in ordered.into_iter().zip(&metric_ids) {
            let (metric_id, outcome) = slot.ok_or_else(|| {
                ReportError::Join(format!("missing evaluation result for metric '{requested_id}'"))
            })?;
            match outcome {
                Ok(evaluation) => evaluations.push((metric_id, evaluation)),
                Err(err @ OutcomeError::InvalidDefinition { .. })
                | Err(err @ OutcomeError::KindMismatch { .. }) => {
                    emit_definition_rejected(&metric_id, &err);
                    configuration_errors.push(MetricConfigError {
                        metric_id,
                        message: err.to_string(),
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }

        let stream_rates: HashMap<&str, StreamRate> = evaluations
            .iter()
            .filter_map(|(id, eval)| eval.stream_rate().map(|rate| (id.as_str(), rate)))
            .collect();
        let two_streams: Vec<StreamComparison> = request
            .stream_pairs
            .iter()
            .map(|pair| StreamComparison {
                label: pair.label.clone(),
                self_report_metric: pair.self_report_metric.clone(),
                observer_metric: pair.observer_metric.clone(),
                result: compare_streams(
                    stream_rates.get(pair.self_report_metric.as_str()).copied(),
                    stream_rates.get(pair.observer_metric.as_str()).copied(),
                    &self.policy,
                ),
            })
            .collect();

        let completeness = compute_completeness(
            enrolled_count,
            count_participants_with_data(&recordings),
            &self.policy,
        );

        let withheld = evaluations.iter().filter(|(_, e)| e.is_withheld()).count();
        let evaluated = evaluations.len();

        let mut distributions = Vec::new();
        let mut achievements = Vec::new();
        let mut trends = Vec::new();
        let mut ignored_records = Vec::new();
        for (metric_id, evaluation) in evaluations {
            let ignored = evaluation.ignored_records();
            if ignored > 0 {
                ignored_records.push(IgnoredRecords {
                    metric_id: metric_id.clone(),
                    count: ignored,
                });
            }
            match evaluation {
                MetricEvaluation::Scale {
                    distribution,
                    trend,
                } => {
                    distributions.extend(distribution.into_result());
                    if let Some(points) = trend.into_result() {
                        trends.push(MetricTrend { metric_id, points });
                    }
                }
                MetricEvaluation::Achievement(eval) => achievements.extend(eval.into_result()),
            }
        }

        emit_report_built(program_id, evaluated, withheld);

        Ok(ProgramOutcomeReport {
            report_id: Uuid::new_v4(),
            program_id: program_id.to_string(),
            period,
            generated_at: Utc::now(),
            distributions,
            achievements,
            trends,
            two_streams,
            completeness,
            ignored_records,
            configuration_errors,
        })
    }
}

//! Health trend summaries for a single plant lot
//!
//! Compares a recent window of health observations with the equal-length
//! window before it and derives tiered recommendations and alerts from a
//! fixed rule table.
//!
//! Window layout for an `as_of` instant and a window of `w` days:
//!
//! ```text
//!   prior: (a - w, a]      recent: (as_of - w, as_of]
//! ```
//!
//! where `a` is the latest observation at or before `as_of - w`. With daily
//! logs `a` sits right at the recent window's edge; with sparse logs the
//! prior window jumps over the gap to the last period that has data.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{compare_windows, mean, Change};
use crate::models::{HealthObservation, HealthStatus};

/// Disease detection rate (percent) above which an alert is raised
pub const DISEASE_ALERT_THRESHOLD_PERCENT: Decimal = Decimal::from_parts(30, 0, 0, false, 0);

/// Scores below this raise an error alert
pub const CRITICAL_SCORE: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Scores below this (and at least `CRITICAL_SCORE`) raise a warning alert
pub const WARNING_SCORE: Decimal = Decimal::from_parts(70, 0, 0, false, 0);

/// Scores below this trigger an immediate action
pub const ACTION_SCORE: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

/// Full trend report for one lot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthTrendReport {
    pub plant_lot_id: Option<Uuid>,
    pub as_of: DateTime<Utc>,
    pub comparison_window_days: u32,
    /// Observations recorded at or before `as_of`
    pub observation_count: usize,
    pub current: Option<CurrentHealth>,
    pub health_trend: HealthTrend,
    pub disease: DiseaseFrequency,
    pub environment: EnvironmentalTrends,
    pub recommendations: Recommendations,
    pub alerts: Vec<HealthAlert>,
}

/// Snapshot of the latest observation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentHealth {
    pub observation_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub health_status: HealthStatus,
    /// Absent when the observation carries no valid score
    pub health_score: Option<Decimal>,
    pub disease_detected: bool,
    pub disease_type: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
    InsufficientData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthTrend {
    pub direction: TrendDirection,
    pub percentage_change: Option<Decimal>,
    pub recent_mean: Option<Decimal>,
    pub prior_mean: Option<Decimal>,
    pub recent_samples: usize,
    pub prior_samples: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskTrend {
    Worsening,
    Improving,
    Stable,
    InsufficientData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiseaseFrequency {
    /// `100 × diseased / total` over the full history; absent without observations
    pub detection_rate: Option<Decimal>,
    pub diseased_count: usize,
    pub total_count: usize,
    pub recent_rate: Option<Decimal>,
    pub prior_rate: Option<Decimal>,
    pub risk_trend: RiskTrend,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MetricDirection {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricTrend {
    pub recent_mean: Option<Decimal>,
    pub prior_mean: Option<Decimal>,
    pub direction: MetricDirection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentalTrends {
    pub temperature: MetricTrend,
    pub humidity: MetricTrend,
    pub soil_moisture: MetricTrend,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationTier {
    Immediate,
    ShortTerm,
    LongTerm,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Recommendations {
    pub immediate: Vec<String>,
    pub short_term: Vec<String>,
    pub long_term: Vec<String>,
}

impl Recommendations {
    pub fn is_empty(&self) -> bool {
        self.immediate.is_empty() && self.short_term.is_empty() && self.long_term.is_empty()
    }

    fn push(&mut self, tier: RecommendationTier, message: &str) {
        let list = match tier {
            RecommendationTier::Immediate => &mut self.immediate,
            RecommendationTier::ShortTerm => &mut self.short_term,
            RecommendationTier::LongTerm => &mut self.long_term,
        };
        list.push(message.to_string());
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthAlert {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub message: String,
    pub priority: AlertPriority,
}

/// Inputs the recommendation rules look at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleContext {
    pub current_score: Option<Decimal>,
    pub current_status: Option<HealthStatus>,
    pub health_trend: TrendDirection,
    pub risk_trend: RiskTrend,
    pub disease_rate: Option<Decimal>,
    pub recent_temperature: Option<Decimal>,
    pub recent_humidity: Option<Decimal>,
    pub recent_soil_moisture: Option<Decimal>,
}

/// One row of the recommendation table
pub struct RecommendationRule {
    pub id: &'static str,
    pub tier: RecommendationTier,
    pub message: &'static str,
    pub applies: fn(&RuleContext) -> bool,
}

fn above(value: Option<Decimal>, limit: i64) -> bool {
    value.is_some_and(|v| v > Decimal::from(limit))
}

fn below(value: Option<Decimal>, limit: i64) -> bool {
    value.is_some_and(|v| v < Decimal::from(limit))
}

/// Recommendation rules, evaluated in order
pub const RECOMMENDATION_RULES: &[RecommendationRule] = &[
    RecommendationRule {
        id: "low_score",
        tier: RecommendationTier::Immediate,
        message: "Inspect the lot and treat affected plants; health score is below 60",
        applies: |ctx| ctx.current_score.is_some_and(|s| s < ACTION_SCORE),
    },
    RecommendationRule {
        id: "isolate",
        tier: RecommendationTier::Immediate,
        message: "Isolate affected plants to prevent disease spread",
        applies: |ctx| ctx.current_status.is_some_and(|s| s.needs_isolation()),
    },
    RecommendationRule {
        id: "declining_trend",
        tier: RecommendationTier::ShortTerm,
        message: "Increase monitoring to every 2-3 days until the health score stabilises",
        applies: |ctx| ctx.health_trend == TrendDirection::Declining,
    },
    RecommendationRule {
        id: "rising_disease_treatment",
        tier: RecommendationTier::Immediate,
        message: "Apply targeted disease treatment; detection rate is rising",
        applies: |ctx| ctx.risk_trend == RiskTrend::Worsening,
    },
    RecommendationRule {
        id: "rising_disease_prevention",
        tier: RecommendationTier::LongTerm,
        message: "Review crop rotation and disease-resistant varieties for this zone",
        applies: |ctx| ctx.risk_trend == RiskTrend::Worsening,
    },
    RecommendationRule {
        id: "high_disease_rate",
        tier: RecommendationTier::LongTerm,
        message: "Revise the preventive spraying and sanitation schedule",
        applies: |ctx| {
            ctx.disease_rate
                .is_some_and(|r| r > DISEASE_ALERT_THRESHOLD_PERCENT)
        },
    },
    RecommendationRule {
        id: "high_humidity",
        tier: RecommendationTier::ShortTerm,
        message: "Improve air circulation; sustained high humidity favours fungal disease",
        applies: |ctx| above(ctx.recent_humidity, 85),
    },
    RecommendationRule {
        id: "high_temperature",
        tier: RecommendationTier::ShortTerm,
        message: "Provide shade or additional irrigation during peak heat",
        applies: |ctx| above(ctx.recent_temperature, 32),
    },
    RecommendationRule {
        id: "dry_soil",
        tier: RecommendationTier::ShortTerm,
        message: "Increase irrigation; soil moisture is below 30%",
        applies: |ctx| below(ctx.recent_soil_moisture, 30),
    },
    RecommendationRule {
        id: "improving_trend",
        tier: RecommendationTier::LongTerm,
        message: "Maintain the current care routine and document what changed",
        applies: |ctx| ctx.health_trend == TrendDirection::Improving,
    },
];

/// Apply the recommendation table to a context
pub fn recommend(ctx: &RuleContext) -> Recommendations {
    let mut recommendations = Recommendations::default();
    for rule in RECOMMENDATION_RULES {
        if (rule.applies)(ctx) {
            recommendations.push(rule.tier, rule.message);
        }
    }
    recommendations
}

/// Derive alerts from the current snapshot and the disease rate
pub fn derive_alerts(current: Option<&CurrentHealth>, disease_rate: Option<Decimal>) -> Vec<HealthAlert> {
    let mut alerts = Vec::new();

    if let Some(current) = current {
        match current.health_score {
            Some(score) if score < CRITICAL_SCORE => alerts.push(HealthAlert {
                alert_type: AlertType::Error,
                message: format!("Health score {} is critically low", score.normalize()),
                priority: AlertPriority::High,
            }),
            Some(score) if score < WARNING_SCORE => alerts.push(HealthAlert {
                alert_type: AlertType::Warning,
                message: format!("Health score {} needs attention", score.normalize()),
                priority: AlertPriority::Medium,
            }),
            Some(_) => {}
            None if current.health_status == HealthStatus::Critical => alerts.push(HealthAlert {
                alert_type: AlertType::Error,
                message: "Lot was last reported in critical condition".to_string(),
                priority: AlertPriority::High,
            }),
            None => {}
        }
    }

    if let Some(rate) = disease_rate.filter(|r| *r > DISEASE_ALERT_THRESHOLD_PERCENT) {
        alerts.push(HealthAlert {
            alert_type: AlertType::Warning,
            message: format!(
                "Disease detected in {}% of observations",
                rate.round_dp(1).normalize()
            ),
            priority: AlertPriority::Medium,
        });
    }

    alerts
}

/// Latest observation recorded at or before `as_of`
pub fn latest_observation(
    observations: &[HealthObservation],
    as_of: DateTime<Utc>,
) -> Option<&HealthObservation> {
    observations
        .iter()
        .filter(|o| o.recorded_at <= as_of)
        .max_by_key(|o| o.recorded_at)
}

/// Summarise the health history of one plant lot as of `as_of`.
///
/// Empty or sparse histories produce a report whose sections are marked
/// `insufficient_data`; this never fails.
pub fn summarize_trends(
    observations: &[HealthObservation],
    as_of: DateTime<Utc>,
    comparison_window_days: u32,
) -> HealthTrendReport {
    let mut history: Vec<&HealthObservation> =
        observations.iter().filter(|o| o.recorded_at <= as_of).collect();
    history.sort_by_key(|o| o.recorded_at);

    let current = history.last().map(|o| CurrentHealth {
        observation_id: o.id,
        recorded_at: o.recorded_at,
        health_status: o.health_status,
        health_score: o.valid_score(),
        disease_detected: o.disease_detected,
        disease_type: o.disease_type.clone(),
    });

    let (recent, prior) = split_windows(&history, as_of, comparison_window_days);

    let health_trend = health_trend(&recent, &prior);
    let disease = disease_frequency(&history, &recent, &prior);
    let environment = EnvironmentalTrends {
        temperature: metric_trend(&recent, &prior, |o| o.environment.temperature_celsius),
        humidity: metric_trend(&recent, &prior, |o| o.environment.humidity_percent),
        soil_moisture: metric_trend(&recent, &prior, |o| o.environment.soil_moisture_percent),
    };

    let ctx = RuleContext {
        current_score: current.as_ref().and_then(|c| c.health_score),
        current_status: current.as_ref().map(|c| c.health_status),
        health_trend: health_trend.direction,
        risk_trend: disease.risk_trend,
        disease_rate: disease.detection_rate,
        recent_temperature: environment.temperature.recent_mean,
        recent_humidity: environment.humidity.recent_mean,
        recent_soil_moisture: environment.soil_moisture.recent_mean,
    };
    let recommendations = recommend(&ctx);
    let alerts = derive_alerts(current.as_ref(), disease.detection_rate);

    HealthTrendReport {
        plant_lot_id: history.first().map(|o| o.plant_lot_id),
        as_of,
        comparison_window_days,
        observation_count: history.len(),
        current,
        health_trend,
        disease,
        environment,
        recommendations,
        alerts,
    }
}

type Window<'a> = Vec<&'a HealthObservation>;

/// Split a sorted history into the recent and prior comparison windows
fn split_windows<'a>(
    history: &[&'a HealthObservation],
    as_of: DateTime<Utc>,
    window_days: u32,
) -> (Window<'a>, Window<'a>) {
    if window_days == 0 {
        return (Vec::new(), Vec::new());
    }
    let window = Duration::days(i64::from(window_days));
    let Some(recent_start) = as_of.checked_sub_signed(window) else {
        return (Vec::new(), Vec::new());
    };

    let recent: Window = history
        .iter()
        .copied()
        .filter(|o| o.recorded_at > recent_start && o.recorded_at <= as_of)
        .collect();

    let anchor = history
        .iter()
        .rev()
        .find(|o| o.recorded_at <= recent_start)
        .map(|o| o.recorded_at);

    let prior: Window = match anchor.and_then(|a| a.checked_sub_signed(window).map(|s| (s, a))) {
        Some((prior_start, anchor)) => history
            .iter()
            .copied()
            .filter(|o| o.recorded_at > prior_start && o.recorded_at <= anchor)
            .collect(),
        None => Vec::new(),
    };

    (recent, prior)
}

fn health_trend(recent: &[&HealthObservation], prior: &[&HealthObservation]) -> HealthTrend {
    let recent_scores: Vec<Decimal> = recent.iter().filter_map(|o| o.valid_score()).collect();
    let prior_scores: Vec<Decimal> = prior.iter().filter_map(|o| o.valid_score()).collect();
    let recent_mean = mean(recent_scores.iter().copied());
    let prior_mean = mean(prior_scores.iter().copied());

    let (direction, percentage_change) = match compare_windows(recent_mean, prior_mean) {
        Change::Up(c) => (TrendDirection::Improving, Some(c)),
        Change::Down(c) => (TrendDirection::Declining, Some(c)),
        Change::Flat(c) => (TrendDirection::Stable, Some(c)),
        Change::Insufficient => (TrendDirection::InsufficientData, None),
    };

    HealthTrend {
        direction,
        percentage_change,
        recent_mean: recent_mean.map(|m| m.round_dp(2)),
        prior_mean: prior_mean.map(|m| m.round_dp(2)),
        recent_samples: recent_scores.len(),
        prior_samples: prior_scores.len(),
    }
}

/// Share of observations (percent) flagged with a disease
pub fn disease_rate(observations: &[&HealthObservation]) -> Option<Decimal> {
    if observations.is_empty() {
        return None;
    }
    let diseased = observations.iter().filter(|o| o.disease_detected).count();
    Some(Decimal::from(100 * diseased as u64) / Decimal::from(observations.len() as u64))
}

fn disease_frequency(
    history: &[&HealthObservation],
    recent: &[&HealthObservation],
    prior: &[&HealthObservation],
) -> DiseaseFrequency {
    let recent_rate = disease_rate(recent);
    let prior_rate = disease_rate(prior);

    let risk_trend = match (recent_rate, prior_rate) {
        (Some(recent), Some(prior)) if prior.is_zero() => {
            if recent > Decimal::ZERO {
                RiskTrend::Worsening
            } else {
                RiskTrend::Stable
            }
        }
        (recent, prior) => match compare_windows(recent, prior) {
            Change::Up(_) => RiskTrend::Worsening,
            Change::Down(_) => RiskTrend::Improving,
            Change::Flat(_) => RiskTrend::Stable,
            Change::Insufficient => RiskTrend::InsufficientData,
        },
    };

    DiseaseFrequency {
        detection_rate: disease_rate(history),
        diseased_count: history.iter().filter(|o| o.disease_detected).count(),
        total_count: history.len(),
        recent_rate,
        prior_rate,
        risk_trend,
    }
}

fn metric_trend<F>(recent: &[&HealthObservation], prior: &[&HealthObservation], metric: F) -> MetricTrend
where
    F: Fn(&HealthObservation) -> Option<Decimal>,
{
    let recent_mean = mean(recent.iter().filter_map(|o| metric(*o)));
    let prior_mean = mean(prior.iter().filter_map(|o| metric(*o)));

    let direction = match compare_windows(recent_mean, prior_mean) {
        Change::Up(_) => MetricDirection::Increasing,
        Change::Down(_) => MetricDirection::Decreasing,
        Change::Flat(_) => MetricDirection::Stable,
        Change::Insufficient => MetricDirection::InsufficientData,
    };

    MetricTrend {
        recent_mean: recent_mean.map(|m| m.round_dp(2)),
        prior_mean: prior_mean.map(|m| m.round_dp(2)),
        direction,
    }
}

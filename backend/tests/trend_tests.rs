//! Health trend summary tests
//!
//! Tests for the per-lot health trend report including:
//! - Window comparison and trend direction
//! - Disease detection frequency
//! - Recommendations and alerts for the latest snapshot

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::analytics::{
    disease_rate, percentage_change, summarize_trends, AlertPriority, AlertType, RiskTrend,
    TrendDirection, TREND_THRESHOLD_PERCENT,
};
use shared::{EnvironmentalMetrics, GrowthMetrics, HealthObservation, HealthStatus};
use uuid::Uuid;

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn observation(days_ago: i64, score: Option<i64>, diseased: bool) -> HealthObservation {
    let recorded_at = as_of() - Duration::days(days_ago);
    HealthObservation {
        id: Uuid::new_v4(),
        plant_lot_id: Uuid::nil(),
        recorded_at,
        recorded_by: None,
        health_status: if diseased {
            HealthStatus::Diseased
        } else {
            HealthStatus::Good
        },
        health_score: score.map(Decimal::from),
        disease_detected: diseased,
        disease_type: diseased.then(|| "leaf_blight".to_string()),
        disease_confidence: None,
        environment: EnvironmentalMetrics::default(),
        growth: GrowthMetrics::default(),
        images: Vec::new(),
        notes: None,
        ai_analysis: None,
        created_at: recorded_at,
    }
}

#[test]
fn test_declining_scores_over_sparse_history() {
    let history = vec![
        observation(40, Some(80), false),
        observation(35, Some(82), false),
        observation(5, Some(60), false),
        observation(2, Some(58), false),
    ];

    let report = summarize_trends(&history, as_of(), 14);

    assert_eq!(report.health_trend.prior_mean, Some(Decimal::from(81)));
    assert_eq!(report.health_trend.recent_mean, Some(Decimal::from(59)));
    assert_eq!(report.health_trend.percentage_change, Some(Decimal::new(-2716, 2)));
    assert_eq!(report.health_trend.direction, TrendDirection::Declining);
    assert!(!report.recommendations.short_term.is_empty());
}

#[test]
fn test_empty_history_is_insufficient() {
    let report = summarize_trends(&[], as_of(), 14);

    assert_eq!(report.observation_count, 0);
    assert!(report.current.is_none());
    assert_eq!(report.health_trend.direction, TrendDirection::InsufficientData);
    assert_eq!(report.disease.risk_trend, RiskTrend::InsufficientData);
    assert_eq!(report.disease.detection_rate, None);
    assert!(report.alerts.is_empty());
}

#[test]
fn test_single_unscored_observation() {
    let history = vec![observation(1, None, false)];

    let report = summarize_trends(&history, as_of(), 14);

    let current = report.current.expect("current snapshot");
    assert_eq!(current.health_score, None);
    assert_eq!(report.health_trend.direction, TrendDirection::InsufficientData);
}

#[test]
fn test_low_current_score_raises_high_priority_alert() {
    let history = vec![observation(20, Some(70), false), observation(1, Some(45), false)];

    let report = summarize_trends(&history, as_of(), 14);

    assert!(report
        .alerts
        .iter()
        .any(|a| a.alert_type == AlertType::Error && a.priority == AlertPriority::High));
}

#[test]
fn test_frequent_disease_raises_warning() {
    let history = vec![
        observation(10, Some(80), true),
        observation(5, Some(80), true),
        observation(1, Some(80), false),
    ];

    let report = summarize_trends(&history, as_of(), 14);

    assert_eq!(report.disease.diseased_count, 2);
    assert_eq!(report.disease.total_count, 3);
    assert!(report
        .alerts
        .iter()
        .any(|a| a.alert_type == AlertType::Warning && a.message.contains("66.7")));
}

#[test]
fn test_observations_after_as_of_are_ignored() {
    let history = vec![observation(3, Some(80), false), observation(-2, Some(10), true)];

    let report = summarize_trends(&history, as_of(), 14);

    assert_eq!(report.observation_count, 1);
    assert_eq!(report.disease.diseased_count, 0);
    assert_eq!(
        report.current.map(|c| c.health_score),
        Some(Some(Decimal::from(80)))
    );
}

#[test]
fn test_overflowing_environment_mean_is_dropped() {
    let mut history = vec![observation(3, Some(80), false), observation(1, Some(82), false)];
    for o in &mut history {
        o.environment.temperature_celsius = Some(Decimal::MAX);
        o.environment.humidity_percent = Some(Decimal::from(70));
    }

    let report = summarize_trends(&history, as_of(), 14);

    assert_eq!(report.environment.temperature.recent_mean, None);
    assert_eq!(report.environment.humidity.recent_mean, Some(Decimal::from(70)));
    assert_eq!(report.health_trend.recent_mean, Some(Decimal::from(81)));
}

proptest! {
    #[test]
    fn prop_disease_free_prior_window_sets_risk_by_recent_detections(
        prior_count in 1usize..6,
        recent_flags in prop::collection::vec(any::<bool>(), 1..20),
    ) {
        let mut history: Vec<HealthObservation> = (0..prior_count)
            .map(|_| observation(30, Some(75), false))
            .collect();
        history.extend(
            recent_flags
                .iter()
                .enumerate()
                .map(|(i, &d)| observation((i % 13) as i64, Some(75), d)),
        );

        let report = summarize_trends(&history, as_of(), 14);
        let expected = if recent_flags.iter().any(|d| *d) {
            RiskTrend::Worsening
        } else {
            RiskTrend::Stable
        };

        prop_assert_eq!(report.disease.prior_rate, Some(Decimal::ZERO));
        prop_assert_eq!(report.disease.risk_trend, expected);
    }

    #[test]
    fn prop_direction_matches_threshold(prior in 1i64..=100, recent in 0i64..=100) {
        let history = vec![
            observation(30, Some(prior), false),
            observation(1, Some(recent), false),
        ];

        let report = summarize_trends(&history, as_of(), 14);
        let change = percentage_change(Decimal::from(recent), Decimal::from(prior)).unwrap();

        let expected = if change > TREND_THRESHOLD_PERCENT {
            TrendDirection::Improving
        } else if change < -TREND_THRESHOLD_PERCENT {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        };
        prop_assert_eq!(report.health_trend.direction, expected);
        prop_assert_eq!(report.health_trend.percentage_change, Some(change));
    }

    #[test]
    fn prop_disease_rate_is_bounded(flags in prop::collection::vec(any::<bool>(), 1..60)) {
        let history: Vec<HealthObservation> = flags
            .iter()
            .enumerate()
            .map(|(i, &d)| observation(i as i64, Some(75), d))
            .collect();
        let refs: Vec<&HealthObservation> = history.iter().collect();

        let rate = disease_rate(&refs).unwrap();
        let diseased = flags.iter().filter(|d| **d).count() as u64;

        prop_assert!(rate >= Decimal::ZERO && rate <= Decimal::ONE_HUNDRED);
        prop_assert_eq!(
            rate,
            Decimal::from(100 * diseased) / Decimal::from(flags.len() as u64)
        );
    }

    #[test]
    fn prop_summary_never_panics(
        entries in prop::collection::vec((-30i64..400, prop::option::of(-50i64..150), any::<bool>()), 0..40),
        window in 0u32..400,
    ) {
        let history: Vec<HealthObservation> = entries
            .iter()
            .map(|&(days, score, diseased)| observation(days, score, diseased))
            .collect();

        let report = summarize_trends(&history, as_of(), window);
        prop_assert!(report.observation_count <= history.len());
    }
}

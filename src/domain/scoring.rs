// Form scoring - Weighted four-factor model for a finished rep
use crate::domain::rep::{FormIssue, RepMetrics};
use crate::domain::settings::{IssuePenalties, TrackerSettings};

pub const START_WEIGHT: f64 = 0.25;
pub const PEAK_WEIGHT: f64 = 0.35;
pub const SPEED_WEIGHT: f64 = 0.20;
pub const FORM_WEIGHT: f64 = 0.20;

pub const HOLD_BONUS: f64 = 5.0;

/// Used when a rep produced no usable speed samples
pub const NEUTRAL_SPEED_SCORE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub start: f64,
    pub peak: f64,
    pub speed: f64,
    pub form: f64,
    pub hold_bonus: f64,
    /// 1.0 unless the range of motion fell short
    pub range_factor: f64,
    pub total: f64,
}

/// 100 inside the tolerance, falling linearly to 0 at three tolerances out
pub fn position_score(actual: f64, ideal: f64, tolerance: f64) -> f64 {
    let deviation = (actual - ideal).abs();
    if !deviation.is_finite() {
        return 0.0;
    }
    if tolerance <= 0.0 || !tolerance.is_finite() {
        return if deviation == 0.0 { 100.0 } else { 0.0 };
    }
    if deviation <= tolerance {
        return 100.0;
    }

    let limit = 3.0 * tolerance;
    if deviation >= limit {
        return 0.0;
    }
    100.0 * (limit - deviation) / (limit - tolerance)
}

pub fn speed_score(speeds: &[f64], min_speed: f64, max_speed: f64) -> f64 {
    if speeds.is_empty() {
        return NEUTRAL_SPEED_SCORE;
    }

    let mean = speeds.iter().sum::<f64>() / speeds.len() as f64;
    if !mean.is_finite() || mean <= 0.0 {
        return NEUTRAL_SPEED_SCORE;
    }

    let base = if mean < min_speed {
        100.0 * mean / min_speed
    } else if mean > max_speed {
        100.0 * max_speed / mean
    } else {
        100.0
    };

    let variance = speeds.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / speeds.len() as f64;
    let consistency = (1.0 - variance.sqrt() / mean).max(0.0);

    (base * consistency).clamp(0.0, 100.0)
}

pub fn penalty_for(issue: FormIssue, penalties: &IssuePenalties) -> f64 {
    match issue {
        FormIssue::IncompleteRangeOfMotion => penalties.incomplete_range_of_motion,
        FormIssue::ExcessiveSwing => penalties.excessive_swing,
        FormIssue::MovementTooFast => penalties.movement_too_fast,
        FormIssue::MovementTooSlow => penalties.movement_too_slow,
    }
}

pub fn form_score(issues: &[FormIssue], penalties: &IssuePenalties) -> f64 {
    let deducted: f64 = issues.iter().map(|i| penalty_for(*i, penalties).max(0.0)).sum();
    (100.0 - deducted).clamp(0.0, 100.0)
}

pub fn score_rep(metrics: &RepMetrics, settings: &TrackerSettings) -> ScoreBreakdown {
    let start = position_score(
        metrics.start_angle,
        settings.ideal_start_angle,
        settings.start_tolerance,
    );
    let peak = position_score(
        metrics.peak_angle,
        settings.ideal_peak_angle,
        settings.peak_tolerance,
    );
    let speed = speed_score(&metrics.speeds, settings.min_speed, settings.max_speed);
    let form = form_score(&metrics.issues, &settings.penalties);
    let hold_bonus = if metrics.hold_satisfied { HOLD_BONUS } else { 0.0 };

    let mut total = START_WEIGHT * start
        + PEAK_WEIGHT * peak
        + SPEED_WEIGHT * speed
        + FORM_WEIGHT * form
        + hold_bonus;

    let range = metrics.range_of_motion();
    let range_factor = if settings.min_range_of_motion > 0.0 && range < settings.min_range_of_motion {
        (range / settings.min_range_of_motion).clamp(0.0, 1.0)
    } else {
        1.0
    };
    total *= range_factor;

    ScoreBreakdown {
        start,
        peak,
        speed,
        form,
        hold_bonus,
        range_factor,
        total: if total.is_finite() { total.clamp(0.0, 100.0) } else { 0.0 },
    }
}

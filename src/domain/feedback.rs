// Feedback messages shown between reps
use crate::domain::rep::CompletedRep;
use crate::domain::settings::TrackerSettings;

pub const READY: &str = "Ready to start";

/// How a movement cycle ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleVerdict<'a> {
    Completed(&'a CompletedRep),
    /// Returned to start before the minimum rep duration
    TooQuick { duration: f64 },
    /// Reached the peak band but left it before the hold qualified
    HoldTooShort { held: f64 },
    /// Returned to start without ever reaching the peak band
    Shallow { peak_angle: f64 },
}

pub fn describe(verdict: CycleVerdict<'_>, settings: &TrackerSettings) -> String {
    match verdict {
        CycleVerdict::Completed(rep) => describe_rep(rep, settings),
        CycleVerdict::TooQuick { duration } => format!(
            "Too fast: {:.1}s, take at least {:.1}s per rep",
            duration, settings.min_rep_duration
        ),
        CycleVerdict::HoldTooShort { held } => format!(
            "Hold at the top for {:.1}s ({:.1}s held)",
            settings.rep_hold_time, held
        ),
        CycleVerdict::Shallow { peak_angle } => format!(
            "Not deep enough: {:.1}°, target: {:.0}°",
            peak_angle, settings.ideal_peak_angle
        ),
    }
}

fn describe_rep(rep: &CompletedRep, settings: &TrackerSettings) -> String {
    let deviation = rep.peak_angle - settings.ideal_peak_angle;

    if deviation > settings.peak_tolerance {
        return format!(
            "Not deep enough: {:.1}° ({:.0}%), target: {:.0}°",
            rep.peak_angle, rep.score, settings.ideal_peak_angle
        );
    }
    if deviation < -settings.peak_tolerance {
        return format!(
            "Curled too far: {:.1}° ({:.0}%), target: {:.0}°",
            rep.peak_angle, rep.score, settings.ideal_peak_angle
        );
    }
    if rep.score >= 90.0 {
        return format!("Perfect form! ({:.0}%)", rep.score);
    }

    match rep.issues.first() {
        Some(issue) => format!("Good rep, watch the {} ({:.0}%)", issue, rep.score),
        None => format!("Good rep! ({:.0}%)", rep.score),
    }
}

pub fn set_complete(set_number: u32, average_score: f64) -> String {
    format!(
        "Set {} complete! Take a rest ({:.0}% average)",
        set_number, average_score
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rep::FormIssue;

    fn rep(peak_angle: f64, score: f64, issues: Vec<FormIssue>) -> CompletedRep {
        CompletedRep {
            sequence: 1,
            score,
            issues,
            duration: 3.0,
            start_angle: 160.0,
            peak_angle,
        }
    }

    #[test]
    fn test_rep_messages() {
        let settings = TrackerSettings::default();

        let perfect = rep(90.0, 97.2, vec![]);
        assert_eq!(
            describe(CycleVerdict::Completed(&perfect), &settings),
            "Perfect form! (97%)"
        );

        let shallow = rep(102.3, 68.0, vec![]);
        assert_eq!(
            describe(CycleVerdict::Completed(&shallow), &settings),
            "Not deep enough: 102.3° (68%), target: 90°"
        );

        let rushed = rep(91.0, 84.0, vec![FormIssue::MovementTooFast]);
        assert_eq!(
            describe(CycleVerdict::Completed(&rushed), &settings),
            "Good rep, watch the movement too fast (84%)"
        );
    }

    #[test]
    fn test_rejected_cycle_messages() {
        let settings = TrackerSettings::default();
        assert_eq!(
            describe(CycleVerdict::TooQuick { duration: 0.8 }, &settings),
            "Too fast: 0.8s, take at least 1.5s per rep"
        );
        assert_eq!(
            describe(CycleVerdict::HoldTooShort { held: 0.4 }, &settings),
            "Hold at the top for 1.0s (0.4s held)"
        );
    }
}

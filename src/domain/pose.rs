// Pose adapter - Turns shoulder/elbow/wrist keypoints into elbow-angle samples
use serde::Deserialize;

use crate::domain::rep::AngleSample;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Joint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    pub confidence: f64,
}

impl Joint {
    fn minus(&self, other: &Joint) -> [f64; 3] {
        [self.x - other.x, self.y - other.y, self.z - other.z]
    }
}

/// One pose-estimation frame for the tracked arm
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct KeypointFrame {
    pub timestamp: f64,
    pub shoulder: Joint,
    pub elbow: Joint,
    pub wrist: Joint,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PoseSettings {
    /// Every joint must reach this detection confidence
    pub min_joint_confidence: f64,
}

impl Default for PoseSettings {
    fn default() -> Self {
        Self {
            min_joint_confidence: 0.5,
        }
    }
}

/// Angle at the elbow between upper arm and forearm, in degrees
pub fn elbow_angle(shoulder: &Joint, elbow: &Joint, wrist: &Joint) -> Option<f64> {
    let upper_arm = shoulder.minus(elbow);
    let forearm = wrist.minus(elbow);

    let dot: f64 = upper_arm.iter().zip(forearm.iter()).map(|(a, b)| a * b).sum();
    let norm = |v: &[f64; 3]| v.iter().map(|c| c * c).sum::<f64>().sqrt();
    let lengths = norm(&upper_arm) * norm(&forearm);

    if !lengths.is_finite() || lengths <= f64::EPSILON {
        return None;
    }
    Some((dot / lengths).clamp(-1.0, 1.0).acos().to_degrees())
}

impl KeypointFrame {
    /// None when a joint is too uncertain or the limb is degenerate
    pub fn to_sample(&self, settings: &PoseSettings) -> Option<AngleSample> {
        let confident = [&self.shoulder, &self.elbow, &self.wrist]
            .iter()
            .all(|j| j.confidence >= settings.min_joint_confidence);
        if !confident {
            return None;
        }

        elbow_angle(&self.shoulder, &self.elbow, &self.wrist)
            .map(|angle| AngleSample::new(angle, self.timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joint(x: f64, y: f64) -> Joint {
        Joint {
            x,
            y,
            z: 0.0,
            confidence: 0.9,
        }
    }

    #[test]
    fn test_elbow_angle() {
        let shoulder = joint(0.0, 1.0);
        let elbow = joint(0.0, 0.0);

        let straight = elbow_angle(&shoulder, &elbow, &joint(0.0, -1.0)).unwrap();
        assert!((straight - 180.0).abs() < 1e-9);

        let right = elbow_angle(&shoulder, &elbow, &joint(1.0, 0.0)).unwrap();
        assert!((right - 90.0).abs() < 1e-9);

        assert_eq!(elbow_angle(&shoulder, &elbow, &elbow), None);
    }

    #[test]
    fn test_low_confidence_frame_is_dropped() {
        let settings = PoseSettings::default();
        let mut frame = KeypointFrame {
            timestamp: 2.5,
            shoulder: joint(0.0, 1.0),
            elbow: joint(0.0, 0.0),
            wrist: joint(1.0, 0.0),
        };

        let sample = frame.to_sample(&settings).unwrap();
        assert!((sample.angle_degrees - 90.0).abs() < 1e-9);
        assert_eq!(sample.timestamp, 2.5);

        frame.wrist.confidence = 0.3;
        assert_eq!(frame.to_sample(&settings), None);
    }
}

// User profile domain model - Body data kept next to the workout history
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("height {feet}ft {inches}in is not valid")]
    InvalidHeight { feet: u32, inches: u32 },
    #[error("{field} must be a positive weight, got {value}")]
    InvalidWeight { field: &'static str, value: f64 },
    #[error("birthday {0} lies in the future")]
    BirthdayInFuture(NaiveDate),
}

/// Stored document, keyed by `UserId`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_feet: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_inches: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
}

/// Fields to overwrite; absent or blank fields keep their stored value
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub height_feet: Option<u32>,
    pub height_inches: Option<u32>,
    pub current_weight: Option<f64>,
    pub starting_weight: Option<f64>,
    pub goal_weight: Option<f64>,
    pub sex: Option<String>,
    pub birthday: Option<NaiveDate>,
}

impl UserProfile {
    pub fn new(user_id: String) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    pub fn apply(&mut self, update: ProfileUpdate) {
        let non_blank = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(name) = non_blank(update.name) {
            self.name = Some(name);
        }
        if let Some(sex) = non_blank(update.sex) {
            self.sex = Some(sex);
        }
        self.height_feet = update.height_feet.or(self.height_feet);
        self.height_inches = update.height_inches.or(self.height_inches);
        self.current_weight = update.current_weight.or(self.current_weight);
        self.starting_weight = update.starting_weight.or(self.starting_weight);
        self.goal_weight = update.goal_weight.or(self.goal_weight);
        self.birthday = update.birthday.or(self.birthday);
    }
}

impl ProfileUpdate {
    pub fn validate(&self, today: NaiveDate) -> Result<(), ProfileError> {
        let feet = self.height_feet.unwrap_or(0);
        let inches = self.height_inches.unwrap_or(0);
        if inches >= 12 || feet > 9 {
            return Err(ProfileError::InvalidHeight { feet, inches });
        }

        let weights = [
            ("CurrentWeight", self.current_weight),
            ("StartingWeight", self.starting_weight),
            ("GoalWeight", self.goal_weight),
        ];
        for (field, weight) in weights {
            if let Some(value) = weight {
                if !value.is_finite() || value <= 0.0 {
                    return Err(ProfileError::InvalidWeight { field, value });
                }
            }
        }

        match self.birthday {
            Some(birthday) if birthday > today => Err(ProfileError::BirthdayInFuture(birthday)),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_apply_keeps_blank_and_missing_fields() {
        let mut profile = UserProfile::new("user-1".into());
        profile.name = Some("Sam".into());
        profile.current_weight = Some(180.0);

        profile.apply(ProfileUpdate {
            name: Some("  ".into()),
            current_weight: Some(176.5),
            goal_weight: Some(170.0),
            ..ProfileUpdate::default()
        });

        assert_eq!(profile.name.as_deref(), Some("Sam"));
        assert_eq!(profile.current_weight, Some(176.5));
        assert_eq!(profile.goal_weight, Some(170.0));
        assert_eq!(profile.starting_weight, None);
    }

    #[test]
    fn test_validate() {
        let ok = ProfileUpdate {
            height_feet: Some(5),
            height_inches: Some(11),
            birthday: NaiveDate::from_ymd_opt(1990, 2, 14),
            ..ProfileUpdate::default()
        };
        assert_eq!(ok.validate(today()), Ok(()));

        let tall = ProfileUpdate {
            height_inches: Some(12),
            ..ProfileUpdate::default()
        };
        assert!(matches!(
            tall.validate(today()),
            Err(ProfileError::InvalidHeight { .. })
        ));

        let weightless = ProfileUpdate {
            goal_weight: Some(0.0),
            ..ProfileUpdate::default()
        };
        assert_eq!(
            weightless.validate(today()),
            Err(ProfileError::InvalidWeight {
                field: "GoalWeight",
                value: 0.0
            })
        );

        let unborn = ProfileUpdate {
            birthday: NaiveDate::from_ymd_opt(2030, 1, 1),
            ..ProfileUpdate::default()
        };
        assert!(unborn.validate(today()).is_err());
    }

    #[test]
    fn test_document_field_names() {
        let mut profile = UserProfile::new("user-1".into());
        profile.height_feet = Some(6);
        profile.birthday = NaiveDate::from_ymd_opt(1990, 2, 14);

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["UserId"], "user-1");
        assert_eq!(json["HeightFeet"], 6);
        assert_eq!(json["Birthday"], "1990-02-14");
        assert!(json.get("Name").is_none());

        let parsed: UserProfile = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, profile);
    }
}

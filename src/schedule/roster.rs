use serde::{Deserialize, Serialize};

use super::interval::TimeInterval;

/// A therapist whose day is laid out as one grid column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub display_name: String,
    pub practice_affiliation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkShift {
    pub resource_id: String,
    pub interval: TimeInterval,
    pub practice_id: String,
    pub practice_color: String,
}

impl Resource {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            practice_affiliation: None,
        }
    }

    pub fn with_practice(mut self, practice_id: impl Into<String>) -> Self {
        self.practice_affiliation = Some(practice_id.into());
        self
    }
}

impl WorkShift {
    pub fn belongs_to(&self, resource: &Resource) -> bool {
        self.resource_id == resource.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn resource_can_be_created_without_practice() {
        let resource = Resource::new("t1", "Dana Weiss");

        assert_eq!(resource.display_name, "Dana Weiss");
        assert_eq!(resource.practice_affiliation, None);
    }

    #[test]
    fn resource_can_be_affiliated_with_practice() {
        let resource = Resource::new("t1", "Dana Weiss").with_practice("north");

        assert_eq!(resource.practice_affiliation, Some("north".to_string()));
    }

    #[test]
    fn shift_belongs_to_matching_resource_only() {
        let shift = WorkShift {
            resource_id: "t1".to_string(),
            interval: TimeInterval::new(
                Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap(),
            ),
            practice_id: "north".to_string(),
            practice_color: "#33b679".to_string(),
        };

        assert!(shift.belongs_to(&Resource::new("t1", "Dana Weiss")));
        assert!(!shift.belongs_to(&Resource::new("t2", "Ilan Cohen")));
    }
}

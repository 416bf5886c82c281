use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EntityId;

/// Links a user to the completion of one lesson, problem or project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub id: EntityId,
    pub user_id: EntityId,
    pub stage_id: EntityId,
    pub lesson_id: Option<EntityId>,
    pub problem_id: Option<EntityId>,
    pub project_id: Option<EntityId>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserProgress {
    pub user_id: EntityId,
    pub stage_id: EntityId,
    #[serde(default)]
    pub lesson_id: Option<EntityId>,
    #[serde(default)]
    pub problem_id: Option<EntityId>,
    #[serde(default)]
    pub project_id: Option<EntityId>,
    #[serde(default)]
    pub is_completed: Option<bool>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl NewUserProgress {
    pub fn into_record(self, id: EntityId) -> UserProgress {
        UserProgress {
            id,
            user_id: self.user_id,
            stage_id: self.stage_id,
            lesson_id: self.lesson_id,
            problem_id: self.problem_id,
            project_id: self.project_id,
            is_completed: self.is_completed.unwrap_or(false),
            completed_at: self.completed_at,
        }
    }
}

/// The item a progress record points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressTarget {
    Lesson(EntityId),
    Problem(EntityId),
    Project(EntityId),
}

impl ProgressTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            ProgressTarget::Lesson(_) => "lesson",
            ProgressTarget::Problem(_) => "problem",
            ProgressTarget::Project(_) => "project",
        }
    }

    /// Whether `progress` tracks this item.
    pub fn matches(&self, progress: &UserProgress) -> bool {
        match *self {
            ProgressTarget::Lesson(id) => progress.lesson_id == Some(id),
            ProgressTarget::Problem(id) => progress.problem_id == Some(id),
            ProgressTarget::Project(id) => progress.project_id == Some(id),
        }
    }

    /// A completed progress entry for `user_id` stamped with `completed_at`.
    pub fn completed_by(
        self,
        user_id: EntityId,
        stage_id: EntityId,
        completed_at: DateTime<Utc>,
    ) -> NewUserProgress {
        let mut progress = NewUserProgress {
            user_id,
            stage_id,
            lesson_id: None,
            problem_id: None,
            project_id: None,
            is_completed: Some(true),
            completed_at: Some(completed_at),
        };
        match self {
            ProgressTarget::Lesson(id) => progress.lesson_id = Some(id),
            ProgressTarget::Problem(id) => progress.problem_id = Some(id),
            ProgressTarget::Project(id) => progress.project_id = Some(id),
        }
        progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_by_sets_only_matching_target() {
        let now = Utc::now();
        let progress = ProgressTarget::Problem(2)
            .completed_by(100, 2, now)
            .into_record(101);

        assert_eq!(progress.problem_id, Some(2));
        assert_eq!(progress.lesson_id, None);
        assert_eq!(progress.project_id, None);
        assert!(progress.is_completed);
        assert_eq!(progress.completed_at, Some(now));
    }

    #[test]
    fn test_progress_defaults() {
        let progress = NewUserProgress {
            user_id: 1,
            stage_id: 2,
            lesson_id: Some(3),
            problem_id: None,
            project_id: None,
            is_completed: None,
            completed_at: None,
        }
        .into_record(9);

        assert!(!progress.is_completed);
        assert!(progress.completed_at.is_none());
    }

    #[test]
    fn test_matches_only_same_kind_and_id() {
        let progress = ProgressTarget::Lesson(3)
            .completed_by(100, 2, Utc::now())
            .into_record(101);

        assert!(ProgressTarget::Lesson(3).matches(&progress));
        assert!(!ProgressTarget::Lesson(4).matches(&progress));
        assert!(!ProgressTarget::Problem(3).matches(&progress));
        assert!(!ProgressTarget::Project(3).matches(&progress));
    }
}

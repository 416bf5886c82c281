use serde::{Deserialize, Serialize};

use super::EntityId;

/// Records that belong to a learning stage.
pub trait StageScoped {
    fn stage_id(&self) -> EntityId;
}

macro_rules! stage_scoped {
    ($($ty:ty),+) => {
        $(impl StageScoped for $ty {
            fn stage_id(&self) -> EntityId {
                self.stage_id
            }
        })+
    };
}

stage_scoped!(Lesson, Problem, Project, Resource);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LearningStage {
    pub id: EntityId,
    pub name: String,
    pub level: i32,
    pub description: String,
    pub is_unlocked: bool,
    pub total_lessons: i32,
    /// Set explicitly; not derived from lesson completion.
    pub completed_lessons: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLearningStage {
    pub name: String,
    pub level: i32,
    pub description: String,
    #[serde(default)]
    pub is_unlocked: Option<bool>,
    #[serde(default)]
    pub total_lessons: Option<i32>,
    #[serde(default)]
    pub completed_lessons: Option<i32>,
}

impl NewLearningStage {
    pub fn into_record(self, id: EntityId) -> LearningStage {
        LearningStage {
            id,
            name: self.name,
            level: self.level,
            description: self.description,
            is_unlocked: self.is_unlocked.unwrap_or(false),
            total_lessons: self.total_lessons.unwrap_or(0),
            completed_lessons: self.completed_lessons.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: EntityId,
    pub stage_id: EntityId,
    pub title: String,
    pub description: String,
    pub content: String,
    /// Minutes
    pub duration: i32,
    pub is_completed: bool,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLesson {
    pub stage_id: EntityId,
    pub title: String,
    pub description: String,
    pub content: String,
    pub duration: i32,
    #[serde(default)]
    pub is_completed: Option<bool>,
    pub order: i32,
}

impl NewLesson {
    pub fn into_record(self, id: EntityId) -> Lesson {
        Lesson {
            id,
            stage_id: self.stage_id,
            title: self.title,
            description: self.description,
            content: self.content,
            duration: self.duration,
            is_completed: self.is_completed.unwrap_or(false),
            order: self.order,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProblemDifficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub id: EntityId,
    pub stage_id: EntityId,
    pub title: String,
    pub description: String,
    pub difficulty: ProblemDifficulty,
    pub tags: Vec<String>,
    /// Where the problem is hosted, e.g. LeetCode or HackerRank.
    pub source: String,
    pub source_url: Option<String>,
    pub is_completed: bool,
    pub solution: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProblem {
    pub stage_id: EntityId,
    pub title: String,
    pub description: String,
    pub difficulty: ProblemDifficulty,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    pub source: String,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub is_completed: Option<bool>,
    #[serde(default)]
    pub solution: Option<String>,
}

impl NewProblem {
    pub fn into_record(self, id: EntityId) -> Problem {
        Problem {
            id,
            stage_id: self.stage_id,
            title: self.title,
            description: self.description,
            difficulty: self.difficulty,
            tags: self.tags.unwrap_or_default(),
            source: self.source,
            source_url: self.source_url,
            is_completed: self.is_completed.unwrap_or(false),
            solution: self.solution,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProjectDifficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: EntityId,
    pub stage_id: EntityId,
    pub title: String,
    pub description: String,
    pub difficulty: ProjectDifficulty,
    /// Hours
    pub estimated_time: i32,
    pub skills: Vec<String>,
    pub is_completed: bool,
    pub github_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub stage_id: EntityId,
    pub title: String,
    pub description: String,
    pub difficulty: ProjectDifficulty,
    pub estimated_time: i32,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub is_completed: Option<bool>,
    #[serde(default)]
    pub github_url: Option<String>,
}

impl NewProject {
    pub fn into_record(self, id: EntityId) -> Project {
        Project {
            id,
            stage_id: self.stage_id,
            title: self.title,
            description: self.description,
            difficulty: self.difficulty,
            estimated_time: self.estimated_time,
            skills: self.skills.unwrap_or_default(),
            is_completed: self.is_completed.unwrap_or(false),
            github_url: self.github_url,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Video,
    Article,
    Documentation,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: EntityId,
    pub stage_id: EntityId,
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub is_free: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResource {
    pub stage_id: EntityId,
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    #[serde(default)]
    pub is_free: Option<bool>,
}

impl NewResource {
    pub fn into_record(self, id: EntityId) -> Resource {
        Resource {
            id,
            stage_id: self.stage_id,
            title: self.title,
            description: self.description,
            url: self.url,
            kind: self.kind,
            // Resources are free unless stated otherwise
            is_free: self.is_free.unwrap_or(true),
        }
    }
}

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::models::{
    EntityId, LearningStage, Lesson, NewLearningStage, NewLesson, NewProblem, NewProject,
    NewResource, NewUser, NewUserProgress, Problem, Project, ProgressTarget, Resource,
    StageScoped, User, UserProgress, DEFAULT_EMAIL_DOMAIN,
};
use crate::services::ids::IdGenerator;

/// Ids below this are reserved for fixture records.
pub const FIRST_DYNAMIC_ID: EntityId = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: EntityId },
    #[error("{entity} with {field} '{value}' already exists")]
    Conflict {
        entity: &'static str,
        field: &'static str,
        value: String,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Records loaded verbatim, ids included.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Fixtures {
    pub users: Vec<User>,
    pub stages: Vec<LearningStage>,
    pub lessons: Vec<Lesson>,
    pub problems: Vec<Problem>,
    pub projects: Vec<Project>,
    pub progress: Vec<UserProgress>,
    pub resources: Vec<Resource>,
}

// Keyed by id; ids only grow, so iteration order is insertion order.
#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<EntityId, User>,
    stages: BTreeMap<EntityId, LearningStage>,
    lessons: BTreeMap<EntityId, Lesson>,
    problems: BTreeMap<EntityId, Problem>,
    projects: BTreeMap<EntityId, Project>,
    progress: BTreeMap<EntityId, UserProgress>,
    resources: BTreeMap<EntityId, Resource>,
}

/// In-memory store behind the REST API. Reads hand out clones; writes
/// mutate the stored record and return a clone of the result.
pub struct MemStorage {
    ids: Arc<dyn IdGenerator>,
    tables: RwLock<Tables>,
}

impl MemStorage {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            ids,
            tables: RwLock::new(Tables::default()),
        }
    }

    // Records are plain data, a panic elsewhere cannot leave them half-built.
    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts fixture records with their own ids and moves the shared
    /// sequence past them (and never below `FIRST_DYNAMIC_ID`).
    ///
    /// The batch is rejected as a whole when a record reuses an id already
    /// present in its table, or a user repeats a username or email.
    pub fn load_fixtures(&self, fixtures: Fixtures) -> StoreResult<()> {
        let mut tables = self.write();

        macro_rules! check_ids {
            ($records:expr, $table:ident, $entity:literal) => {
                let mut seen = BTreeSet::new();
                for record in &$records {
                    if tables.$table.contains_key(&record.id) || !seen.insert(record.id) {
                        return Err(StoreError::Conflict {
                            entity: $entity,
                            field: "id",
                            value: record.id.to_string(),
                        });
                    }
                }
            };
        }

        check_ids!(fixtures.users, users, "User");
        check_ids!(fixtures.stages, stages, "Stage");
        check_ids!(fixtures.lessons, lessons, "Lesson");
        check_ids!(fixtures.problems, problems, "Problem");
        check_ids!(fixtures.projects, projects, "Project");
        check_ids!(fixtures.progress, progress, "UserProgress");
        check_ids!(fixtures.resources, resources, "Resource");
        check_unique_users(&tables.users, &fixtures.users)?;

        let mut max_id: EntityId = 0;

        macro_rules! load {
            ($records:expr, $table:ident) => {
                for record in $records {
                    max_id = max_id.max(record.id);
                    tables.$table.insert(record.id, record);
                }
            };
        }

        load!(fixtures.users, users);
        load!(fixtures.stages, stages);
        load!(fixtures.lessons, lessons);
        load!(fixtures.problems, problems);
        load!(fixtures.projects, projects);
        load!(fixtures.progress, progress);
        load!(fixtures.resources, resources);

        self.ids
            .reserve_below(FIRST_DYNAMIC_ID.max(max_id.saturating_add(1)));
        tracing::debug!("Loaded fixtures, highest id {}", max_id);
        Ok(())
    }

    // User operations

    pub fn get_user(&self, id: EntityId) -> Option<User> {
        self.read().users.get(&id).cloned()
    }

    pub fn get_user_by_email(&self, email: &str) -> Option<User> {
        self.read()
            .users
            .values()
            .find(|user| user.email == email)
            .cloned()
    }

    pub fn get_user_by_username(&self, username: &str) -> Option<User> {
        self.read()
            .users
            .values()
            .find(|user| user.username == username)
            .cloned()
    }

    pub fn create_user(&self, input: NewUser) -> StoreResult<User> {
        let mut tables = self.write();
        self.insert_user(&mut tables, input)
    }

    /// Login lookup: returns the user named `username`, creating it on first
    /// sight. The flag is `true` when a new user was created.
    ///
    /// When the derived `{username}@pylearn.com` already belongs to someone
    /// else, the new account gets `{username}+N@pylearn.com` instead.
    pub fn find_or_create_user(&self, username: &str) -> StoreResult<(User, bool)> {
        let mut tables = self.write();
        if let Some(user) = tables.users.values().find(|u| u.username == username) {
            return Ok((user.clone(), false));
        }

        let mut input = NewUser::from_username(username);
        let mut suffix = 2;
        while tables.users.values().any(|u| u.email == input.email) {
            input.email = alternate_email(username, suffix);
            suffix += 1;
        }
        let user = self.insert_user(&mut tables, input)?;
        Ok((user, true))
    }

    fn insert_user(&self, tables: &mut Tables, input: NewUser) -> StoreResult<User> {
        for existing in tables.users.values() {
            if existing.username == input.username {
                return Err(StoreError::Conflict {
                    entity: "User",
                    field: "username",
                    value: input.username,
                });
            }
            if existing.email == input.email {
                return Err(StoreError::Conflict {
                    entity: "User",
                    field: "email",
                    value: input.email,
                });
            }
        }

        let user = User {
            id: self.ids.next_id(),
            username: input.username,
            name: input.name,
            email: input.email,
            points: 0,
        };
        tables.users.insert(user.id, user.clone());
        tracing::info!("Created user {} ({})", user.id, user.username);
        Ok(user)
    }

    pub fn update_user_points(&self, user_id: EntityId, points: i64) -> StoreResult<User> {
        update_in(&mut self.write().users, "User", user_id, |user| {
            user.points = points
        })
    }

    // Learning stage operations

    /// All stages, ascending by level.
    pub fn get_all_stages(&self) -> Vec<LearningStage> {
        let mut stages: Vec<_> = self.read().stages.values().cloned().collect();
        stages.sort_by_key(|stage| stage.level);
        stages
    }

    pub fn get_stage(&self, id: EntityId) -> Option<LearningStage> {
        self.read().stages.get(&id).cloned()
    }

    pub fn create_stage(&self, input: NewLearningStage) -> LearningStage {
        let stage = input.into_record(self.ids.next_id());
        self.write().stages.insert(stage.id, stage.clone());
        stage
    }

    pub fn update_stage_progress(
        &self,
        stage_id: EntityId,
        completed_lessons: i32,
    ) -> StoreResult<LearningStage> {
        update_in(&mut self.write().stages, "Stage", stage_id, |stage| {
            stage.completed_lessons = completed_lessons
        })
    }

    // Lesson operations

    /// Lessons of a stage, ascending by their `order` field.
    pub fn get_lessons_by_stage(&self, stage_id: EntityId) -> Vec<Lesson> {
        let mut lessons = by_stage(&self.read().lessons, stage_id);
        lessons.sort_by_key(|lesson| lesson.order);
        lessons
    }

    pub fn get_lesson(&self, id: EntityId) -> Option<Lesson> {
        self.read().lessons.get(&id).cloned()
    }

    pub fn create_lesson(&self, input: NewLesson) -> Lesson {
        let lesson = input.into_record(self.ids.next_id());
        self.write().lessons.insert(lesson.id, lesson.clone());
        lesson
    }

    pub fn update_lesson_completion(
        &self,
        lesson_id: EntityId,
        is_completed: bool,
    ) -> StoreResult<Lesson> {
        update_in(&mut self.write().lessons, "Lesson", lesson_id, |lesson| {
            lesson.is_completed = is_completed
        })
    }

    // Problem operations

    pub fn get_problems_by_stage(&self, stage_id: EntityId) -> Vec<Problem> {
        by_stage(&self.read().problems, stage_id)
    }

    pub fn get_problem(&self, id: EntityId) -> Option<Problem> {
        self.read().problems.get(&id).cloned()
    }

    pub fn create_problem(&self, input: NewProblem) -> Problem {
        let problem = input.into_record(self.ids.next_id());
        self.write().problems.insert(problem.id, problem.clone());
        problem
    }

    pub fn update_problem_completion(
        &self,
        problem_id: EntityId,
        is_completed: bool,
    ) -> StoreResult<Problem> {
        update_in(&mut self.write().problems, "Problem", problem_id, |problem| {
            problem.is_completed = is_completed
        })
    }

    // Project operations

    pub fn get_projects_by_stage(&self, stage_id: EntityId) -> Vec<Project> {
        by_stage(&self.read().projects, stage_id)
    }

    pub fn get_project(&self, id: EntityId) -> Option<Project> {
        self.read().projects.get(&id).cloned()
    }

    pub fn create_project(&self, input: NewProject) -> Project {
        let project = input.into_record(self.ids.next_id());
        self.write().projects.insert(project.id, project.clone());
        project
    }

    pub fn update_project_completion(
        &self,
        project_id: EntityId,
        is_completed: bool,
    ) -> StoreResult<Project> {
        update_in(&mut self.write().projects, "Project", project_id, |project| {
            project.is_completed = is_completed
        })
    }

    // User progress operations

    pub fn get_user_progress(&self, user_id: EntityId) -> Vec<UserProgress> {
        self.read()
            .progress
            .values()
            .filter(|progress| progress.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn create_user_progress(&self, input: NewUserProgress) -> UserProgress {
        let progress = input.into_record(self.ids.next_id());
        self.write().progress.insert(progress.id, progress.clone());
        progress
    }

    /// Keeps one progress row per user and item. An existing row takes the
    /// new flag, with `completedAt` set to `at` or cleared. A missing row is
    /// only created for a completion; un-completing an untracked item
    /// returns `None`.
    pub fn set_user_progress(
        &self,
        user_id: EntityId,
        stage_id: EntityId,
        target: ProgressTarget,
        is_completed: bool,
        at: DateTime<Utc>,
    ) -> Option<UserProgress> {
        let mut tables = self.write();
        if let Some(existing) = tables
            .progress
            .values_mut()
            .find(|progress| progress.user_id == user_id && target.matches(progress))
        {
            existing.is_completed = is_completed;
            existing.completed_at = is_completed.then_some(at);
            return Some(existing.clone());
        }

        if !is_completed {
            return None;
        }
        let progress = target
            .completed_by(user_id, stage_id, at)
            .into_record(self.ids.next_id());
        tables.progress.insert(progress.id, progress.clone());
        Some(progress)
    }

    // Resource operations

    pub fn get_resources_by_stage(&self, stage_id: EntityId) -> Vec<Resource> {
        by_stage(&self.read().resources, stage_id)
    }

    pub fn create_resource(&self, input: NewResource) -> Resource {
        let resource = input.into_record(self.ids.next_id());
        self.write().resources.insert(resource.id, resource.clone());
        resource
    }
}

fn by_stage<T: StageScoped + Clone>(table: &BTreeMap<EntityId, T>, stage_id: EntityId) -> Vec<T> {
    table
        .values()
        .filter(|record| record.stage_id() == stage_id)
        .cloned()
        .collect()
}

fn check_unique_users(existing: &BTreeMap<EntityId, User>, incoming: &[User]) -> StoreResult<()> {
    let mut usernames: BTreeSet<&str> = existing.values().map(|u| u.username.as_str()).collect();
    let mut emails: BTreeSet<&str> = existing.values().map(|u| u.email.as_str()).collect();

    for user in incoming {
        if !usernames.insert(user.username.as_str()) {
            return Err(StoreError::Conflict {
                entity: "User",
                field: "username",
                value: user.username.clone(),
            });
        }
        if !emails.insert(user.email.as_str()) {
            return Err(StoreError::Conflict {
                entity: "User",
                field: "email",
                value: user.email.clone(),
            });
        }
    }
    Ok(())
}

fn alternate_email(username: &str, suffix: u32) -> String {
    format!("{}+{}@{}", username, suffix, DEFAULT_EMAIL_DOMAIN)
}

fn update_in<T: Clone>(
    table: &mut BTreeMap<EntityId, T>,
    entity: &'static str,
    id: EntityId,
    apply: impl FnOnce(&mut T),
) -> StoreResult<T> {
    let record = table
        .get_mut(&id)
        .ok_or(StoreError::NotFound { entity, id })?;
    apply(record);
    Ok(record.clone())
}

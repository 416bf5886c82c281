use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs;

use crate::config::Config;
use crate::models::{
    LearningStage, Lesson, Problem, ProblemDifficulty, Project, ProjectDifficulty, User,
};
use crate::services::storage::{Fixtures, MemStorage};

/// Loads the demo curriculum and, when configured, a JSON fixtures file.
pub async fn bootstrap(config: &Config, storage: &MemStorage) -> Result<()> {
    if config.seed.sample_data {
        storage
            .load_fixtures(sample_fixtures())
            .context("Failed to load sample data")?;
        tracing::info!("Sample curriculum loaded");
    } else {
        tracing::debug!("Sample data disabled, starting with an empty store");
    }

    let path = match &config.seed.fixtures_file {
        Some(path) if !path.is_empty() => Path::new(path),
        _ => return Ok(()),
    };

    if !path.exists() {
        tracing::warn!("Fixtures file {} not found, skipping", path.display());
        return Ok(());
    }

    let contents = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read fixtures file {}", path.display()))?;
    let fixtures: Fixtures =
        serde_json::from_str(&contents).context("Failed to deserialize fixtures file")?;

    tracing::info!(
        "Loading fixtures from {}: {} stages, {} lessons, {} problems, {} projects, {} resources",
        path.display(),
        fixtures.stages.len(),
        fixtures.lessons.len(),
        fixtures.problems.len(),
        fixtures.projects.len(),
        fixtures.resources.len()
    );
    storage
        .load_fixtures(fixtures)
        .with_context(|| format!("Rejected fixtures file {}", path.display()))?;

    Ok(())
}

/// Demo user plus the Beginner/Intermediate/Advanced track, with lessons,
/// problems and projects for the Intermediate stage.
pub fn sample_fixtures() -> Fixtures {
    let users = vec![User {
        id: 1,
        username: "johndoe".to_string(),
        name: "John Doe".to_string(),
        email: "john@example.com".to_string(),
        points: 1250,
    }];

    let stages = vec![
        stage(1, "Beginner", 1, "Python basics, syntax, and fundamental concepts", true, 8, 8),
        stage(
            2,
            "Intermediate",
            2,
            "Object-oriented programming, data structures, and algorithms",
            true,
            12,
            8,
        ),
        stage(
            3,
            "Advanced",
            3,
            "Advanced topics, frameworks, and professional development",
            false,
            15,
            0,
        ),
    ];

    let lessons = vec![
        Lesson {
            id: 1,
            stage_id: 2,
            title: "Classes and Objects Fundamentals".to_string(),
            description: "Learn how to create classes, instantiate objects, and understand the relationship between them.".to_string(),
            content: "Comprehensive guide to classes and objects in Python...".to_string(),
            duration: 25,
            is_completed: true,
            order: 1,
        },
        Lesson {
            id: 2,
            stage_id: 2,
            title: "Methods and Attributes".to_string(),
            description: "Understand instance methods, class methods, static methods, and different types of attributes.".to_string(),
            content: "Deep dive into Python methods and attributes...".to_string(),
            duration: 30,
            is_completed: false,
            order: 2,
        },
        Lesson {
            id: 3,
            stage_id: 2,
            title: "Inheritance and Polymorphism".to_string(),
            description: "Explore inheritance relationships, method overriding, and polymorphic behavior in Python.".to_string(),
            content: "Complete guide to inheritance and polymorphism...".to_string(),
            duration: 35,
            is_completed: false,
            order: 3,
        },
    ];

    let problems = vec![
        leetcode(
            1,
            "Two Sum",
            "Given an array of integers nums and an integer target, return indices of the two numbers such that they add up to target.",
            ProblemDifficulty::Easy,
            &["Array", "Hash Table"],
            "https://leetcode.com/problems/two-sum/",
            true,
        ),
        leetcode(
            2,
            "Valid Parentheses",
            "Given a string s containing just the characters '(', ')', '{', '}', '[' and ']', determine if the input string is valid.",
            ProblemDifficulty::Easy,
            &["String", "Stack"],
            "https://leetcode.com/problems/valid-parentheses/",
            false,
        ),
        leetcode(
            3,
            "Longest Substring Without Repeating Characters",
            "Given a string s, find the length of the longest substring without repeating characters.",
            ProblemDifficulty::Medium,
            &["Hash Table", "Sliding Window"],
            "https://leetcode.com/problems/longest-substring-without-repeating-characters/",
            false,
        ),
    ];

    let projects = vec![
        Project {
            id: 1,
            stage_id: 2,
            title: "Object-Oriented Todo App".to_string(),
            description: "Build a todo application using classes for Task, TodoList, and User management with file persistence.".to_string(),
            difficulty: ProjectDifficulty::Beginner,
            estimated_time: 2,
            skills: strings(&["Classes", "File I/O", "Data Management"]),
            is_completed: false,
            github_url: None,
        },
        Project {
            id: 2,
            stage_id: 2,
            title: "Banking System Simulator".to_string(),
            description: "Create a banking system with Account, SavingsAccount, and CheckingAccount classes demonstrating inheritance.".to_string(),
            difficulty: ProjectDifficulty::Intermediate,
            estimated_time: 4,
            skills: strings(&["Inheritance", "Polymorphism", "Error Handling"]),
            is_completed: false,
            github_url: None,
        },
    ];

    Fixtures {
        users,
        stages,
        lessons,
        problems,
        projects,
        ..Fixtures::default()
    }
}

fn stage(
    id: i64,
    name: &str,
    level: i32,
    description: &str,
    is_unlocked: bool,
    total_lessons: i32,
    completed_lessons: i32,
) -> LearningStage {
    LearningStage {
        id,
        name: name.to_string(),
        level,
        description: description.to_string(),
        is_unlocked,
        total_lessons,
        completed_lessons,
    }
}

fn leetcode(
    id: i64,
    title: &str,
    description: &str,
    difficulty: ProblemDifficulty,
    tags: &[&str],
    url: &str,
    is_completed: bool,
) -> Problem {
    Problem {
        id,
        stage_id: 2,
        title: title.to_string(),
        description: description.to_string(),
        difficulty,
        tags: strings(tags),
        source: "LeetCode".to_string(),
        source_url: Some(url.to_string()),
        is_completed,
        solution: None,
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

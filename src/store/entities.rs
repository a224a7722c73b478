//! Entities the ranking core reads and writes

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A job seeker's profile ("candidato").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub field_of_work: Option<String>,
    #[serde(default)]
    pub current_role: Option<String>,
    /// Uploaded résumé file, if any
    #[serde(default)]
    pub resume_document: Option<PathBuf>,
    #[serde(default)]
    pub objective: Option<ProfessionalObjective>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub languages: Vec<Language>,

    // Features written by the offline pipeline only.
    #[serde(default)]
    pub resume_text_normalized: Option<String>,
    #[serde(default)]
    pub resume_embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalObjective {
    pub desired_role: String,
    #[serde(default)]
    pub work_schedule: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub institution: String,
    pub program: String,
    #[serde(default)]
    pub started_on: Option<NaiveDate>,
    #[serde(default)]
    pub finished_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub company: String,
    pub role: String,
    #[serde(default)]
    pub activities: String,
    #[serde(default)]
    pub started_on: Option<NaiveDate>,
    #[serde(default)]
    pub ended_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub institution: String,
    pub name: String,
    #[serde(default)]
    pub duration_hours: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
    #[serde(default)]
    pub level: Option<String>,
}

/// A job opening ("vaga").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub responsibilities: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
    pub employer_id: u64,

    // Features written by the offline pipeline only.
    #[serde(default)]
    pub posting_text_normalized: Option<String>,
    #[serde(default)]
    pub posting_embedding: Option<Vec<f32>>,
}

/// The company behind a posting. Contributes text, has no features of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employer {
    pub id: u64,
    pub trade_name: String,
    #[serde(default)]
    pub field_of_activity: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CandidateProfile {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            field_of_work: None,
            current_role: None,
            resume_document: None,
            objective: None,
            education: Vec::new(),
            experience: Vec::new(),
            courses: Vec::new(),
            languages: Vec::new(),
            resume_text_normalized: None,
            resume_embedding: None,
        }
    }
}

impl JobPosting {
    pub fn new(id: u64, employer_id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: Some(title.into()),
            responsibilities: None,
            requirements: None,
            employer_id,
            posting_text_normalized: None,
            posting_embedding: None,
        }
    }
}

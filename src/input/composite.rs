//! Composite texts built from structured entity fields

use crate::input::manager::flatten_lines;
use crate::store::entities::{CandidateProfile, Employer, JobPosting};

/// Space-join the non-empty parts, with line breaks flattened.
fn join_parts<'a>(parts: impl IntoIterator<Item = Option<&'a str>>) -> String {
    let joined = parts
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    flatten_lines(&joined)
}

/// Title, responsibilities, requirements, then the employer's field of
/// activity and description. Missing fields count as empty.
pub fn build_posting_text(posting: &JobPosting, employer: Option<&Employer>) -> String {
    join_parts([
        posting.title.as_deref(),
        posting.responsibilities.as_deref(),
        posting.requirements.as_deref(),
        employer.and_then(|e| e.field_of_activity.as_deref()),
        employer.and_then(|e| e.description.as_deref()),
    ])
}

/// Human-readable summary of a candidate's structured qualification records.
pub fn build_candidate_supplement_text(profile: &CandidateProfile) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(objective) = &profile.objective {
        parts.push(objective.desired_role.clone());
    }
    parts.extend(profile.field_of_work.iter().cloned());
    parts.extend(profile.current_role.iter().cloned());

    for education in &profile.education {
        parts.push(format!("{} - {}", education.institution, education.program));
    }
    for experience in &profile.experience {
        parts.push(format!(
            "{} - {} {}",
            experience.company, experience.role, experience.activities
        ));
    }
    for course in &profile.courses {
        parts.push(format!("{} - {}", course.institution, course.name));
    }
    for language in &profile.languages {
        match &language.level {
            Some(level) => parts.push(format!("{} {}", language.name, level)),
            None => parts.push(language.name.clone()),
        }
    }

    join_parts(parts.iter().map(|p| Some(p.as_str())))
}

/// Résumé text followed by the structured supplement.
pub fn build_candidate_text(resume_text: &str, profile: &CandidateProfile) -> String {
    let supplement = build_candidate_supplement_text(profile);
    join_parts([Some(resume_text), Some(supplement.as_str())])
}

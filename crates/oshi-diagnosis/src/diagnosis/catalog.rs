//! Static content: members, groups, and survey questions.
//!
//! Catalog files are plain JSON arrays using the camelCase field names of the
//! content team's data files. Loading validates everything the engine relies
//! on so configuration mistakes surface before a session starts.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use super::domain::{Group, GroupId, Member, Question, QuestionKind, CANDIDATE_COUNT};
use super::scoring;

pub const MEMBERS_FILE: &str = "members.json";
pub const GROUPS_FILE: &str = "groups.json";
pub const QUESTIONS_FILE: &str = "questions.json";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {file}: {source}")]
    Json {
        file: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },
    #[error("member '{member}' references unknown group '{group}'")]
    UnknownGroup { member: String, group: String },
    #[error("question '{question}' has no options")]
    EmptyQuestion { question: String },
    #[error("question '{question}' option {index}: {reason}")]
    InvalidOption {
        question: String,
        index: usize,
        reason: String,
    },
    #[error("question '{question}' allows between {min} and {max} selections out of {options}")]
    InvalidSelectionBounds {
        question: String,
        min: usize,
        max: usize,
        options: usize,
    },
    #[error("catalog holds {available} members but {required} are required")]
    TooFewMembers { required: usize, available: usize },
}

/// Fully validated static content for one deployment.
#[derive(Debug, Clone)]
pub struct Catalog {
    members: Vec<Member>,
    groups: Vec<Group>,
    questions: Vec<Question>,
}

impl Catalog {
    pub fn new(
        members: Vec<Member>,
        groups: Vec<Group>,
        questions: Vec<Question>,
    ) -> Result<Self, CatalogError> {
        let catalog = Self {
            members,
            groups,
            questions,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load `members.json`, `groups.json`, and `questions.json` from `dir`.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, CatalogError> {
        let dir = dir.as_ref();
        let members: Vec<Member> = read_json(&dir.join(MEMBERS_FILE))?;
        let groups: Vec<Group> = read_json(&dir.join(GROUPS_FILE))?;
        let questions: Vec<Question> = read_json(&dir.join(QUESTIONS_FILE))?;

        let catalog = Self::new(members, groups, questions)?;
        info!(
            dir = %dir.display(),
            members = catalog.members.len(),
            groups = catalog.groups.len(),
            questions = catalog.questions.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn from_readers<M: Read, G: Read, Q: Read>(
        members: M,
        groups: G,
        questions: Q,
    ) -> Result<Self, CatalogError> {
        Self::new(
            parse_json(members, MEMBERS_FILE)?,
            parse_json(groups, GROUPS_FILE)?,
            parse_json(questions, QUESTIONS_FILE)?,
        )
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|group| &group.id == id)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut group_ids = HashSet::new();
        for group in &self.groups {
            if !group_ids.insert(&group.id) {
                return Err(CatalogError::DuplicateId {
                    kind: "group",
                    id: group.id.to_string(),
                });
            }
        }

        let mut member_ids = HashSet::new();
        for member in &self.members {
            if !member_ids.insert(&member.id) {
                return Err(CatalogError::DuplicateId {
                    kind: "member",
                    id: member.id.to_string(),
                });
            }
            if !group_ids.contains(&member.group_id) {
                return Err(CatalogError::UnknownGroup {
                    member: member.id.to_string(),
                    group: member.group_id.to_string(),
                });
            }
            if member.scores.is_empty() {
                warn!(member = %member.id, "member has no attribute scores");
            }
        }

        if self.members.len() < CANDIDATE_COUNT {
            return Err(CatalogError::TooFewMembers {
                required: CANDIDATE_COUNT,
                available: self.members.len(),
            });
        }

        let mut question_ids = HashSet::new();
        for question in &self.questions {
            if !question_ids.insert(question.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    kind: "question",
                    id: question.id.clone(),
                });
            }
            validate_question(question)?;
        }

        Ok(())
    }
}

fn validate_question(question: &Question) -> Result<(), CatalogError> {
    if question.options.is_empty() {
        return Err(CatalogError::EmptyQuestion {
            question: question.id.clone(),
        });
    }

    let (min, max) = question.selection_bounds();
    if min == 0 || min > max || max > question.options.len() {
        return Err(CatalogError::InvalidSelectionBounds {
            question: question.id.clone(),
            min,
            max,
            options: question.options.len(),
        });
    }

    let mut option_ids = HashSet::new();
    for (index, option) in question.options.iter().enumerate() {
        let invalid = |reason: String| CatalogError::InvalidOption {
            question: question.id.clone(),
            index,
            reason,
        };

        match option.id.as_deref() {
            Some(id) if !option_ids.insert(id) => {
                return Err(invalid(format!("duplicate option id '{id}'")));
            }
            Some(_) => {}
            None => return Err(invalid("missing option id".to_string())),
        }

        if question.kind == QuestionKind::KoreanLevel {
            if option.korean_level.is_none() {
                return Err(invalid("missing koreanLevel".to_string()));
            }
        } else {
            scoring::resolve_increments(option).map_err(|err| invalid(err.to_string()))?;
        }
    }

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let file = File::open(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_json(BufReader::new(file), &name)
}

fn parse_json<T: DeserializeOwned, R: Read>(reader: R, file: &str) -> Result<T, CatalogError> {
    serde_json::from_reader(reader).map_err(|source| CatalogError::Json {
        file: file.to_string(),
        source,
    })
}

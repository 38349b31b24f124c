use crate::firestore::constants::DEFAULT_DATABASE_ID;
use crate::firestore::error::{missing_project_id, FirestoreResult};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DatabaseId {
    project_id: String,
    database: String,
}

impl DatabaseId {
    pub fn new(project_id: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database: database.into(),
        }
    }

    pub fn default(project_id: impl Into<String>) -> Self {
        Self::new(project_id, DEFAULT_DATABASE_ID)
    }

    /// Validates that the project id is usable before any request is built.
    pub fn validated(project_id: &str, database: &str) -> FirestoreResult<Self> {
        if project_id.trim().is_empty() {
            return Err(missing_project_id());
        }
        let database = if database.trim().is_empty() {
            DEFAULT_DATABASE_ID
        } else {
            database
        };
        Ok(Self::new(project_id, database))
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn with_database(&self, database: impl Into<String>) -> Self {
        Self::new(self.project_id.clone(), database)
    }

    /// `projects/{project}/databases/{database}`
    pub fn resource_name(&self) -> String {
        format!("projects/{}/databases/{}", self.project_id, self.database)
    }
}

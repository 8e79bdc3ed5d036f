use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::{
    domain::{Student, StudentId},
    error::CatalogError,
};

/// The per-session student catalog: an ordered list plus an id index.
/// Loaded once from a `CatalogSource` and read-only afterwards.
pub struct Catalog {
    students: Vec<Student>,
    by_id: HashMap<StudentId, usize>,
}

impl Catalog {
    pub fn new(students: Vec<Student>) -> Self {
        let by_id = students
            .iter()
            .enumerate()
            .map(|(index, student)| (student.id, index))
            .collect();
        Self { students, by_id }
    }

    pub fn get(&self, id: StudentId) -> Option<&Student> {
        self.by_id.get(&id).map(|&index| &self.students[index])
    }

    pub fn contains(&self, id: StudentId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn ids(&self) -> Vec<StudentId> {
        self.students.iter().map(|student| student.id).collect()
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}

#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_students(&self) -> Result<Vec<Student>, CatalogError>;
}

/// Stand-in for sessions constructed without a catalog backend.
pub struct MissingCatalogSource;

#[async_trait]
impl CatalogSource for MissingCatalogSource {
    async fn fetch_students(&self) -> Result<Vec<Student>, CatalogError> {
        Err(CatalogError::Unavailable(
            "catalog source is unavailable".into(),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct StudentRecord {
    student_id: i64,
    name: String,
    thumbnail1: String,
}

pub struct HttpCatalogSource {
    http: Client,
    base_url: String,
}

impl HttpCatalogSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_students(&self) -> Result<Vec<Student>, CatalogError> {
        let records: Vec<StudentRecord> = self
            .http
            .get(format!("{}/api/students", self.base_url))
            .send()
            .await
            .map_err(|error| CatalogError::Unavailable(error.to_string()))?
            .error_for_status()
            .map_err(|error| CatalogError::Unavailable(error.to_string()))?
            .json()
            .await
            .map_err(|error| CatalogError::Unavailable(error.to_string()))?;

        Ok(records
            .into_iter()
            .map(|record| Student {
                id: StudentId(record.student_id),
                name: record.name,
                image_url: record.thumbnail1,
            })
            .collect())
    }
}

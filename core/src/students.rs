//! Student DAO over `/api/etudiants`.
//!
//! Every operation comes as a pure `build_*`/`parse_*` pair plus an async
//! method that runs the pair through the transport. Create and update
//! responses may be bare or wrapped in `{message, etudiant}`, and may carry
//! the track as an object, as `parcours_id`, or not at all.

use crate::error::DaoError;
use crate::http::{HttpRequest, HttpResponse};
use crate::mapping;
use crate::resource::{Operation, ResourceClient};
use crate::transport::Transport;
use crate::types::Student;

pub const RESOURCE: &str = "etudiants";

const LIST: Operation = Operation::new("students.list", "Impossible de récupérer les étudiants");
const GET: Operation = Operation::new("students.get", "Impossible de récupérer l'étudiant");
const CREATE: Operation = Operation::new("students.create", "Impossible de créer l'étudiant");
const UPDATE: Operation = Operation::new("students.update", "Impossible de modifier l'étudiant");
const DELETE: Operation = Operation::new("students.delete", "Impossible de supprimer l'étudiant");

#[derive(Debug, Clone)]
pub struct StudentDao<T> {
    resource: ResourceClient<T>,
}

impl<T> StudentDao<T> {
    pub fn new(resource: ResourceClient<T>) -> Self {
        Self { resource }
    }

    pub fn build_list(&self) -> HttpRequest {
        self.resource.get(self.resource.base_url().to_string())
    }

    pub fn build_get(&self, id: i64) -> HttpRequest {
        self.resource.get(self.resource.item_url(id))
    }

    pub fn build_create(&self, student: &Student) -> Result<HttpRequest, DaoError> {
        self.resource.post(
            self.resource.base_url().to_string(),
            &student.to_payload(),
            CREATE,
        )
    }

    pub fn build_update(&self, id: i64, student: &Student) -> Result<HttpRequest, DaoError> {
        self.resource
            .put(self.resource.item_url(id), &student.to_payload(), UPDATE)
    }

    pub fn build_delete(&self, id: i64) -> HttpRequest {
        self.resource.delete(self.resource.item_url(id))
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<Vec<Student>, DaoError> {
        LIST.check(&response)?;
        mapping::decode_list(&response.body).map_err(|e| LIST.fail(e))
    }

    pub fn parse_get(&self, response: HttpResponse) -> Result<Student, DaoError> {
        GET.check(&response)?;
        mapping::decode(&response.body, None).map_err(|e| GET.fail(e))
    }

    /// `sent` is the entity the request was built from; its track survives
    /// when the response omits one.
    pub fn parse_create(&self, response: HttpResponse, sent: &Student) -> Result<Student, DaoError> {
        CREATE.check(&response)?;
        mapping::decode(&response.body, Some(sent)).map_err(|e| CREATE.fail(e))
    }

    /// Fields missing from the response keep their value from `sent`.
    pub fn parse_update(
        &self,
        response: HttpResponse,
        id: i64,
        sent: &Student,
    ) -> Result<Student, DaoError> {
        UPDATE.check(&response)?;
        mapping::decode_update(&response.body, sent, id).map_err(|e| UPDATE.fail(e))
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), DaoError> {
        DELETE.check(&response)
    }
}

impl<T: Transport> StudentDao<T> {
    pub async fn list(&self) -> Result<Vec<Student>, DaoError> {
        let response = self.resource.send(self.build_list(), LIST).await?;
        self.parse_list(response)
    }

    pub async fn get(&self, id: i64) -> Result<Student, DaoError> {
        let response = self.resource.send(self.build_get(id), GET).await?;
        self.parse_get(response)
    }

    pub async fn create(&self, student: &Student) -> Result<Student, DaoError> {
        let request = self.build_create(student)?;
        let response = self.resource.send(request, CREATE).await?;
        self.parse_create(response, student)
    }

    pub async fn update(&self, id: i64, student: &Student) -> Result<Student, DaoError> {
        let request = self.build_update(id, student)?;
        let response = self.resource.send(request, UPDATE).await?;
        self.parse_update(response, id, student)
    }

    pub async fn delete(&self, id: i64) -> Result<(), DaoError> {
        let response = self.resource.send(self.build_delete(id), DELETE).await?;
        self.parse_delete(response)
    }
}

//! Track DAO over `/api/Parcours`, including the enrollment listing.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, DaoError};
use crate::http::{HttpRequest, HttpResponse};
use crate::mapping;
use crate::resource::{Operation, ResourceClient};
use crate::transport::Transport;
use crate::types::{Enrollee, Track};

pub const RESOURCE: &str = "Parcours";

const LIST: Operation = Operation::new("tracks.list", "Impossible de récupérer les parcours");
const GET: Operation = Operation::new("tracks.get", "Impossible de récupérer le parcours");
const CREATE: Operation = Operation::new("tracks.create", "Impossible de créer le nouveau parcours");
const UPDATE: Operation = Operation::new("tracks.update", "Impossible de modifier le parcours");
const DELETE: Operation = Operation::new("tracks.delete", "Impossible de supprimer le parcours");
const ENROLLEES: Operation = Operation::new(
    "tracks.enrollees",
    "Impossible de récupérer les inscrits du parcours",
);

#[derive(Debug, Clone)]
pub struct TrackDao<T> {
    resource: ResourceClient<T>,
}

impl<T> TrackDao<T> {
    pub fn new(resource: ResourceClient<T>) -> Self {
        Self { resource }
    }

    pub fn build_list(&self) -> HttpRequest {
        self.resource.get(self.resource.base_url().to_string())
    }

    pub fn build_get(&self, id: i64) -> HttpRequest {
        self.resource.get(self.resource.item_url(id))
    }

    pub fn build_create(&self, track: &Track) -> Result<HttpRequest, DaoError> {
        self.resource.post(
            self.resource.base_url().to_string(),
            &track.to_payload(),
            CREATE,
        )
    }

    pub fn build_update(&self, id: i64, track: &Track) -> Result<HttpRequest, DaoError> {
        self.resource
            .put(self.resource.item_url(id), &track.to_payload(), UPDATE)
    }

    pub fn build_delete(&self, id: i64) -> HttpRequest {
        self.resource.delete(self.resource.item_url(id))
    }

    pub fn build_enrollees(&self, id: i64) -> HttpRequest {
        self.resource
            .get(format!("{}/inscrits", self.resource.item_url(id)))
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<Vec<Track>, DaoError> {
        LIST.check(&response)?;
        mapping::decode_list(&response.body).map_err(|e| LIST.fail(e))
    }

    pub fn parse_get(&self, response: HttpResponse) -> Result<Track, DaoError> {
        GET.check(&response)?;
        mapping::decode(&response.body, None).map_err(|e| GET.fail(e))
    }

    pub fn parse_create(&self, response: HttpResponse, sent: &Track) -> Result<Track, DaoError> {
        CREATE.check(&response)?;
        mapping::decode(&response.body, Some(sent)).map_err(|e| CREATE.fail(e))
    }

    pub fn parse_update(
        &self,
        response: HttpResponse,
        id: i64,
        sent: &Track,
    ) -> Result<Track, DaoError> {
        UPDATE.check(&response)?;
        mapping::decode_update(&response.body, sent, id).map_err(|e| UPDATE.fail(e))
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), DaoError> {
        DELETE.check(&response)
    }

    /// The body is the track with an `inscrits` array; anything without that
    /// array means nobody is enrolled.
    pub fn parse_enrollees(&self, response: HttpResponse) -> Result<Vec<Enrollee>, DaoError> {
        ENROLLEES.check(&response)?;
        if response.body.trim().is_empty() {
            return Ok(Vec::new());
        }
        let value: Value = serde_json::from_str(&response.body)
            .map_err(|e| ENROLLEES.fail(ApiError::Deserialization(e.to_string())))?;
        match value.get("inscrits") {
            Some(rows) if rows.is_array() => Vec::<Enrollee>::deserialize(rows)
                .map_err(|e| ENROLLEES.fail(ApiError::Deserialization(e.to_string()))),
            _ => Ok(Vec::new()),
        }
    }
}

impl<T: Transport> TrackDao<T> {
    pub async fn list(&self) -> Result<Vec<Track>, DaoError> {
        let response = self.resource.send(self.build_list(), LIST).await?;
        self.parse_list(response)
    }

    pub async fn get(&self, id: i64) -> Result<Track, DaoError> {
        let response = self.resource.send(self.build_get(id), GET).await?;
        self.parse_get(response)
    }

    pub async fn create(&self, track: &Track) -> Result<Track, DaoError> {
        let request = self.build_create(track)?;
        let response = self.resource.send(request, CREATE).await?;
        self.parse_create(response, track)
    }

    pub async fn update(&self, id: i64, track: &Track) -> Result<Track, DaoError> {
        let request = self.build_update(id, track)?;
        let response = self.resource.send(request, UPDATE).await?;
        self.parse_update(response, id, track)
    }

    pub async fn delete(&self, id: i64) -> Result<(), DaoError> {
        let response = self.resource.send(self.build_delete(id), DELETE).await?;
        self.parse_delete(response)
    }

    /// Students enrolled in track `id`.
    pub async fn enrollees(&self, id: i64) -> Result<Vec<Enrollee>, DaoError> {
        let response = self.resource.send(self.build_enrollees(id), ENROLLEES).await?;
        self.parse_enrollees(response)
    }
}

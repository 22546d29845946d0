//! Course unit DAO over `/api/Ue`.
//!
//! Track associations live under a differently named collection,
//! `/api/Ues/:id/parcours`, and are replaced wholesale by id list.

use std::sync::Arc;

use crate::error::DaoError;
use crate::http::{HttpRequest, HttpResponse};
use crate::mapping;
use crate::resource::{Operation, ResourceClient};
use crate::transport::Transport;
use crate::types::{CourseUnit, Track, UnitTracksPayload};

pub const RESOURCE: &str = "Ue";
pub const ASSOCIATION_RESOURCE: &str = "Ues";

const LIST: Operation = Operation::new("units.list", "Impossible de récupérer les UE");
const GET: Operation = Operation::new("units.get", "Impossible de récupérer l'UE");
const CREATE: Operation = Operation::new("units.create", "Impossible de créer l'UE");
const UPDATE: Operation = Operation::new("units.update", "Impossible de modifier l'UE");
const DELETE: Operation = Operation::new("units.delete", "Impossible de supprimer l'UE");
const TRACKS: Operation = Operation::new("units.tracks", "Impossible de récupérer les parcours de l'UE");
const SET_TRACKS: Operation = Operation::new(
    "units.set_tracks",
    "Impossible de modifier les parcours de l'UE",
);

#[derive(Debug, Clone)]
pub struct CourseUnitDao<T> {
    resource: ResourceClient<T>,
    associations: ResourceClient<T>,
}

impl<T> CourseUnitDao<T> {
    pub fn new(api_root: &str, transport: Arc<T>) -> Self {
        Self {
            resource: ResourceClient::new(api_root, RESOURCE, Arc::clone(&transport)),
            associations: ResourceClient::new(api_root, ASSOCIATION_RESOURCE, transport),
        }
    }

    fn tracks_url(&self, id: i64) -> String {
        format!("{}/parcours", self.associations.item_url(id))
    }

    pub fn build_list(&self) -> HttpRequest {
        self.resource.get(self.resource.base_url().to_string())
    }

    pub fn build_get(&self, id: i64) -> HttpRequest {
        self.resource.get(self.resource.item_url(id))
    }

    pub fn build_create(&self, unit: &CourseUnit) -> Result<HttpRequest, DaoError> {
        self.resource.post(
            self.resource.base_url().to_string(),
            &unit.to_payload(),
            CREATE,
        )
    }

    pub fn build_update(&self, id: i64, unit: &CourseUnit) -> Result<HttpRequest, DaoError> {
        self.resource
            .put(self.resource.item_url(id), &unit.to_payload(), UPDATE)
    }

    pub fn build_delete(&self, id: i64) -> HttpRequest {
        self.resource.delete(self.resource.item_url(id))
    }

    pub fn build_tracks(&self, id: i64) -> HttpRequest {
        self.associations.get(self.tracks_url(id))
    }

    pub fn build_set_tracks(&self, id: i64, track_ids: &[i64]) -> Result<HttpRequest, DaoError> {
        let payload = UnitTracksPayload {
            track_ids: track_ids.to_vec(),
        };
        self.associations.put(self.tracks_url(id), &payload, SET_TRACKS)
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<Vec<CourseUnit>, DaoError> {
        LIST.check(&response)?;
        mapping::decode_list(&response.body).map_err(|e| LIST.fail(e))
    }

    pub fn parse_get(&self, response: HttpResponse) -> Result<CourseUnit, DaoError> {
        GET.check(&response)?;
        mapping::decode(&response.body, None).map_err(|e| GET.fail(e))
    }

    pub fn parse_create(
        &self,
        response: HttpResponse,
        sent: &CourseUnit,
    ) -> Result<CourseUnit, DaoError> {
        CREATE.check(&response)?;
        mapping::decode(&response.body, Some(sent)).map_err(|e| CREATE.fail(e))
    }

    pub fn parse_update(
        &self,
        response: HttpResponse,
        id: i64,
        sent: &CourseUnit,
    ) -> Result<CourseUnit, DaoError> {
        UPDATE.check(&response)?;
        mapping::decode_update(&response.body, sent, id).map_err(|e| UPDATE.fail(e))
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), DaoError> {
        DELETE.check(&response)
    }

    pub fn parse_tracks(&self, response: HttpResponse) -> Result<Vec<Track>, DaoError> {
        TRACKS.check(&response)?;
        mapping::decode_list(&response.body).map_err(|e| TRACKS.fail(e))
    }

    /// The association response body is ignored.
    pub fn parse_set_tracks(&self, response: HttpResponse) -> Result<(), DaoError> {
        SET_TRACKS.check(&response)
    }
}

impl<T: Transport> CourseUnitDao<T> {
    pub async fn list(&self) -> Result<Vec<CourseUnit>, DaoError> {
        let response = self.resource.send(self.build_list(), LIST).await?;
        self.parse_list(response)
    }

    pub async fn get(&self, id: i64) -> Result<CourseUnit, DaoError> {
        let response = self.resource.send(self.build_get(id), GET).await?;
        self.parse_get(response)
    }

    pub async fn create(&self, unit: &CourseUnit) -> Result<CourseUnit, DaoError> {
        let request = self.build_create(unit)?;
        let response = self.resource.send(request, CREATE).await?;
        self.parse_create(response, unit)
    }

    pub async fn update(&self, id: i64, unit: &CourseUnit) -> Result<CourseUnit, DaoError> {
        let request = self.build_update(id, unit)?;
        let response = self.resource.send(request, UPDATE).await?;
        self.parse_update(response, id, unit)
    }

    pub async fn delete(&self, id: i64) -> Result<(), DaoError> {
        let response = self.resource.send(self.build_delete(id), DELETE).await?;
        self.parse_delete(response)
    }

    /// Tracks currently associated with unit `id`.
    pub async fn tracks(&self, id: i64) -> Result<Vec<Track>, DaoError> {
        let response = self.associations.send(self.build_tracks(id), TRACKS).await?;
        self.parse_tracks(response)
    }

    /// Replace the tracks associated with unit `id`.
    pub async fn set_tracks(&self, id: i64, track_ids: &[i64]) -> Result<(), DaoError> {
        let request = self.build_set_tracks(id, track_ids)?;
        let response = self.associations.send(request, SET_TRACKS).await?;
        self.parse_set_tracks(response)
    }
}

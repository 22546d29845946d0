//! One object giving access to every DAO.
//!
//! # Design
//! Built once at application start and passed by reference to whatever needs
//! it. The DAOs share one transport through an `Arc` and keep no other
//! state, so there is no global instance and nothing to reset.

use std::sync::Arc;

use crate::config::Config;
use crate::error::ApiError;
use crate::resource::ResourceClient;
use crate::students::{self, StudentDao};
use crate::tracks::{self, TrackDao};
use crate::transport::ReqwestTransport;
use crate::units::CourseUnitDao;

#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    students: StudentDao<T>,
    tracks: TrackDao<T>,
    units: CourseUnitDao<T>,
}

impl<T> ApiClient<T> {
    pub fn new(api_root: &str, transport: T) -> Self {
        Self::with_shared(api_root, Arc::new(transport))
    }

    pub fn with_shared(api_root: &str, transport: Arc<T>) -> Self {
        Self {
            students: StudentDao::new(ResourceClient::new(
                api_root,
                students::RESOURCE,
                Arc::clone(&transport),
            )),
            tracks: TrackDao::new(ResourceClient::new(
                api_root,
                tracks::RESOURCE,
                Arc::clone(&transport),
            )),
            units: CourseUnitDao::new(api_root, transport),
        }
    }

    pub fn students(&self) -> &StudentDao<T> {
        &self.students
    }

    pub fn tracks(&self) -> &TrackDao<T> {
        &self.tracks
    }

    pub fn units(&self) -> &CourseUnitDao<T> {
        &self.units
    }
}

impl ApiClient<ReqwestTransport> {
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config.request_timeout)?;
        tracing::info!(api_url = %config.api_url, "API client ready");
        Ok(Self::new(&config.api_url, transport))
    }
}

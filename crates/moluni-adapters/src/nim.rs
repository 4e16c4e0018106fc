//! Cliente HTTP bloqueante para la API de cálculo.
//!
//! - `GET {base}/{job_id}` devuelve el documento de estado.
//! - `POST {base}` con el payload devuelve `{"job_id": ...}`.
//!
//! Los fallos HTTP se clasifican en `QueryError`; ninguno es terminal para
//! el reconciliador.

use std::time::Duration;

use log::{debug, warn};
use moluni_core::{JobStatusSource, JobSubmitter, QueryError, RemoteReport};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use crate::config::NimConfig;
use crate::document::parse_status_document;
use crate::error::AdapterError;

pub struct NimClient {
    config: NimConfig,
    http: Client,
}

impl NimClient {
    pub fn new(config: NimConfig) -> Result<Self, AdapterError> {
        config.validate()?;
        let http = Client::builder().connect_timeout(config.timeout.min(Duration::from_secs(15)))
                                    .timeout(config.timeout)
                                    .build()
                                    .map_err(|e| AdapterError::Client(e.to_string()))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &NimConfig {
        &self.config
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }

    fn send(&self, req: RequestBuilder) -> Result<Response, QueryError> {
        let response = self.authorized(req).send().map_err(map_transport)?;
        check_status(response.status())?;
        Ok(response)
    }
}

fn map_transport(e: reqwest::Error) -> QueryError {
    if e.is_timeout() {
        QueryError::Timeout
    } else if e.is_decode() {
        QueryError::InvalidResponse(e.to_string())
    } else {
        QueryError::Transport(e.to_string())
    }
}

/// Clasifica códigos HTTP no exitosos.
pub(crate) fn check_status(status: StatusCode) -> Result<(), QueryError> {
    if status.is_success() {
        return Ok(());
    }
    Err(match status {
            StatusCode::NOT_FOUND => QueryError::NotFound,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => QueryError::Unauthorized,
            StatusCode::TOO_MANY_REQUESTS => QueryError::RateLimited,
            s if s.is_server_error() => QueryError::Transport(format!("HTTP {s}")),
            s => QueryError::InvalidResponse(format!("unexpected HTTP status {s}")),
        })
}

impl JobStatusSource for NimClient {
    fn query(&self, job_id: &str) -> Result<RemoteReport, QueryError> {
        let url = self.config.status_url(job_id).map_err(|e| {
                                                   warn!("remote:query job_id={job_id:?} sin URL válida: {e}");
                                                   QueryError::NotFound
                                               })?;
        debug!("remote:query job_id={job_id} url={url}");
        let doc: Value = self.send(self.http.get(url))?.json::<Value>().map_err(map_transport)?;
        parse_status_document(doc)
    }
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    job_id: String,
}

impl JobSubmitter for NimClient {
    fn submit(&self, payload: &Value) -> Result<String, QueryError> {
        debug!("remote:submit url={}", self.config.base_url);
        let body: SubmitResponse = self.send(self.http.post(&self.config.base_url).json(payload))?
                                       .json::<SubmitResponse>()
                                       .map_err(map_transport)?;
        if body.job_id.trim().is_empty() {
            return Err(QueryError::InvalidResponse("empty job_id".into()));
        }
        Ok(body.job_id)
    }
}

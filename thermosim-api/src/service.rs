use std::sync::Arc;

use hyper::{header, Body, Method, Request, Response, StatusCode};
use serde::Deserialize;
use thermosim::{core::Sensor, Error, RunConfig};

type ErasedError = Box<dyn std::error::Error + Send + Sync>;
type Result<T> = std::result::Result<T, ErasedError>;

/// Maximum number of readings a single request may generate.
const MAX_REQUEST_READINGS: usize = 1_000_000;

/// Generation request.
///
/// Field names follow the snake case convention of the HTTP interface.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub total_readings: usize,
    pub starting_temp: f64,
    pub max_temp_increase: f64,
    pub temp_fluctuation: f64,
    pub min_temp: f64,
    pub max_temp: f64,
    #[serde(default)]
    pub simulate: bool,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub sensors: Vec<Sensor>,
}

impl GenerateRequest {
    /// Split the request into run configuration and sensors.
    pub fn into_parts(self) -> (RunConfig, Vec<Arc<Sensor>>) {
        let config = RunConfig {
            total_ticks: self.total_readings,
            starting_temp: self.starting_temp,
            max_ramp_amount: self.max_temp_increase,
            fluctuation_amplitude: self.temp_fluctuation,
            min_temp: self.min_temp,
            max_temp: self.max_temp,
            simulate: self.simulate,
            seed: self.seed,
            ..Default::default()
        };

        (config, self.sensors.into_iter().map(Arc::new).collect())
    }
}

pub async fn service(request: Request<Body>) -> Result<Response<Body>> {
    match (request.uri().path(), request.method()) {
        ("/generate-temperature-readings", &Method::POST) => generate(request).await,
        (path, method) => {
            log::debug!("No route for {} {}", method, path);

            text(StatusCode::NOT_FOUND, "Not found")
        }
    }
}

async fn generate(request: Request<Body>) -> Result<Response<Body>> {
    let body = hyper::body::to_bytes(request.into_body()).await?;

    let payload: GenerateRequest = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            log::warn!("Invalid request payload: {}", e);
            return text(StatusCode::BAD_REQUEST, "Invalid request payload");
        }
    };

    let (config, sensors) = payload.into_parts();

    if config.total_ticks.saturating_mul(sensors.len()) > MAX_REQUEST_READINGS {
        log::warn!(
            "Rejected request for {} readings of {} sensors",
            config.total_ticks,
            sensors.len()
        );
        return text(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("request exceeds {} readings", MAX_REQUEST_READINGS),
        );
    }

    log::info!(
        "Generating {} readings for {} sensors",
        config.total_ticks,
        sensors.len()
    );

    let result =
        tokio::task::spawn_blocking(move || thermosim::generate_readings(&sensors, &config))
            .await?;

    match result {
        Ok(readings) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&readings)?))?),
        Err(e @ (Error::InvalidConfig(_) | Error::EmptySensorList)) => {
            log::warn!("Rejected request: {}", e);
            text(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
        Err(e) => {
            log::error!("Generation failed: {}", e);
            text(StatusCode::INTERNAL_SERVER_ERROR, "Generation failed")
        }
    }
}

fn text(status: StatusCode, message: impl Into<String>) -> Result<Response<Body>> {
    Ok(Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(message.into()))?)
}

//! # Routes HTTP du service SMAPI
//!
//! - `POST {soap_endpoint}` : actions SOAP des lecteurs
//! - `GET {soap_endpoint}` : WSDL du service, si un fichier est configuré
//! - `GET /manifest` : points d'entrée des rapports
//! - `POST /playback/v2.1/report` et `.../timePlayed` : rapports de lecture

use crate::reporting::{
    Manifest, REPORT_PATH, TIME_PLAYED_PATH, TimePlayedItem, TimePlayedReport, TimePlayedResponse,
};
use crate::request::SmapiRequest;
use crate::service::SmapiService;
use crate::soap::{SoapFault, build_soap_response, fault_codes, parse_soap_action};
use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use pmoaudiobook::{PartPosition, TrackId};
use pmoserver::Server;
use std::sync::Arc;
use tracing::{debug, error, warn};

const XML_CONTENT_TYPE: &str = "text/xml; charset=\"utf-8\"";

/// Router complet du service, utilisable seul (tests) ou fusionné dans un [`Server`]
pub fn smapi_router(service: Arc<SmapiService>) -> Router {
    let endpoint = service.settings().soap_endpoint.clone();

    Router::new()
        .route(&endpoint, get(wsdl_handler).post(soap_handler))
        .route("/manifest", get(manifest_handler))
        .route(REPORT_PATH, post(report_handler))
        .route(TIME_PLAYED_PATH, post(time_played_handler))
        .with_state(service)
}

/// Trait d'extension pour exposer le service SMAPI sur un `pmoserver::Server`
///
/// # Examples
///
/// ```ignore
/// use pmosmapi::{SmapiServerExt, SmapiService};
///
/// let service = Arc::new(SmapiService::from_config(catalog, &config));
/// server.register_smapi(service).await;
/// ```
#[async_trait]
pub trait SmapiServerExt {
    async fn register_smapi(&mut self, service: Arc<SmapiService>);
}

#[async_trait]
impl SmapiServerExt for Server {
    async fn register_smapi(&mut self, service: Arc<SmapiService>) {
        let endpoint = service.settings().soap_endpoint.clone();
        self.add_router("/", smapi_router(service)).await;
        tracing::info!("✅ SMAPI service registered on {}", endpoint);
    }
}

fn xml_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, XML_CONTENT_TYPE)], body).into_response()
}

fn fault_response(fault: &SoapFault) -> Response {
    match fault.to_xml() {
        Ok(xml) => xml_response(StatusCode::INTERNAL_SERVER_ERROR, xml),
        Err(e) => {
            error!("Cannot serialize SOAP fault: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn soap_handler(State(service): State<Arc<SmapiService>>, body: String) -> Response {
    let action = match parse_soap_action(body.as_bytes()) {
        Ok(action) => action,
        Err(e) => {
            warn!("Malformed SOAP request: {}", e);
            return fault_response(&SoapFault::new(fault_codes::CLIENT, e.to_string()));
        }
    };
    debug!(action = %action.name, "SMAPI request");

    let request = match SmapiRequest::try_from(&action) {
        Ok(request) => request,
        Err(e) => {
            warn!(action = %action.name, "Rejected SMAPI request: {}", e);
            return fault_response(&SoapFault::from(e));
        }
    };

    match service.execute(request).await {
        Ok(content) => match build_soap_response(&action.name, content) {
            Ok(xml) => xml_response(StatusCode::OK, xml),
            Err(e) => {
                error!(action = %action.name, "Cannot build SOAP response: {}", e);
                fault_response(&SoapFault::new(
                    fault_codes::SERVICE_UNAVAILABLE,
                    "Cannot build response",
                ))
            }
        },
        Err(fault) => {
            debug!(action = %action.name, fault = %fault.fault_code, "SMAPI fault");
            fault_response(&fault)
        }
    }
}

async fn wsdl_handler(State(service): State<Arc<SmapiService>>) -> Response {
    let Some(path) = service.settings().wsdl_file.clone() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match tokio::fs::read_to_string(&path).await {
        Ok(wsdl) => xml_response(StatusCode::OK, wsdl),
        Err(e) => {
            warn!("Cannot read WSDL file {}: {}", path.display(), e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

async fn manifest_handler(State(service): State<Arc<SmapiService>>) -> Json<Manifest> {
    Json(Manifest::reporting(&service.settings().public_url))
}

async fn report_handler() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Répond immédiatement, l'enregistrement des progressions se fait en tâche de fond
async fn time_played_handler(
    State(service): State<Arc<SmapiService>>,
    Json(report): Json<TimePlayedReport>,
) -> Json<TimePlayedResponse> {
    for item in report.items {
        spawn_progress_report(service.clone(), item);
    }
    Json(TimePlayedResponse::with_interval(
        service.settings().report_interval_millis,
    ))
}

fn spawn_progress_report(service: Arc<SmapiService>, item: TimePlayedItem) {
    let track: TrackId = match item.object_id.parse() {
        Ok(track) => track,
        Err(e) => {
            warn!(object_id = %item.object_id, "Ignoring report: {}", e);
            return;
        }
    };
    let item_id = item
        .container_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| track.item_id.clone());
    let position = PartPosition::from_millis(&track.part_id, item.position_millis);

    tokio::spawn(async move {
        if let Err(e) = service.report_progress(&item_id, &position).await {
            warn!(item_id = %item_id, "Cannot store progress: {}", e);
        }
    });
}

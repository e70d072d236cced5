// 🌐 HTTP surface - REST API with Axum
//
// One route per verb of the collection. Handlers lock the shared store,
// do one store call and wrap the result in the response envelope.

use crate::contract::{Contract, ContractField, ContractId, FieldValue, NewContract};
use crate::db::{EntityStore, SqliteStore};
use crate::error::StoreError;
use crate::transfer::{load_contracts, save_contracts};
use crate::wire::{ApiResponse, ChangeRequest, DeleteRequest, ExportRequest, ImportRequest, ReasonCode};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::Serialize;
use std::path::Path as FsPath;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<SqliteStore>>,
}

impl AppState {
    pub fn new(store: SqliteStore) -> Self {
        AppState {
            store: Arc::new(Mutex::new(store)),
        }
    }

    fn store(&self) -> Result<MutexGuard<'_, SqliteStore>, Response> {
        self.store.lock().map_err(|_| {
            error!("store lock poisoned");
            reply(StatusCode::INTERNAL_SERVER_ERROR, ReasonCode::GeneralError, serde_json::Value::Null)
        })
    }
}

fn reply<T: Serialize>(status: StatusCode, code: ReasonCode, body: T) -> Response {
    (status, Json(ApiResponse::new(code, body))).into_response()
}

fn empty() -> serde_json::Value {
    serde_json::json!({})
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /status - Liveness
async fn status() -> &'static str {
    info!("status requested");
    "Backend running.\n"
}

/// GET /all - Every contract
async fn get_all_contracts(State(state): State<AppState>) -> Response {
    let store = match state.store() {
        Ok(store) => store,
        Err(response) => return response,
    };

    match store.get_all() {
        Ok(contracts) => reply(StatusCode::OK, ReasonCode::GeneralSuccess, contracts),
        Err(e) => {
            error!(error = %e, "listing contracts failed");
            reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                ReasonCode::GeneralError,
                Vec::<Contract>::new(),
            )
        }
    }
}

/// GET /get/:id - One contract
async fn get_contract(State(state): State<AppState>, Path(id): Path<ContractId>) -> Response {
    let store = match state.store() {
        Ok(store) => store,
        Err(response) => return response,
    };

    match store.get_by_id(id) {
        Ok(contract) => reply(StatusCode::OK, ReasonCode::GeneralSuccess, Some(contract)),
        Err(StoreError::NotFound(_)) => {
            reply(StatusCode::NOT_FOUND, ReasonCode::GeneralError, None::<Contract>)
        }
        Err(e) => {
            error!(id, error = %e, "loading contract failed");
            reply(StatusCode::INTERNAL_SERVER_ERROR, ReasonCode::GeneralError, None::<Contract>)
        }
    }
}

/// POST /add - Create from a full submission
async fn add_contract(State(state): State<AppState>, Json(request): Json<serde_json::Value>) -> Response {
    let new = match NewContract::from_json(&request) {
        Ok(new) => new,
        Err(e) => {
            warn!(error = %e, "rejected new contract");
            return reply(StatusCode::BAD_REQUEST, ReasonCode::CreateError, None::<Contract>);
        }
    };

    let mut store = match state.store() {
        Ok(store) => store,
        Err(response) => return response,
    };

    match store.insert(new) {
        Ok(contract) => reply(StatusCode::OK, ReasonCode::CreateSuccess, Some(contract)),
        Err(e) => {
            error!(error = %e, "creating contract failed");
            reply(StatusCode::BAD_REQUEST, ReasonCode::CreateError, None::<Contract>)
        }
    }
}

/// POST /delete - Remove by id
async fn delete_contract(State(state): State<AppState>, Json(request): Json<DeleteRequest>) -> Response {
    let mut store = match state.store() {
        Ok(store) => store,
        Err(response) => return response,
    };

    // id decides; a mismatching name is only worth a warning
    if let (Some(name), Ok(current)) = (&request.name, store.get_by_id(request.id)) {
        if &current.name != name {
            warn!(
                id = request.id,
                requested = %name,
                stored = %current.name,
                "delete request name does not match stored contract"
            );
        }
    }

    match store.delete_by_id(request.id) {
        Ok(()) => reply(StatusCode::OK, ReasonCode::DeleteSuccess, empty()),
        Err(StoreError::NotFound(id)) => {
            warn!(id, "contract for deletion missing");
            reply(StatusCode::NOT_FOUND, ReasonCode::DeleteMissing, empty())
        }
        Err(e) => {
            error!(id = request.id, error = %e, "deleting contract failed");
            reply(StatusCode::INTERNAL_SERVER_ERROR, ReasonCode::DeleteError, empty())
        }
    }
}

/// PATCH|PUT /change/:id - Update exactly one field
async fn update_contract(
    State(state): State<AppState>,
    Path(id): Path<ContractId>,
    Json(request): Json<ChangeRequest>,
) -> Response {
    let parsed = request
        .key
        .parse::<ContractField>()
        .and_then(|field| FieldValue::from_json(field, &request.value).map(|value| (field, value)));

    let (field, value) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(id, key = %request.key, error = %e, "rejected field update");
            return reply(StatusCode::CONFLICT, ReasonCode::UpdateError, None::<Contract>);
        }
    };

    let mut store = match state.store() {
        Ok(store) => store,
        Err(response) => return response,
    };

    match store.apply_field_update(id, field, value) {
        Ok(contract) => {
            info!(id, %field, "contract updated");
            reply(StatusCode::OK, ReasonCode::UpdateSuccess, Some(contract))
        }
        Err(StoreError::NotFound(_)) => {
            reply(StatusCode::NOT_FOUND, ReasonCode::UpdateError, None::<Contract>)
        }
        Err(StoreError::Validation(reason)) => {
            warn!(id, %field, %reason, "field update failed validation");
            reply(StatusCode::CONFLICT, ReasonCode::UpdateError, None::<Contract>)
        }
        Err(e) => {
            error!(id, %field, error = %e, "field update failed");
            reply(StatusCode::INTERNAL_SERVER_ERROR, ReasonCode::UpdateError, None::<Contract>)
        }
    }
}

/// PUT /import - Load contracts from a file, appending or replacing
async fn import_contracts(State(state): State<AppState>, Json(request): Json<ImportRequest>) -> Response {
    // Read the file before touching the store so a bad file never wipes data
    let loaded = load_contracts(FsPath::new(&request.filepath));

    let mut store = match state.store() {
        Ok(store) => store,
        Err(response) => return response,
    };

    let result = match loaded {
        Ok(contracts) => store.import(contracts, request.overwrite).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };

    match result {
        Ok(imported) => {
            info!(path = %request.filepath, count = imported.len(), "contracts imported");
            reply(StatusCode::OK, ReasonCode::ImportSuccess, imported)
        }
        Err(reason) => {
            error!(path = %request.filepath, %reason, "import failed");
            let current = store.get_all().unwrap_or_default();
            reply(StatusCode::BAD_REQUEST, ReasonCode::ImportFailed, current)
        }
    }
}

/// POST /export - Write every contract to a file
async fn export_contracts(State(state): State<AppState>, Json(request): Json<ExportRequest>) -> Response {
    let contracts = {
        let store = match state.store() {
            Ok(store) => store,
            Err(response) => return response,
        };
        store.get_all()
    };

    let result = contracts
        .map_err(|e| e.to_string())
        .and_then(|contracts| save_contracts(FsPath::new(&request.filepath), &contracts).map_err(|e| e.to_string()));

    match result {
        Ok(count) => reply(StatusCode::OK, ReasonCode::ExportSuccess, serde_json::json!({ "count": count })),
        Err(reason) => {
            error!(path = %request.filepath, %reason, "export failed");
            reply(StatusCode::BAD_REQUEST, ReasonCode::ExportFailed, empty())
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/all", get(get_all_contracts))
        .route("/get/:id", get(get_contract))
        .route("/add", post(add_contract))
        .route("/delete", post(delete_contract))
        .route("/change/:id", patch(update_contract).put(update_contract))
        .route("/import", put(import_contracts))
        .route("/export", post(export_contracts))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

//! Model catalog and provider key validation

use axum::{extract::State, Json};

use crate::server::extract::JsonBody;
use crate::server::state::AppState;
use crate::types::response::{ModelsResponse, ValidateKeyResponse};
use crate::types::ValidateKeyRequest;

/// GET /api/models - Selectable chat models
pub async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.engine().models().to_vec(),
    })
}

/// POST /api/validate-key - Probe the provider with the caller's key
pub async fn validate_key(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ValidateKeyRequest>,
) -> Json<ValidateKeyResponse> {
    let model = state.config().provider.validation_model.clone();
    let valid = state.engine().validate_key(&request.api_key).await;

    let response = if valid {
        ValidateKeyResponse {
            valid: true,
            message: "API key is valid".to_string(),
            model_tested: Some(model),
        }
    } else {
        ValidateKeyResponse {
            valid: false,
            message: "API key was rejected by the provider".to_string(),
            model_tested: None,
        }
    };

    Json(response)
}

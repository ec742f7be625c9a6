use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderName, StatusCode, header},
};
use tracing::{debug, error};

use crate::{
    adapters::inbound::http::{
        dto::{AddPackageDto, AddPackageUpdateDto, ErrorResponseDto, PackageDto, SuccessResponseDto},
        router::AppState,
    },
    domain::{errors::PackageError, value_objects::PackageCode},
};

type ApiError = (StatusCode, Json<ErrorResponseDto>);

fn api_error(error: PackageError) -> ApiError {
    if matches!(
        error,
        PackageError::Repository { .. } | PackageError::DuplicateCode { .. }
    ) {
        error!(error = %error, "Package store failure");
    }

    (
        StatusCode::from(&error),
        Json(ErrorResponseDto::from_package_error(&error)),
    )
}

/// A code that cannot be valid was never issued, so it reads as not found
fn parse_code(raw: String) -> Result<PackageCode, ApiError> {
    PackageCode::new(raw.clone()).map_err(|e| {
        debug!(code = %raw, error = %e, "Rejecting malformed package code");
        (StatusCode::NOT_FOUND, Json(ErrorResponseDto::not_found(&raw)))
    })
}

/// Handle listing all packages
pub async fn list_packages(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<PackageDto>>, ApiError> {
    let packages = app_state
        .package_service
        .list_packages()
        .await
        .map_err(api_error)?;

    Ok(Json(packages.into_iter().map(PackageDto::from).collect()))
}

/// Handle fetching a single package with its history
pub async fn get_package(
    State(app_state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<PackageDto>, ApiError> {
    let code = parse_code(code)?;

    let package = app_state
        .package_service
        .get_package(&code)
        .await
        .map_err(api_error)?;

    Ok(Json(package.into()))
}

/// Handle registering a package
pub async fn create_package(
    State(app_state): State<AppState>,
    Json(dto): Json<AddPackageDto>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<PackageDto>), ApiError> {
    let package = app_state
        .package_service
        .create_package(dto.into())
        .await
        .map_err(api_error)?;

    let location = format!("/api/packages/{}", package.code);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(package.into()),
    ))
}

/// Handle appending a status update to a package
pub async fn add_package_update(
    State(app_state): State<AppState>,
    Path(code): Path<String>,
    Json(dto): Json<AddPackageUpdateDto>,
) -> Result<StatusCode, ApiError> {
    let code = parse_code(code)?;

    app_state
        .package_service
        .add_update(&code, dto.into())
        .await
        .map_err(api_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Handle deleting a package. Any request body is ignored.
pub async fn delete_package(
    State(app_state): State<AppState>,
    Path(code): Path<String>,
) -> Result<(StatusCode, Json<SuccessResponseDto>), ApiError> {
    let code = parse_code(code)?;

    app_state
        .package_service
        .delete_package(&code)
        .await
        .map_err(api_error)?;

    Ok((
        StatusCode::OK,
        Json(SuccessResponseDto::with_data(
            "Package deleted successfully",
            serde_json::json!({ "code": code.as_str() }),
        )),
    ))
}

/// Liveness probe
pub async fn health() -> Json<SuccessResponseDto> {
    Json(SuccessResponseDto::new("ok"))
}

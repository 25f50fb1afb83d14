//! Plant species handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use shared::{Action, Resource};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{check_permission, AuthUser};
use crate::models::PlantSpecies;
use crate::services::species::{CreateSpeciesInput, UpdateSpeciesInput};
use crate::services::SpeciesService;
use crate::AppState;

pub async fn list_species(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<Vec<PlantSpecies>>> {
    check_permission(&user, Resource::Species, Action::View)?;
    let service = SpeciesService::new(state.db.clone());
    Ok(Json(service.list_species().await?))
}

pub async fn get_species(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(species_id): Path<Uuid>,
) -> AppResult<Json<PlantSpecies>> {
    check_permission(&user, Resource::Species, Action::View)?;
    let service = SpeciesService::new(state.db.clone());
    Ok(Json(service.get_species(species_id).await?))
}

pub async fn create_species(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<CreateSpeciesInput>,
) -> AppResult<(StatusCode, Json<PlantSpecies>)> {
    check_permission(&user, Resource::Species, Action::Create)?;
    let service = SpeciesService::new(state.db.clone());
    Ok((StatusCode::CREATED, Json(service.create_species(input).await?)))
}

pub async fn update_species(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(species_id): Path<Uuid>,
    Json(input): Json<UpdateSpeciesInput>,
) -> AppResult<Json<PlantSpecies>> {
    check_permission(&user, Resource::Species, Action::Edit)?;
    let service = SpeciesService::new(state.db.clone());
    Ok(Json(service.update_species(species_id, input).await?))
}

pub async fn delete_species(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(species_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    check_permission(&user, Resource::Species, Action::Delete)?;
    let service = SpeciesService::new(state.db.clone());
    service.delete_species(species_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

use super::extractors::ValidJson;
use super::{parse_id, require_user, store_for, ApiError};
use crate::db::ShowStore;
use crate::models::{Class, EditEntryForm, Entry, NewEntryForm};
use crate::session::CurrentSession;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{StatusCode, Uri},
    Extension, Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

async fn find_class(store: &ShowStore, class_id: i32) -> Result<Class, ApiError> {
    store.load_class(class_id).await?.ok_or_else(|| {
        ApiError::not_found(format!("Class {} does not exist", class_id), "/classes")
    })
}

/// Load an entry, treating one filed under a different class as missing
async fn find_entry(store: &ShowStore, class_id: i32, entry_id: i32) -> Result<Entry, ApiError> {
    match store.load_entry(entry_id).await? {
        Some(entry) if entry.class_id == class_id => Ok(entry),
        _ => Err(ApiError::not_found(
            format!("Entry {} does not exist", entry_id),
            format!("/classes/{}", class_id),
        )),
    }
}

fn parse_ids(class_id: &str, entry_id: &str) -> Result<(i32, i32), ApiError> {
    let class_id = parse_id(class_id, "class", "/classes")?;
    let entry_id = parse_id(entry_id, "entry", format!("/classes/{}", class_id).as_str())?;
    Ok((class_id, entry_id))
}

pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Path(class_id): Path<String>,
    uri: Uri,
    ValidJson(form): ValidJson<NewEntryForm>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    require_user(&state, &current, &uri)?;
    let class_id = parse_id(&class_id, "class", "/classes")?;
    let (horse_number, horse_name, rider_name) = form.validate()?;

    let store = store_for(&state, &current);
    find_class(&store, class_id).await?;
    if !store
        .create_entry(class_id, horse_number, &horse_name, &rider_name)
        .await?
    {
        return Err(ApiError::not_found(
            format!("Class {} does not exist", class_id),
            "/classes",
        ));
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "The entry has been created",
            "redirect": format!("/classes/{}", class_id)
        })),
    ))
}

pub async fn show_entry(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Path((class_id, entry_id)): Path<(String, String)>,
    uri: Uri,
) -> Result<Json<Value>, ApiError> {
    require_user(&state, &current, &uri)?;
    let (class_id, entry_id) = parse_ids(&class_id, &entry_id)?;

    let store = store_for(&state, &current);
    let class = find_class(&store, class_id).await?;
    let entry = find_entry(&store, class_id, entry_id).await?;

    Ok(Json(json!({
        "class": class,
        "entry": entry
    })))
}

pub async fn edit_entry(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Path((class_id, entry_id)): Path<(String, String)>,
    uri: Uri,
    ValidJson(form): ValidJson<EditEntryForm>,
) -> Result<Json<Value>, ApiError> {
    require_user(&state, &current, &uri)?;
    let (class_id, entry_id) = parse_ids(&class_id, &entry_id)?;
    let (horse_name, rider_name) = form.validate()?;

    let store = store_for(&state, &current);
    find_class(&store, class_id).await?;
    find_entry(&store, class_id, entry_id).await?;

    if !store.edit_entry(entry_id, &horse_name, &rider_name).await? {
        return Err(ApiError::not_found(
            format!("Entry {} does not exist", entry_id),
            format!("/classes/{}", class_id),
        ));
    }

    Ok(Json(json!({
        "message": "The entry has been modified",
        "redirect": format!("/classes/{}", class_id)
    })))
}

/// Scratch an entry from its class
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Path((class_id, entry_id)): Path<(String, String)>,
    uri: Uri,
) -> Result<Json<Value>, ApiError> {
    require_user(&state, &current, &uri)?;
    let (class_id, entry_id) = parse_ids(&class_id, &entry_id)?;

    let store = store_for(&state, &current);
    find_entry(&store, class_id, entry_id).await?;

    if !store.delete_entry(entry_id).await? {
        return Err(ApiError::not_found(
            format!("Entry {} does not exist", entry_id),
            format!("/classes/{}", class_id),
        ));
    }

    Ok(Json(json!({
        "message": "The entry has been scratched",
        "redirect": format!("/classes/{}", class_id)
    })))
}

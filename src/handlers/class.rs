use super::extractors::ValidJson;
use super::{parse_id, require_admin, store_for, ApiError};
use crate::models::{Class, ClassForm, Page, PageParams, Paginated};
use crate::session::CurrentSession;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    Extension, Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub async fn list_classes(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<Class>>, ApiError> {
    let page = Page::parse(params.page.as_deref())?;
    let store = store_for(&state, &current);

    let total = store.count_classes().await?;
    if !page.exists_within(total) {
        return Err(ApiError::not_found(
            format!("Page number {} does not exist", page.number()),
            "/classes",
        ));
    }

    let classes = store.sorted_classes(page.offset()).await?;
    Ok(Json(Paginated::new(classes, total, page)))
}

/// A class heading with one page of its entries
pub async fn show_class(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Path(class_id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<Value>, ApiError> {
    let class_id = parse_id(&class_id, "class", "/classes")?;
    let page = Page::parse(params.page.as_deref())?;
    let store = store_for(&state, &current);

    let Some(class_name) = store.class_name(class_id).await? else {
        return Err(ApiError::not_found(
            format!("Class {} does not exist", class_id),
            "/classes",
        ));
    };

    let total = store.count_entries(class_id).await?;
    if !page.exists_within(total) {
        return Err(ApiError::not_found(
            format!("Page number {} does not exist", page.number()),
            format!("/classes/{}", class_id),
        ));
    }

    let entries = store.load_entries(class_id, page.offset()).await?;
    Ok(Json(json!({
        "class_id": class_id,
        "class_name": class_name,
        "entries": Paginated::new(entries, total, page)
    })))
}

pub async fn add_class(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    uri: Uri,
    ValidJson(form): ValidJson<ClassForm>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    require_admin(&state, &current, &uri)?;
    let (name, prize_money) = form.validate()?;

    let store = store_for(&state, &current);
    if !store.add_class(&name, prize_money).await? {
        return Err(ApiError::Internal {
            message: "Unable to create class".to_string(),
        });
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "The class has been added",
            "redirect": "/classes"
        })),
    ))
}

pub async fn update_class(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Path(class_id): Path<String>,
    uri: Uri,
    ValidJson(form): ValidJson<ClassForm>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&state, &current, &uri)?;
    let class_id = parse_id(&class_id, "class", "/classes")?;
    let (name, prize_money) = form.validate()?;

    let store = store_for(&state, &current);
    if !store.update_class(class_id, &name, prize_money).await? {
        return Err(ApiError::not_found(
            format!("Class {} does not exist", class_id),
            "/classes",
        ));
    }

    Ok(Json(json!({
        "message": "The class has been updated",
        "redirect": "/classes"
    })))
}

pub async fn delete_class(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Path(class_id): Path<String>,
    uri: Uri,
) -> Result<Json<Value>, ApiError> {
    require_admin(&state, &current, &uri)?;
    let class_id = parse_id(&class_id, "class", "/classes")?;

    let store = store_for(&state, &current);
    if !store.delete_class(class_id).await? {
        return Err(ApiError::not_found(
            format!("Class {} does not exist", class_id),
            "/classes",
        ));
    }

    Ok(Json(json!({
        "message": "The class has been deleted",
        "redirect": "/classes"
    })))
}

use super::{
    calculator,
    db_ops::{self, DbModel, GetPropertyQuery, ListPropertyQuery},
    dto::{PropertyDto, PropertyPayload, RentRecordDto, RentRecordPayload},
    errors::{LedgerError, OrFail, ServerError},
    export, ledger,
    models::{AppState, Property},
};
use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Local;
use futures::try_join;
use serde_json::json;
use sqlx::PgPool;
use std::collections::BTreeMap;

pub async fn pong() -> impl IntoResponse {
    "pong"
}

pub async fn list_properties(
    State(AppState { db }): State<AppState>,
) -> Result<impl IntoResponse, ServerError> {
    let msg = "Failed to fetch properties";
    let mut conn = db.acquire().await.or_fail(msg)?;
    let properties = Property::list(&mut conn, &ListPropertyQuery)
        .await
        .or_fail(msg)?;

    Ok(Json(
        properties.iter().map(PropertyDto::from).collect::<Vec<_>>(),
    ))
}

pub async fn create_property(
    State(AppState { db }): State<AppState>,
    payload: Result<Json<PropertyPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
    let msg = "Failed to create property";
    let Json(payload) = payload.map_err(LedgerError::from).or_fail(msg)?;
    let fields = payload.validate().or_fail(msg)?;

    let mut tx = db.begin().await.or_fail(msg)?;
    let mut property =
        db_ops::create_property(&mut tx, fields).await.or_fail(msg)?;
    // A lease that started in the past gets its escalated rent right away.
    calculator::persist_derived_rent(&mut tx, &mut property, calculator::today())
        .await
        .or_fail(msg)?;
    tx.commit().await.or_fail(msg)?;
    tracing::info!(property_id = property.id, "created property");

    Ok((StatusCode::CREATED, Json(PropertyDto::from(&property))))
}

pub async fn update_property(
    State(AppState { db }): State<AppState>,
    Path(id): Path<i32>,
    payload: Result<Json<PropertyPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
    let msg = "Failed to update property";
    let mut tx = db.begin().await.or_fail(msg)?;
    let mut property = Property::get(&mut tx, &GetPropertyQuery { id })
        .await
        .or_fail(msg)?
        .ok_or(LedgerError::PropertyNotFound(id))
        .or_fail(msg)?;
    let Json(payload) = payload.map_err(LedgerError::from).or_fail(msg)?;
    property.replace_fields(payload.validate().or_fail(msg)?);

    let mut property = property.save(&mut tx).await.or_fail(msg)?;
    calculator::persist_derived_rent(&mut tx, &mut property, calculator::today())
        .await
        .or_fail(msg)?;
    tx.commit().await.or_fail(msg)?;
    tracing::info!(property_id = id, "updated property");

    Ok(Json(PropertyDto::from(&property)))
}

pub async fn delete_property(
    State(AppState { db }): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServerError> {
    let msg = "Failed to delete property";
    let mut tx = db.begin().await.or_fail(msg)?;
    let property = Property::get(&mut tx, &GetPropertyQuery { id })
        .await
        .or_fail(msg)?
        .ok_or(LedgerError::PropertyNotFound(id))
        .or_fail(msg)?;
    property.delete(&mut tx).await.or_fail(msg)?;
    tx.commit().await.or_fail(msg)?;
    tracing::info!(property_id = id, "deleted property and its rent records");

    Ok(Json(json!({ "message": "Property deleted successfully" })))
}

pub async fn list_rent_records(
    State(AppState { db }): State<AppState>,
) -> Result<impl IntoResponse, ServerError> {
    let msg = "Failed to fetch rent records";
    let mut conn = db.acquire().await.or_fail(msg)?;
    let records = ledger::db_ops::list_records(&mut conn).await.or_fail(msg)?;

    let grouped: BTreeMap<String, BTreeMap<String, RentRecordDto>> =
        ledger::group_by_month(&records)
            .into_iter()
            .map(|(key, by_property)| {
                let by_property = by_property
                    .into_iter()
                    .map(|(id, record)| (id, RentRecordDto::from(record)))
                    .collect();
                (key, by_property)
            })
            .collect();

    Ok(Json(grouped))
}

pub async fn upsert_rent_record(
    State(AppState { db }): State<AppState>,
    payload: Result<Json<RentRecordPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
    let msg = "Failed to update rent record";
    let Json(payload) = payload.map_err(LedgerError::from).or_fail(msg)?;
    let upsert = payload.validate().or_fail(msg)?;

    let mut tx = db.begin().await.or_fail(msg)?;
    let record = ledger::db_ops::upsert_record(&mut tx, &upsert)
        .await
        .or_fail(msg)?;
    tx.commit().await.or_fail(msg)?;
    tracing::info!(
        property_id = record.property_id,
        year = record.year,
        month = record.month.number(),
        status = record.status().label(),
        "saved rent record"
    );

    Ok(Json(RentRecordDto::from(&record)))
}

async fn load_properties(db: &PgPool) -> Result<Vec<Property>> {
    let mut conn = db.acquire().await?;
    Property::list(&mut conn, &ListPropertyQuery).await
}

async fn load_records(
    db: &PgPool,
) -> Result<Vec<ledger::models::RecordWithProperty>> {
    let mut conn = db.acquire().await?;
    ledger::db_ops::list_records_with_property(&mut conn).await
}

pub async fn export_excel(
    State(AppState { db }): State<AppState>,
) -> Result<impl IntoResponse, ServerError> {
    let msg = "Failed to export data";
    let (properties, records) =
        try_join!(load_properties(&db), load_records(&db)).or_fail(msg)?;
    let bytes = export::xlsx::render(&[
        export::sheet::properties_sheet(&properties),
        export::sheet::records_sheet(&records),
    ])
    .or_fail(msg)?;

    let filename = export::filename(Local::now().naive_local());
    let disposition =
        HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
            .or_fail(msg)?;
    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static(export::XLSX_MIME)),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    tracing::info!(
        properties = properties.len(),
        records = records.len(),
        %filename,
        "exported workbook"
    );

    Ok((headers, bytes))
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use uuid::Uuid;

use crate::adapter::driver::request_dto::{
    AddTableRequest, AvailabilityQueryParams, CancelReservationRequest, CreateReservationRequest,
    ReservationsQueryParams, UpdateReservationStatusRequest,
};
use crate::adapter::driver::response_dto::{
    AvailabilityResponse, ReservationResponse, TableOverviewResponse, TableResponse,
    TimeSlotResponse,
};
use crate::application::error::ApplicationError;
use crate::application::service::{
    CreateReservationCommand, ReservationApplicationService, ReservationQueryService,
    TableApplicationService,
};
use crate::domain::model::{
    CustomerId, ReservationId, ReservationStatus, RestaurantId, TableId, TableLocation,
};

#[derive(Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

/// キャンセル可否判定のレスポンスDTO
#[derive(Serialize, Deserialize)]
pub struct CancellationEligibilityResponse {
    pub can_cancel_or_modify: bool,
}

// アプリケーションサービスを含む状態
pub type AppState = AppStateInner;

#[derive(Clone)]
pub struct AppStateInner {
    pub reservation_service: Arc<ReservationApplicationService>,
    pub query_service: Arc<ReservationQueryService>,
    pub table_service: Arc<TableApplicationService>,
}

// REST APIルーターを作成
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/restaurants/:restaurant_id/availability",
            get(get_availability),
        )
        .route("/reservations", post(create_reservation))
        .route("/reservations/:reservation_id", get(get_reservation_by_id))
        .route(
            "/reservations/by-reference/:reference",
            get(get_reservation_by_reference),
        )
        .route(
            "/reservations/:reservation_id/can-cancel",
            get(get_cancellation_eligibility),
        )
        .route(
            "/reservations/:reservation_id/cancel",
            post(cancel_reservation),
        )
        .route(
            "/reservations/:reservation_id/status",
            put(update_reservation_status),
        )
        .route(
            "/customers/:customer_id/reservations",
            get(get_customer_reservations),
        )
        .route(
            "/restaurants/:restaurant_id/reservations",
            get(get_restaurant_reservations),
        )
        .route("/restaurants/:restaurant_id/tables", get(get_tables))
        .route("/restaurants/:restaurant_id/tables", post(add_table))
        .route("/tables/:table_id", delete(remove_table))
}

// ヘルスチェックエンドポイント
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "restaurant-reservation-management",
        "version": "0.1.0"
    }))
}

// 空き照会エンドポイント
async fn get_availability(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
    query: Result<Query<AvailabilityQueryParams>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<AvailabilityResponse>, (StatusCode, Json<ApiError>)> {
    let Query(params) = query.map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "無効なクエリパラメータです".to_string(),
                code: "INVALID_PARAMETER".to_string(),
            }),
        )
    })?;

    let restaurant_id = RestaurantId::from_uuid(restaurant_id);
    match state
        .reservation_service
        .get_available_slots(restaurant_id, params.date, params.party_size)
        .await
    {
        Ok(slots) => Ok(Json(AvailabilityResponse {
            restaurant_id: restaurant_id.to_string(),
            date: params.date.format("%Y-%m-%d").to_string(),
            party_size: params.party_size,
            slots: slots.iter().map(TimeSlotResponse::from_time_slot).collect(),
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// 予約作成エンドポイント
async fn create_reservation(
    State(state): State<AppState>,
    Json(request): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>), (StatusCode, Json<ApiError>)> {
    let preferred_location = match request.preferred_location {
        Some(location_str) => match TableLocation::from_string(&location_str) {
            Ok(location) => Some(location),
            Err(_) => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ApiError {
                        error: format!("無効なテーブル設置場所: {}", location_str),
                        code: "INVALID_LOCATION".to_string(),
                    }),
                ))
            }
        },
        None => None,
    };

    let command = CreateReservationCommand {
        restaurant_id: RestaurantId::from_uuid(request.restaurant_id),
        customer_id: CustomerId::from_uuid(request.customer_id),
        date: request.date,
        time: request.time,
        number_of_guests: request.number_of_guests,
        preferred_location,
        occasion_id: request.occasion_id,
        special_requests: request.special_requests,
    };

    match state.reservation_service.create_reservation(command).await {
        Ok(reservation) => Ok((
            StatusCode::CREATED,
            Json(ReservationResponse::from_reservation(&reservation)),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// 予約詳細取得エンドポイント
async fn get_reservation_by_id(
    State(state): State<AppState>,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, (StatusCode, Json<ApiError>)> {
    let reservation_id = ReservationId::from_uuid(reservation_id);

    match state.query_service.get_by_id(reservation_id).await {
        Ok(reservation) => Ok(Json(ReservationResponse::from_reservation(&reservation))),
        Err(err) => Err(map_application_error(err)),
    }
}

// 予約番号での予約取得エンドポイント
async fn get_reservation_by_reference(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<ReservationResponse>, (StatusCode, Json<ApiError>)> {
    match state.query_service.get_by_reference(&reference).await {
        Ok(reservation) => Ok(Json(ReservationResponse::from_reservation(&reservation))),
        Err(err) => Err(map_application_error(err)),
    }
}

// キャンセル可否判定エンドポイント
async fn get_cancellation_eligibility(
    State(state): State<AppState>,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<CancellationEligibilityResponse>, (StatusCode, Json<ApiError>)> {
    let reservation_id = ReservationId::from_uuid(reservation_id);

    match state
        .reservation_service
        .can_cancel_or_modify(reservation_id)
        .await
    {
        Ok(allowed) => Ok(Json(CancellationEligibilityResponse {
            can_cancel_or_modify: allowed,
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// 予約キャンセルエンドポイント
// 存在しない予約は404、ポリシー違反（リードタイム不足など）は409で返す
async fn cancel_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<Uuid>,
    Json(request): Json<CancelReservationRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let reservation_id = ReservationId::from_uuid(reservation_id);
    let reason = request
        .reason
        .unwrap_or_else(|| "お客様都合".to_string());

    // アプリケーション層のキャンセルはポリシー違反も不在もOk(false)で返すため、
    // ここで存在確認してから呼び出し、残るOk(false)をポリシー違反として扱う
    if let Err(err) = state.query_service.get_by_id(reservation_id).await {
        return Err(map_application_error(err));
    }

    match state
        .reservation_service
        .cancel_reservation(reservation_id, reason)
        .await
    {
        Ok(true) => Ok(StatusCode::OK),
        Ok(false) => Err((
            StatusCode::CONFLICT,
            Json(ApiError {
                error: "キャンセルポリシーの期限を過ぎているためキャンセルできません"
                    .to_string(),
                code: "CANCELLATION_WINDOW_PASSED".to_string(),
            }),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// 予約ステータス変更エンドポイント
async fn update_reservation_status(
    State(state): State<AppState>,
    Path(reservation_id): Path<Uuid>,
    Json(request): Json<UpdateReservationStatusRequest>,
) -> Result<Json<ReservationResponse>, (StatusCode, Json<ApiError>)> {
    let reservation_id = ReservationId::from_uuid(reservation_id);
    let new_status = match ReservationStatus::from_string(&request.status) {
        Ok(status) => status,
        Err(_) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ApiError {
                    error: format!("無効なステータス値: {}", request.status),
                    code: "INVALID_STATUS".to_string(),
                }),
            ))
        }
    };

    match state
        .reservation_service
        .update_reservation_status(reservation_id, new_status)
        .await
    {
        Ok(reservation) => Ok(Json(ReservationResponse::from_reservation(&reservation))),
        Err(err) => Err(map_application_error(err)),
    }
}

// 顧客の予約履歴取得エンドポイント
async fn get_customer_reservations(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<Vec<ReservationResponse>>, (StatusCode, Json<ApiError>)> {
    let customer_id = CustomerId::from_uuid(customer_id);

    match state
        .query_service
        .get_customer_reservations(customer_id)
        .await
    {
        Ok(reservations) => Ok(Json(
            reservations
                .iter()
                .map(ReservationResponse::from_reservation)
                .collect(),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// レストランの予約一覧取得エンドポイント
async fn get_restaurant_reservations(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
    query: Result<Query<ReservationsQueryParams>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<Vec<ReservationResponse>>, (StatusCode, Json<ApiError>)> {
    let Query(params) = query.map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "無効なクエリパラメータです".to_string(),
                code: "INVALID_PARAMETER".to_string(),
            }),
        )
    })?;

    let status = match params.status {
        Some(status_str) => match ReservationStatus::from_string(&status_str) {
            Ok(status) => Some(status),
            Err(_) => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ApiError {
                        error: format!("無効なステータス値: {}", status_str),
                        code: "INVALID_STATUS".to_string(),
                    }),
                ))
            }
        },
        None => None,
    };

    let restaurant_id = RestaurantId::from_uuid(restaurant_id);
    match state
        .query_service
        .get_restaurant_reservations(restaurant_id, params.date, status)
        .await
    {
        Ok(reservations) => Ok(Json(
            reservations
                .iter()
                .map(ReservationResponse::from_reservation)
                .collect(),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// テーブル一覧取得エンドポイント
async fn get_tables(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
) -> Result<Json<Vec<TableOverviewResponse>>, (StatusCode, Json<ApiError>)> {
    let restaurant_id = RestaurantId::from_uuid(restaurant_id);

    match state.table_service.list_tables(restaurant_id).await {
        Ok(overviews) => Ok(Json(
            overviews
                .iter()
                .map(TableOverviewResponse::from_overview)
                .collect(),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// テーブル追加エンドポイント
async fn add_table(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
    Json(request): Json<AddTableRequest>,
) -> Result<(StatusCode, Json<TableResponse>), (StatusCode, Json<ApiError>)> {
    let location = match TableLocation::from_string(&request.location) {
        Ok(location) => location,
        Err(_) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ApiError {
                    error: format!("無効なテーブル設置場所: {}", request.location),
                    code: "INVALID_LOCATION".to_string(),
                }),
            ))
        }
    };

    let restaurant_id = RestaurantId::from_uuid(restaurant_id);
    match state
        .table_service
        .add_table(
            restaurant_id,
            request.table_number,
            request.seating_capacity,
            location,
        )
        .await
    {
        Ok(table) => Ok((
            StatusCode::CREATED,
            Json(TableResponse::from_table(&table)),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// テーブル削除エンドポイント
// 今日以降に有効な予約があるテーブルは削除できない
async fn remove_table(
    State(state): State<AppState>,
    Path(table_id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let table_id = TableId::from_uuid(table_id);

    match state.table_service.remove_table(table_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(err) => Err(map_application_error(err)),
    }
}

// アプリケーションエラーをHTTPエラーにマッピング
fn map_application_error(err: ApplicationError) -> (StatusCode, Json<ApiError>) {
    match err {
        ApplicationError::DomainError(domain_err) => map_domain_error(domain_err),
        ApplicationError::RepositoryError(repo_err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: format!("{}", repo_err),
                code: "REPOSITORY_ERROR".to_string(),
            }),
        ),
        ApplicationError::EventPublishingFailed(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: msg,
                code: "PUBLISHER_ERROR".to_string(),
            }),
        ),
        ApplicationError::NotFound(msg) => (
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: msg,
                code: "NOT_FOUND".to_string(),
            }),
        ),
    }
}

// ドメインエラーを適切なHTTPステータスコードとエラーコードにマッピング
fn map_domain_error(
    domain_err: crate::domain::error::DomainError,
) -> (StatusCode, Json<ApiError>) {
    use crate::domain::error::DomainError;

    match domain_err {
        DomainError::InvalidOpeningHours(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: msg,
                code: "INVALID_OPENING_HOURS".to_string(),
            }),
        ),
        DomainError::InvalidPartySize => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "無効な人数です".to_string(),
                code: "INVALID_PARTY_SIZE".to_string(),
            }),
        ),
        DomainError::InvalidReservationState(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: msg,
                code: "INVALID_RESERVATION_STATE".to_string(),
            }),
        ),
        DomainError::InvalidBookingReference(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: msg,
                code: "INVALID_BOOKING_REFERENCE".to_string(),
            }),
        ),
        DomainError::NoTableAvailable => (
            StatusCode::CONFLICT,
            Json(ApiError {
                error: "ご指定の日時・人数では満席です".to_string(),
                code: "FULLY_BOOKED".to_string(),
            }),
        ),
        DomainError::TableHasActiveReservations => (
            StatusCode::CONFLICT,
            Json(ApiError {
                error: "有効な予約があるテーブルは削除できません".to_string(),
                code: "TABLE_IN_USE".to_string(),
            }),
        ),
        DomainError::InvalidValue(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: msg,
                code: "INVALID_VALUE".to_string(),
            }),
        ),
        DomainError::RepositoryError(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: msg,
                code: "REPOSITORY_ERROR".to_string(),
            }),
        ),
    }
}

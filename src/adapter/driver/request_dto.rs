use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 予約作成用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct CreateReservationRequest {
    pub restaurant_id: Uuid,
    pub customer_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub number_of_guests: u32,
    pub preferred_location: Option<String>,
    pub occasion_id: Option<Uuid>,
    pub special_requests: Option<String>,
}

/// 予約キャンセル用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct CancelReservationRequest {
    pub reason: Option<String>,
}

/// 予約ステータス変更用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct UpdateReservationStatusRequest {
    pub status: String,
}

/// テーブル追加用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct AddTableRequest {
    pub table_number: u32,
    pub seating_capacity: u32,
    pub location: String,
}

/// 空き照会用のクエリパラメータ
#[derive(Deserialize)]
pub struct AvailabilityQueryParams {
    pub date: NaiveDate,
    pub party_size: u32,
}

/// 予約一覧取得用のクエリパラメータ
#[derive(Deserialize)]
pub struct ReservationsQueryParams {
    pub date: Option<NaiveDate>,
    pub status: Option<String>,
}

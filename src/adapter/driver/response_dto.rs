use crate::application::service::TableOverview;
use crate::domain::model::{Reservation, Table, TimeSlot};
use serde::Serialize;

/// 空き時間枠用のレスポンスDTO
#[derive(Serialize)]
pub struct TimeSlotResponse {
    pub time: String,
    pub is_available: bool,
    pub available_table_count: u32,
}

/// 空き照会結果用のレスポンスDTO
#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub restaurant_id: String,
    pub date: String,
    pub party_size: u32,
    pub slots: Vec<TimeSlotResponse>,
}

/// 予約詳細用のレスポンスDTO
#[derive(Serialize)]
pub struct ReservationResponse {
    pub reservation_id: String,
    pub booking_reference: String,
    pub restaurant_id: String,
    pub table_id: String,
    pub customer_id: String,
    pub date: String,
    pub time: String,
    pub start_time: String,
    pub end_time: String,
    pub number_of_guests: u32,
    pub status: String,
    pub preferred_location: Option<String>,
    pub special_requests: Option<String>,
    pub cancelled_at: Option<String>,
    pub cancellation_reason: Option<String>,
}

/// テーブル用のレスポンスDTO
#[derive(Serialize)]
pub struct TableResponse {
    pub table_id: String,
    pub restaurant_id: String,
    pub table_number: u32,
    pub seating_capacity: u32,
    pub location: String,
    pub is_available: bool,
}

/// テーブル一覧1行分のレスポンスDTO（今日以降の有効予約件数つき）
#[derive(Serialize)]
pub struct TableOverviewResponse {
    #[serde(flatten)]
    pub table: TableResponse,
    pub active_reservations: u64,
}

impl TimeSlotResponse {
    /// ドメインオブジェクトからTimeSlotResponseを作成
    pub fn from_time_slot(slot: &TimeSlot) -> Self {
        Self {
            time: slot.time.format("%H:%M").to_string(),
            is_available: slot.is_available,
            available_table_count: slot.available_table_count,
        }
    }
}

impl ReservationResponse {
    /// ドメインオブジェクトからReservationResponseを作成
    pub fn from_reservation(reservation: &Reservation) -> Self {
        Self {
            reservation_id: reservation.id().to_string(),
            booking_reference: reservation.booking_reference().to_string(),
            restaurant_id: reservation.restaurant_id().to_string(),
            table_id: reservation.table_id().to_string(),
            customer_id: reservation.customer_id().to_string(),
            date: reservation.reservation_date().format("%Y-%m-%d").to_string(),
            time: reservation.reservation_time().format("%H:%M").to_string(),
            start_time: reservation.span().start().to_rfc3339(),
            end_time: reservation.span().end().to_rfc3339(),
            number_of_guests: reservation.number_of_guests(),
            status: reservation.status().to_string(),
            preferred_location: reservation.preferred_location().map(|l| l.to_string()),
            special_requests: reservation.special_requests().map(String::from),
            cancelled_at: reservation.cancelled_at().map(|t| t.to_rfc3339()),
            cancellation_reason: reservation.cancellation_reason().map(String::from),
        }
    }
}

impl TableResponse {
    /// ドメインオブジェクトからTableResponseを作成
    pub fn from_table(table: &Table) -> Self {
        Self {
            table_id: table.id().to_string(),
            restaurant_id: table.restaurant_id().to_string(),
            table_number: table.table_number(),
            seating_capacity: table.seating_capacity(),
            location: table.location().to_string(),
            is_available: table.is_available(),
        }
    }
}

impl TableOverviewResponse {
    /// アプリケーション層のTableOverviewからレスポンスを作成
    pub fn from_overview(overview: &TableOverview) -> Self {
        Self {
            table: TableResponse::from_table(&overview.table),
            active_reservations: overview.active_reservations,
        }
    }
}

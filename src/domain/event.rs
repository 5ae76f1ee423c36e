use crate::domain::model::{
    BookingReference, CustomerId, ReservationId, RestaurantId, TableId, TimeSpan,
};
use chrono::{DateTime, Utc};

/// ドメインイベント列挙型
/// 予約確定・キャンセルの後続処理（通知配信など）は
/// このイベントを購読する外部コラボレーターの責務
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// 予約が確定された
    ReservationConfirmed(ReservationConfirmed),
    /// 予約がキャンセルされた
    ReservationCancelled(ReservationCancelled),
}

/// 予約確定イベント
#[derive(Debug, Clone)]
pub struct ReservationConfirmed {
    /// 予約ID
    pub reservation_id: ReservationId,
    /// 予約番号
    pub booking_reference: BookingReference,
    /// レストランID
    pub restaurant_id: RestaurantId,
    /// 割り当てられたテーブルID
    pub table_id: TableId,
    /// 顧客ID
    pub customer_id: CustomerId,
    /// テーブルを占有する時間区間
    pub span: TimeSpan,
    /// 人数
    pub number_of_guests: u32,
    /// イベント発生日時
    pub occurred_at: DateTime<Utc>,
}

impl ReservationConfirmed {
    /// 新しい予約確定イベントを作成
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reservation_id: ReservationId,
        booking_reference: BookingReference,
        restaurant_id: RestaurantId,
        table_id: TableId,
        customer_id: CustomerId,
        span: TimeSpan,
        number_of_guests: u32,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            reservation_id,
            booking_reference,
            restaurant_id,
            table_id,
            customer_id,
            span,
            number_of_guests,
            occurred_at,
        }
    }
}

/// 予約キャンセルイベント
#[derive(Debug, Clone)]
pub struct ReservationCancelled {
    /// 予約ID
    pub reservation_id: ReservationId,
    /// 予約番号
    pub booking_reference: BookingReference,
    /// レストランID
    pub restaurant_id: RestaurantId,
    /// キャンセル理由
    pub reason: String,
    /// イベント発生日時
    pub occurred_at: DateTime<Utc>,
}

impl ReservationCancelled {
    /// 新しい予約キャンセルイベントを作成
    pub fn new(
        reservation_id: ReservationId,
        booking_reference: BookingReference,
        restaurant_id: RestaurantId,
        reason: String,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            reservation_id,
            booking_reference,
            restaurant_id,
            reason,
            occurred_at,
        }
    }
}

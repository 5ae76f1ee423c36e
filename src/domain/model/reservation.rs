use crate::domain::error::DomainError;
use crate::domain::event::{DomainEvent, ReservationCancelled, ReservationConfirmed};
use crate::domain::model::{
    BookingReference, CustomerId, ReservationId, ReservationStatus, RestaurantId, TableId,
    TableLocation, TimeSpan,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

/// Reservation集約
/// 予約のライフサイクルを管理し、テーブル占有区間の整合性を保つ
#[derive(Debug, Clone)]
pub struct Reservation {
    id: ReservationId,
    booking_reference: BookingReference,
    restaurant_id: RestaurantId,
    table_id: TableId,
    customer_id: CustomerId,
    reservation_date: NaiveDate,
    reservation_time: NaiveTime,
    span: TimeSpan,
    number_of_guests: u32,
    status: ReservationStatus,
    preferred_location: Option<TableLocation>,
    occasion_id: Option<Uuid>,
    special_requests: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    cancellation_reason: Option<String>,
    domain_events: Vec<DomainEvent>,
}

impl Reservation {
    /// 割当エンジンによって新しい予約を作成
    /// 初期ステータスはConfirmed（テーブル割当済みの状態でのみ生成される）
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ReservationId,
        booking_reference: BookingReference,
        restaurant_id: RestaurantId,
        table_id: TableId,
        customer_id: CustomerId,
        reservation_date: NaiveDate,
        reservation_time: NaiveTime,
        span: TimeSpan,
        number_of_guests: u32,
        preferred_location: Option<TableLocation>,
        occasion_id: Option<Uuid>,
        special_requests: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        // 人数のバリデーション（1以上）
        if number_of_guests == 0 {
            return Err(DomainError::InvalidPartySize);
        }

        let mut reservation = Self {
            id,
            booking_reference: booking_reference.clone(),
            restaurant_id,
            table_id,
            customer_id,
            reservation_date,
            reservation_time,
            span,
            number_of_guests,
            status: ReservationStatus::Confirmed,
            preferred_location,
            occasion_id,
            special_requests,
            created_at,
            updated_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            domain_events: Vec::new(),
        };

        // ReservationConfirmedイベントを生成
        let event = ReservationConfirmed::new(
            id,
            booking_reference,
            restaurant_id,
            table_id,
            customer_id,
            span,
            number_of_guests,
            created_at,
        );
        reservation
            .domain_events
            .push(DomainEvent::ReservationConfirmed(event));

        Ok(reservation)
    }

    /// データベースから取得したデータで予約を再構築
    /// リポジトリでの使用を想定（イベントは発生させない）
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: ReservationId,
        booking_reference: BookingReference,
        restaurant_id: RestaurantId,
        table_id: TableId,
        customer_id: CustomerId,
        reservation_date: NaiveDate,
        reservation_time: NaiveTime,
        span: TimeSpan,
        number_of_guests: u32,
        status: ReservationStatus,
        preferred_location: Option<TableLocation>,
        occasion_id: Option<Uuid>,
        special_requests: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
        cancelled_at: Option<DateTime<Utc>>,
        cancellation_reason: Option<String>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id,
            booking_reference,
            restaurant_id,
            table_id,
            customer_id,
            reservation_date,
            reservation_time,
            span,
            number_of_guests,
            status,
            preferred_location,
            occasion_id,
            special_requests,
            created_at,
            updated_at,
            cancelled_at,
            cancellation_reason,
            domain_events: Vec::new(),
        })
    }

    /// 予約IDを取得
    pub fn id(&self) -> ReservationId {
        self.id
    }

    /// 予約番号を取得
    pub fn booking_reference(&self) -> &BookingReference {
        &self.booking_reference
    }

    /// レストランIDを取得
    pub fn restaurant_id(&self) -> RestaurantId {
        self.restaurant_id
    }

    /// 割り当てられたテーブルIDを取得
    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    /// 顧客IDを取得
    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// 予約日を取得
    pub fn reservation_date(&self) -> NaiveDate {
        self.reservation_date
    }

    /// 予約時刻（壁時計時刻）を取得
    pub fn reservation_time(&self) -> NaiveTime {
        self.reservation_time
    }

    /// テーブルを占有する時間区間を取得
    pub fn span(&self) -> TimeSpan {
        self.span
    }

    /// 人数を取得
    pub fn number_of_guests(&self) -> u32 {
        self.number_of_guests
    }

    /// 予約ステータスを取得
    pub fn status(&self) -> ReservationStatus {
        self.status
    }

    /// 希望テーブル設置場所を取得
    pub fn preferred_location(&self) -> Option<TableLocation> {
        self.preferred_location
    }

    /// 記念日・オケージョンIDを取得
    pub fn occasion_id(&self) -> Option<Uuid> {
        self.occasion_id
    }

    /// 特記事項を取得
    pub fn special_requests(&self) -> Option<&str> {
        self.special_requests.as_deref()
    }

    /// 作成日時を取得
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 更新日時を取得
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// キャンセル日時を取得
    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }

    /// キャンセル理由を取得
    pub fn cancellation_reason(&self) -> Option<&str> {
        self.cancellation_reason.as_deref()
    }

    /// ドメインイベントを取得してクリア
    pub fn take_domain_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.domain_events)
    }

    /// この予約が指定区間と重複するテーブル占有を持つかどうか
    /// キャンセル済みの予約はテーブルを占有しない
    pub fn occupies(&self, span: &TimeSpan) -> bool {
        self.status.occupies_table() && self.span.overlaps(span)
    }

    /// キャンセルポリシーの範囲内かどうか
    /// 開始時刻までの残り時間がポリシーのリードタイム以上なら許可
    pub fn within_cancellation_window(&self, policy_hours: i64, now: DateTime<Utc>) -> bool {
        self.span.start() - now >= Duration::hours(policy_hours)
    }

    /// キャンセル・変更が可能かどうか
    /// ルール: ステータスがCancelled以外、かつポリシー時間内
    pub fn can_cancel_or_modify(&self, policy_hours: i64, now: DateTime<Utc>) -> bool {
        self.status != ReservationStatus::Cancelled
            && self.within_cancellation_window(policy_hours, now)
    }

    /// 予約をキャンセル
    /// 事前条件: ステータスがCancelled以外
    /// ポリシー時間の判定は呼び出し側（アプリケーションサービス）が行う
    pub fn cancel(&mut self, reason: String, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status == ReservationStatus::Cancelled {
            return Err(DomainError::InvalidReservationState(
                "既にキャンセル済みの予約です".to_string(),
            ));
        }

        self.status = ReservationStatus::Cancelled;
        self.cancellation_reason = Some(reason.clone());
        self.cancelled_at = Some(now);
        self.updated_at = Some(now);

        // ReservationCancelledイベントを生成
        let event = ReservationCancelled::new(
            self.id,
            self.booking_reference.clone(),
            self.restaurant_id,
            reason,
            now,
        );
        self.domain_events
            .push(DomainEvent::ReservationCancelled(event));

        Ok(())
    }

    /// 予約ステータスを遷移させる（店舗スタッフの操作）
    /// 許可される遷移:
    /// - Pending | Confirmed → Seated
    /// - Seated → Completed
    /// - Pending | Confirmed → NoShow
    /// キャンセルはcancel()経由でのみ行う
    pub fn change_status(
        &mut self,
        new_status: ReservationStatus,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let allowed = matches!(
            (self.status, new_status),
            (
                ReservationStatus::Pending | ReservationStatus::Confirmed,
                ReservationStatus::Seated
            ) | (ReservationStatus::Seated, ReservationStatus::Completed)
                | (
                    ReservationStatus::Pending | ReservationStatus::Confirmed,
                    ReservationStatus::NoShow
                )
        );

        if !allowed {
            return Err(DomainError::InvalidReservationState(format!(
                "{}から{}への遷移は許可されていません",
                self.status, new_status
            )));
        }

        self.status = new_status;
        self.updated_at = Some(now);
        Ok(())
    }
}

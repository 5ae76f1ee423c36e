use crate::application::error::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::model::{
    CustomerId, Reservation, ReservationId, ReservationStatus, RestaurantId, TableLocation,
    TimeSlot, TimeSpan,
};
use crate::domain::port::{
    Clock, EventPublisher, Logger, RepositoryError, ReservationRepository, RestaurantRepository,
    TableRepository,
};
use crate::domain::service::{
    booked_table_ids, AvailabilityService, BookingReferenceService, TableAllocator,
};
use chrono::{NaiveDate, NaiveTime};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// 予約作成コマンド
#[derive(Debug, Clone)]
pub struct CreateReservationCommand {
    pub restaurant_id: RestaurantId,
    pub customer_id: CustomerId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub number_of_guests: u32,
    pub preferred_location: Option<TableLocation>,
    pub occasion_id: Option<Uuid>,
    pub special_requests: Option<String>,
}

/// 予約のアプリケーションサービス
/// 空き照会・予約作成・キャンセル・ステータス変更のユースケースを調整する
pub struct ReservationApplicationService {
    restaurant_repository: Arc<dyn RestaurantRepository>,
    table_repository: Arc<dyn TableRepository>,
    reservation_repository: Arc<dyn ReservationRepository>,
    event_publisher: Arc<dyn EventPublisher>,
    logger: Arc<dyn Logger>,
    clock: Arc<dyn Clock>,
    availability_service: AvailabilityService,
    table_allocator: TableAllocator,
    reference_service: BookingReferenceService<dyn ReservationRepository>,
}

impl ReservationApplicationService {
    pub fn new(
        restaurant_repository: Arc<dyn RestaurantRepository>,
        table_repository: Arc<dyn TableRepository>,
        reservation_repository: Arc<dyn ReservationRepository>,
        event_publisher: Arc<dyn EventPublisher>,
        logger: Arc<dyn Logger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let reference_service = BookingReferenceService::new(reservation_repository.clone());
        Self {
            restaurant_repository,
            table_repository,
            reservation_repository,
            event_publisher,
            logger,
            clock,
            availability_service: AvailabilityService::new(),
            table_allocator: TableAllocator::new(),
            reference_service,
        }
    }

    /// 指定日・指定人数の空き時間枠を取得する
    /// 毎回台帳から再計算する（キャッシュしない）
    pub async fn get_available_slots(
        &self,
        restaurant_id: RestaurantId,
        date: NaiveDate,
        party_size: u32,
    ) -> Result<Vec<TimeSlot>, ApplicationError> {
        let config = self
            .restaurant_repository
            .find_by_id(restaurant_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("レストランが見つかりません: {}", restaurant_id))
            })?;

        let tables = self.table_repository.find_by_restaurant(restaurant_id).await?;
        let reservations = self
            .reservation_repository
            .find_active_by_restaurant_and_date(restaurant_id, date)
            .await?;

        let slots = self.availability_service.compute_available_slots(
            &config,
            &tables,
            &reservations,
            date,
            party_size,
        )?;
        Ok(slots)
    }

    /// 予約を作成する
    /// 呼び出し元から渡された空き情報は信用せず、台帳から再検証して割り当てる
    pub async fn create_reservation(
        &self,
        command: CreateReservationCommand,
    ) -> Result<Reservation, ApplicationError> {
        let config = self
            .restaurant_repository
            .find_by_id(command.restaurant_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!(
                    "レストランが見つかりません: {}",
                    command.restaurant_id
                ))
            })?;

        if command.number_of_guests == 0 {
            return Err(DomainError::InvalidPartySize.into());
        }

        // 時間区間をサーバ側で再計算する
        // 深夜営業で日付をまたぐ枠は開始時刻が翌日に繰り上がる（帳簿上の日付は指定日のまま）
        let start = config.reservation_start(command.date, command.time);
        let span = TimeSpan::new(start, start + config.booking_duration())?;

        let tables = self
            .table_repository
            .find_by_restaurant(command.restaurant_id)
            .await?;

        // 挿入時の競合（Conflict）は楽観的に1回だけ再試行する
        let mut attempts = 0;
        loop {
            let reservations = self
                .reservation_repository
                .find_active_by_restaurant_and_date(command.restaurant_id, command.date)
                .await?;
            let booked = booked_table_ids(&reservations, &span);

            let table = self
                .table_allocator
                .select_table(
                    &tables,
                    &booked,
                    command.number_of_guests,
                    command.preferred_location,
                )
                .ok_or(DomainError::NoTableAvailable)?;

            let now = self.clock.now();
            let reference = self.reference_service.generate(now.date_naive()).await?;

            let mut reservation = Reservation::new(
                self.reservation_repository.next_identity(),
                reference,
                command.restaurant_id,
                table.id(),
                command.customer_id,
                command.date,
                command.time,
                span,
                command.number_of_guests,
                command.preferred_location,
                command.occasion_id,
                command.special_requests.clone(),
                now,
            )?;

            match self.reservation_repository.insert(&reservation).await {
                Ok(()) => {
                    self.log_reservation(
                        "ReservationApplicationService",
                        "予約を作成しました",
                        &reservation,
                    );
                    self.publish_events(&mut reservation).await;
                    return Ok(reservation);
                }
                Err(RepositoryError::Conflict(_)) if attempts == 0 => {
                    // 別リクエストに先を越された。台帳を読み直して再割当する
                    attempts += 1;
                    self.logger.warn(
                        "ReservationApplicationService",
                        "予約挿入で競合を検出したため再割当します",
                    );
                }
                Err(RepositoryError::Conflict(_)) => {
                    return Err(DomainError::NoTableAvailable.into());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// キャンセル・変更が可能かどうかを判定する
    /// 台帳の状態を変更しない読み取り専用の判定
    pub async fn can_cancel_or_modify(
        &self,
        reservation_id: ReservationId,
    ) -> Result<bool, ApplicationError> {
        let reservation = match self.reservation_repository.find_by_id(reservation_id).await? {
            Some(reservation) => reservation,
            None => return Ok(false),
        };
        let config = match self
            .restaurant_repository
            .find_by_id(reservation.restaurant_id())
            .await?
        {
            Some(config) => config,
            None => return Ok(false),
        };

        Ok(reservation.can_cancel_or_modify(config.cancellation_policy_hours(), self.clock.now()))
    }

    /// 予約をキャンセルする
    /// ポリシー違反・予約未存在は例外ではなくOk(false)で返す（ソフトフェイル）
    pub async fn cancel_reservation(
        &self,
        reservation_id: ReservationId,
        reason: String,
    ) -> Result<bool, ApplicationError> {
        let mut reservation = match self.reservation_repository.find_by_id(reservation_id).await? {
            Some(reservation) => reservation,
            None => return Ok(false),
        };
        let config = match self
            .restaurant_repository
            .find_by_id(reservation.restaurant_id())
            .await?
        {
            Some(config) => config,
            None => return Ok(false),
        };

        let now = self.clock.now();
        if !reservation.can_cancel_or_modify(config.cancellation_policy_hours(), now) {
            self.logger.info(
                "ReservationApplicationService",
                &format!(
                    "キャンセルポリシーにより拒否されました: {} (リードタイム{}時間)",
                    reservation.booking_reference(),
                    config.cancellation_policy_hours()
                ),
            );
            return Ok(false);
        }

        reservation.cancel(reason, now)?;
        self.reservation_repository.save(&reservation).await?;
        self.log_reservation(
            "ReservationApplicationService",
            "予約をキャンセルしました",
            &reservation,
        );
        self.publish_events(&mut reservation).await;
        Ok(true)
    }

    /// 予約ステータスを変更する（店舗スタッフの操作）
    pub async fn update_reservation_status(
        &self,
        reservation_id: ReservationId,
        new_status: ReservationStatus,
    ) -> Result<Reservation, ApplicationError> {
        let mut reservation = self
            .reservation_repository
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("予約が見つかりません: {}", reservation_id))
            })?;

        reservation.change_status(new_status, self.clock.now())?;
        self.reservation_repository.save(&reservation).await?;
        self.log_reservation(
            "ReservationApplicationService",
            "予約ステータスを変更しました",
            &reservation,
        );
        Ok(reservation)
    }

    /// 集約が保持するドメインイベントを発行する
    /// 発行失敗は業務処理を失敗させない（ログに残すのみ）
    async fn publish_events(&self, reservation: &mut Reservation) {
        for event in reservation.take_domain_events() {
            if let Err(e) = self.event_publisher.publish(&event).await {
                self.logger.error(
                    "ReservationApplicationService",
                    &format!("イベント発行に失敗しました: {}", e),
                );
            }
        }
    }

    fn log_reservation(&self, component: &str, message: &str, reservation: &Reservation) {
        let mut context = HashMap::new();
        context.insert(
            "booking_reference".to_string(),
            reservation.booking_reference().to_string(),
        );
        context.insert("status".to_string(), reservation.status().to_string());
        self.logger.log(
            crate::domain::port::LogLevel::Info,
            component,
            message,
            Some(reservation.id().as_uuid()),
            Some(context),
        );
    }
}

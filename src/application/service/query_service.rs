use crate::application::error::ApplicationError;
use crate::domain::model::{
    CustomerId, Reservation, ReservationId, ReservationStatus, RestaurantId,
};
use crate::domain::port::ReservationRepository;
use chrono::NaiveDate;
use std::sync::Arc;

/// 予約照会サービス
/// 台帳の読み取り専用ビューを提供する
pub struct ReservationQueryService {
    reservation_repository: Arc<dyn ReservationRepository>,
}

impl ReservationQueryService {
    pub fn new(reservation_repository: Arc<dyn ReservationRepository>) -> Self {
        Self {
            reservation_repository,
        }
    }

    /// IDで予約を取得
    pub async fn get_by_id(
        &self,
        reservation_id: ReservationId,
    ) -> Result<Reservation, ApplicationError> {
        self.reservation_repository
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("予約が見つかりません: {}", reservation_id))
            })
    }

    /// 予約番号で予約を取得
    pub async fn get_by_reference(
        &self,
        reference: &str,
    ) -> Result<Reservation, ApplicationError> {
        self.reservation_repository
            .find_by_reference(reference)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("予約が見つかりません: {}", reference))
            })
    }

    /// 顧客の予約履歴を取得（予約日・時刻の降順）
    pub async fn get_customer_reservations(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Reservation>, ApplicationError> {
        Ok(self
            .reservation_repository
            .find_by_customer(customer_id)
            .await?)
    }

    /// レストランの予約一覧を取得（日付・ステータスで任意に絞り込み）
    pub async fn get_restaurant_reservations(
        &self,
        restaurant_id: RestaurantId,
        date: Option<NaiveDate>,
        status: Option<ReservationStatus>,
    ) -> Result<Vec<Reservation>, ApplicationError> {
        Ok(self
            .reservation_repository
            .find_by_restaurant(restaurant_id, date, status)
            .await?)
    }
}

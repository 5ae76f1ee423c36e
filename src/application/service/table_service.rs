use crate::application::error::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::model::{RestaurantId, Table, TableId, TableLocation};
use crate::domain::port::{
    Clock, Logger, ReservationRepository, RestaurantRepository, TableRepository,
};
use std::sync::Arc;

/// テーブル一覧の1行分（今日以降の有効予約件数つき）
#[derive(Debug, Clone)]
pub struct TableOverview {
    pub table: Table,
    pub active_reservations: u64,
}

/// テーブル管理のアプリケーションサービス（店舗スタッフの操作）
pub struct TableApplicationService {
    restaurant_repository: Arc<dyn RestaurantRepository>,
    table_repository: Arc<dyn TableRepository>,
    reservation_repository: Arc<dyn ReservationRepository>,
    logger: Arc<dyn Logger>,
    clock: Arc<dyn Clock>,
}

impl TableApplicationService {
    pub fn new(
        restaurant_repository: Arc<dyn RestaurantRepository>,
        table_repository: Arc<dyn TableRepository>,
        reservation_repository: Arc<dyn ReservationRepository>,
        logger: Arc<dyn Logger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            restaurant_repository,
            table_repository,
            reservation_repository,
            logger,
            clock,
        }
    }

    /// レストランのテーブル一覧を取得する
    pub async fn list_tables(
        &self,
        restaurant_id: RestaurantId,
    ) -> Result<Vec<TableOverview>, ApplicationError> {
        let tables = self.table_repository.find_by_restaurant(restaurant_id).await?;

        let today = self.clock.now().date_naive();
        let mut overviews = Vec::with_capacity(tables.len());
        for table in tables {
            let active_reservations = self
                .reservation_repository
                .count_active_for_table(table.id(), today)
                .await?;
            overviews.push(TableOverview {
                table,
                active_reservations,
            });
        }
        Ok(overviews)
    }

    /// テーブルを追加する
    pub async fn add_table(
        &self,
        restaurant_id: RestaurantId,
        table_number: u32,
        seating_capacity: u32,
        location: TableLocation,
    ) -> Result<Table, ApplicationError> {
        self.restaurant_repository
            .find_by_id(restaurant_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("レストランが見つかりません: {}", restaurant_id))
            })?;

        let table = Table::new(
            self.table_repository.next_identity(),
            restaurant_id,
            table_number,
            seating_capacity,
            location,
            true,
        )?;
        self.table_repository.save(&table).await?;
        self.logger.info(
            "TableApplicationService",
            &format!("テーブルを追加しました: {}番", table.table_number()),
        );
        Ok(table)
    }

    /// テーブルを削除する
    /// 今日以降に有効な（キャンセル以外の）予約がある場合は削除できない
    pub async fn remove_table(&self, table_id: TableId) -> Result<(), ApplicationError> {
        let table = self
            .table_repository
            .find_by_id(table_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("テーブルが見つかりません: {}", table_id))
            })?;

        let today = self.clock.now().date_naive();
        if self
            .reservation_repository
            .has_active_for_table(table_id, today)
            .await?
        {
            return Err(DomainError::TableHasActiveReservations.into());
        }

        self.table_repository.delete(table_id).await?;
        self.logger.info(
            "TableApplicationService",
            &format!("テーブルを削除しました: {}番", table.table_number()),
        );
        Ok(())
    }
}

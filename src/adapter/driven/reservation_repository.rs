use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{Reservation, ReservationId};
use crate::domain::port::{RepositoryError, ReservationRepository};
use async_trait::async_trait;

// MySQL関連のインポート
use crate::domain::model::{
    BookingReference, CustomerId, ReservationStatus, RestaurantId, TableId, TableLocation,
    TimeSpan,
};
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{MySql, Pool, Row};
use uuid::Uuid;

/// MySQL予約リポジトリ
/// MySQLデータベースを使用して予約台帳を永続化する
pub struct MySqlReservationRepository {
    pool: Pool<MySql>,
}

const SELECT_COLUMNS: &str = r#"
    id, booking_reference, restaurant_id, table_id, customer_id,
    reservation_date, reservation_time, start_time, end_time,
    number_of_guests, status, preferred_location, occasion_id,
    special_requests, created_at, updated_at, cancelled_at, cancellation_reason
"#;

impl MySqlReservationRepository {
    /// 新しいMySQL予約リポジトリを作成
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// データベースの行から予約集約を再構築する
    fn reservation_from_row(row: &sqlx::mysql::MySqlRow) -> Result<Reservation, RepositoryError> {
        let id = ReservationId::from_string(row.get("id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("予約IDの解析に失敗しました: {}", e))
        })?;

        let booking_reference =
            BookingReference::from_string(row.get("booking_reference")).map_err(|e| {
                RepositoryError::FetchFailed(format!("予約番号の解析に失敗しました: {}", e))
            })?;

        let restaurant_id = RestaurantId::from_string(row.get("restaurant_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("レストランIDの解析に失敗しました: {}", e))
        })?;

        let table_id = TableId::from_string(row.get("table_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("テーブルIDの解析に失敗しました: {}", e))
        })?;

        let customer_id = CustomerId::from_string(row.get("customer_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("顧客IDの解析に失敗しました: {}", e))
        })?;

        let status = ReservationStatus::from_string(row.get("status")).map_err(|e| {
            RepositoryError::FetchFailed(format!("予約ステータスの解析に失敗しました: {}", e))
        })?;

        let preferred_location = row
            .get::<Option<String>, _>("preferred_location")
            .map(|s| {
                TableLocation::from_string(&s).map_err(|e| {
                    RepositoryError::FetchFailed(format!(
                        "テーブル設置場所の解析に失敗しました: {}",
                        e
                    ))
                })
            })
            .transpose()?;

        let occasion_id = row
            .get::<Option<String>, _>("occasion_id")
            .map(|s| {
                Uuid::parse_str(&s).map_err(|e| {
                    RepositoryError::FetchFailed(format!(
                        "オケージョンIDの解析に失敗しました: {}",
                        e
                    ))
                })
            })
            .transpose()?;

        // DATETIME列はUTCの壁時計として保存されている
        let start_time = row.get::<NaiveDateTime, _>("start_time").and_utc();
        let end_time = row.get::<NaiveDateTime, _>("end_time").and_utc();
        let span = TimeSpan::new(start_time, end_time).map_err(|e| {
            RepositoryError::FetchFailed(format!("時間区間の再構築に失敗しました: {}", e))
        })?;

        Reservation::reconstruct(
            id,
            booking_reference,
            restaurant_id,
            table_id,
            customer_id,
            row.get("reservation_date"),
            row.get("reservation_time"),
            span,
            row.get::<u32, _>("number_of_guests"),
            status,
            preferred_location,
            occasion_id,
            row.get("special_requests"),
            row.get::<NaiveDateTime, _>("created_at").and_utc(),
            row.get::<Option<NaiveDateTime>, _>("updated_at")
                .map(|t| t.and_utc()),
            row.get::<Option<NaiveDateTime>, _>("cancelled_at")
                .map(|t| t.and_utc()),
            row.get("cancellation_reason"),
        )
        .map_err(|e| {
            RepositoryError::FetchFailed(format!("予約集約の再構築に失敗しました: {}", e))
        })
    }
}

#[async_trait]
impl ReservationRepository for MySqlReservationRepository {
    async fn insert(&self, reservation: &Reservation) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| {
                DatabaseError::ConnectionError(format!("トランザクション開始に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        // 同一テーブル・重複区間の有効予約を行ロックつきで再チェックする
        // テーブル選択から挿入までを単一のトランザクションで原子的に扱う
        let span = reservation.span();
        let conflicting = sqlx::query(
            r#"
            SELECT id FROM reservations
            WHERE table_id = ? AND status != 'Cancelled'
              AND start_time < ? AND end_time > ?
            FOR UPDATE
            "#,
        )
        .bind(reservation.table_id().to_string())
        .bind(span.end().naive_utc())
        .bind(span.start().naive_utc())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("重複チェックに失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        if !conflicting.is_empty() {
            return Err(DatabaseError::ConstraintViolation(format!(
                "テーブル{}の時間区間が既に予約されています",
                reservation.table_id()
            ))
            .into());
        }

        sqlx::query(
            r#"
            INSERT INTO reservations (
                id, booking_reference, restaurant_id, table_id, customer_id,
                reservation_date, reservation_time, start_time, end_time,
                number_of_guests, status, preferred_location, occasion_id,
                special_requests, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(reservation.id().to_string())
        .bind(reservation.booking_reference().as_str())
        .bind(reservation.restaurant_id().to_string())
        .bind(reservation.table_id().to_string())
        .bind(reservation.customer_id().to_string())
        .bind(reservation.reservation_date())
        .bind(reservation.reservation_time())
        .bind(span.start().naive_utc())
        .bind(span.end().naive_utc())
        .bind(reservation.number_of_guests())
        .bind(reservation.status().to_string())
        .bind(reservation.preferred_location().map(|l| l.to_string()))
        .bind(reservation.occasion_id().map(|id| id.to_string()))
        .bind(reservation.special_requests())
        .bind(reservation.created_at().naive_utc())
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("予約の挿入に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        tx.commit()
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!(
                    "トランザクションのコミットに失敗しました: {}",
                    e
                ))
            })
            .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn save(&self, reservation: &Reservation) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE reservations
            SET status = ?, updated_at = ?, cancelled_at = ?, cancellation_reason = ?
            WHERE id = ?
            "#,
        )
        .bind(reservation.status().to_string())
        .bind(reservation.updated_at().map(|t| t.naive_utc()))
        .bind(reservation.cancelled_at().map(|t| t.naive_utc()))
        .bind(reservation.cancellation_reason())
        .bind(reservation.id().to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("予約の更新に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        id: ReservationId,
    ) -> Result<Option<Reservation>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM reservations WHERE id = ?",
            SELECT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("予約の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        row.map(|r| Self::reservation_from_row(&r)).transpose()
    }

    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Reservation>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM reservations WHERE booking_reference = ?",
            SELECT_COLUMNS
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("予約番号での取得に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        row.map(|r| Self::reservation_from_row(&r)).transpose()
    }

    async fn find_active_by_restaurant_and_date(
        &self,
        restaurant_id: RestaurantId,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, RepositoryError> {
        // 空き照会・割当の入力になる有効予約（キャンセル以外）
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM reservations
            WHERE restaurant_id = ? AND reservation_date = ? AND status != 'Cancelled'
            ORDER BY start_time ASC
            "#,
            SELECT_COLUMNS
        ))
        .bind(restaurant_id.to_string())
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("有効予約の取得に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        rows.iter().map(Self::reservation_from_row).collect()
    }

    async fn find_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Reservation>, RepositoryError> {
        // 予約日・時刻の降順（新しい予約が先）
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM reservations
            WHERE customer_id = ?
            ORDER BY reservation_date DESC, reservation_time DESC
            "#,
            SELECT_COLUMNS
        ))
        .bind(customer_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("顧客予約履歴の取得に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        rows.iter().map(Self::reservation_from_row).collect()
    }

    async fn find_by_restaurant(
        &self,
        restaurant_id: RestaurantId,
        date: Option<NaiveDate>,
        status: Option<ReservationStatus>,
    ) -> Result<Vec<Reservation>, RepositoryError> {
        let mut sql = format!(
            "SELECT {} FROM reservations WHERE restaurant_id = ?",
            SELECT_COLUMNS
        );
        if date.is_some() {
            sql.push_str(" AND reservation_date = ?");
        }
        if status.is_some() {
            sql.push_str(" AND status = ?");
        }
        sql.push_str(" ORDER BY reservation_date ASC, reservation_time ASC");

        let mut query = sqlx::query(&sql).bind(restaurant_id.to_string());
        if let Some(date) = date {
            query = query.bind(date);
        }
        if let Some(status) = status {
            query = query.bind(status.to_string());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("予約一覧の取得に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        rows.iter().map(Self::reservation_from_row).collect()
    }

    async fn reference_exists(&self, reference: &str) -> Result<bool, RepositoryError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS reference_count FROM reservations WHERE booking_reference = ?",
        )
        .bind(reference)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("予約番号の存在確認に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        Ok(row.get::<i64, _>("reference_count") > 0)
    }

    async fn has_active_for_table(
        &self,
        table_id: TableId,
        from: NaiveDate,
    ) -> Result<bool, RepositoryError> {
        Ok(self.count_active_for_table(table_id, from).await? > 0)
    }

    async fn count_active_for_table(
        &self,
        table_id: TableId,
        from: NaiveDate,
    ) -> Result<u64, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS active_count FROM reservations
            WHERE table_id = ? AND status != 'Cancelled' AND reservation_date >= ?
            "#,
        )
        .bind(table_id.to_string())
        .bind(from)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("有効予約件数の取得に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        Ok(row.get::<i64, _>("active_count") as u64)
    }

    fn next_identity(&self) -> ReservationId {
        ReservationId::new()
    }
}

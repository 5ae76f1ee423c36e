use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{OpeningHours, RestaurantConfig, RestaurantId};
use crate::domain::port::{RepositoryError, RestaurantRepository};
use async_trait::async_trait;

// MySQL関連のインポート
use chrono::{NaiveDate, NaiveTime, Weekday};
use sqlx::{MySql, Pool, Row};

/// MySQLレストラン設定リポジトリ
/// 店舗マスタ（営業時間・休業日を含む）の読み取り専用アクセス
pub struct MySqlRestaurantRepository {
    pool: Pool<MySql>,
}

impl MySqlRestaurantRepository {
    /// 新しいMySQLレストラン設定リポジトリを作成
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

/// TINYINT（月曜=0〜日曜=6）を曜日に変換する
fn weekday_from_number(n: u8) -> Result<Weekday, RepositoryError> {
    match n {
        0 => Ok(Weekday::Mon),
        1 => Ok(Weekday::Tue),
        2 => Ok(Weekday::Wed),
        3 => Ok(Weekday::Thu),
        4 => Ok(Weekday::Fri),
        5 => Ok(Weekday::Sat),
        6 => Ok(Weekday::Sun),
        _ => Err(RepositoryError::FetchFailed(format!(
            "無効な曜日の値です: {}",
            n
        ))),
    }
}

#[async_trait]
impl RestaurantRepository for MySqlRestaurantRepository {
    async fn find_by_id(
        &self,
        id: RestaurantId,
    ) -> Result<Option<RestaurantConfig>, RepositoryError> {
        let restaurant_row = sqlx::query(
            r#"
            SELECT id, name, default_booking_duration_minutes,
                   time_slot_interval_minutes, cancellation_policy_hours
            FROM restaurants
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("レストランの取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        let restaurant_row = match restaurant_row {
            Some(row) => row,
            None => return Ok(None),
        };

        // 営業時間を曜日順に取得
        let hour_rows = sqlx::query(
            r#"
            SELECT day_of_week, open_time, close_time, is_closed
            FROM opening_hours
            WHERE restaurant_id = ?
            ORDER BY day_of_week ASC
            "#,
        )
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("営業時間の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        let mut opening_hours = Vec::with_capacity(hour_rows.len());
        for row in &hour_rows {
            let day = weekday_from_number(row.get::<u8, _>("day_of_week"))?;
            let is_closed = row.get::<bool, _>("is_closed");
            let hours = if is_closed {
                OpeningHours::closed(day)
            } else {
                OpeningHours::new(
                    day,
                    row.get::<NaiveTime, _>("open_time"),
                    row.get::<NaiveTime, _>("close_time"),
                    false,
                )
                .map_err(|e| {
                    RepositoryError::FetchFailed(format!("営業時間の再構築に失敗しました: {}", e))
                })?
            };
            opening_hours.push(hours);
        }

        // 臨時休業日を取得
        let closure_rows = sqlx::query(
            r#"
            SELECT closure_date
            FROM restaurant_closures
            WHERE restaurant_id = ?
            ORDER BY closure_date ASC
            "#,
        )
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("休業日の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        let closure_dates = closure_rows
            .iter()
            .map(|row| row.get::<NaiveDate, _>("closure_date"))
            .collect();

        let config = RestaurantConfig::new(
            id,
            restaurant_row.get("name"),
            opening_hours,
            closure_dates,
            restaurant_row.get::<u32, _>("default_booking_duration_minutes"),
            restaurant_row.get::<u32, _>("time_slot_interval_minutes"),
            restaurant_row.get::<i64, _>("cancellation_policy_hours"),
        )
        .map_err(|e| {
            RepositoryError::FetchFailed(format!("レストラン設定の再構築に失敗しました: {}", e))
        })?;

        Ok(Some(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_number_matches_days_from_monday() {
        for day in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ] {
            let n = day.num_days_from_monday() as u8;
            assert_eq!(weekday_from_number(n).unwrap(), day);
        }
    }

    #[test]
    fn test_invalid_weekday_number() {
        assert!(weekday_from_number(7).is_err());
    }
}

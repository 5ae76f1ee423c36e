use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{Table, TableId};
use crate::domain::port::{RepositoryError, TableRepository};
use async_trait::async_trait;

// MySQL関連のインポート
use crate::domain::model::{RestaurantId, TableLocation};
use sqlx::{MySql, Pool, Row};

/// MySQLテーブルリポジトリ
/// MySQLデータベースを使用してテーブルマスタを永続化する
pub struct MySqlTableRepository {
    pool: Pool<MySql>,
}

impl MySqlTableRepository {
    /// 新しいMySQLテーブルリポジトリを作成
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// データベースの行からテーブルを再構築する
    fn table_from_row(row: &sqlx::mysql::MySqlRow) -> Result<Table, RepositoryError> {
        let id = TableId::from_string(row.get("id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("テーブルIDの解析に失敗しました: {}", e))
        })?;

        let restaurant_id = RestaurantId::from_string(row.get("restaurant_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("レストランIDの解析に失敗しました: {}", e))
        })?;

        let location = TableLocation::from_string(row.get("location")).map_err(|e| {
            RepositoryError::FetchFailed(format!("テーブル設置場所の解析に失敗しました: {}", e))
        })?;

        Table::new(
            id,
            restaurant_id,
            row.get::<u32, _>("table_number"),
            row.get::<u32, _>("seating_capacity"),
            location,
            row.get::<bool, _>("is_available"),
        )
        .map_err(|e| {
            RepositoryError::FetchFailed(format!("テーブルの再構築に失敗しました: {}", e))
        })
    }
}

#[async_trait]
impl TableRepository for MySqlTableRepository {
    async fn save(&self, table: &Table) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO restaurant_tables (id, restaurant_id, table_number, seating_capacity, location, is_available)
            VALUES (?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                table_number = VALUES(table_number),
                seating_capacity = VALUES(seating_capacity),
                location = VALUES(location),
                is_available = VALUES(is_available)
            "#,
        )
        .bind(table.id().to_string())
        .bind(table.restaurant_id().to_string())
        .bind(table.table_number())
        .bind(table.seating_capacity())
        .bind(table.location().to_string())
        .bind(table.is_available())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("テーブルの保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_by_id(&self, id: TableId) -> Result<Option<Table>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, restaurant_id, table_number, seating_capacity, location, is_available
            FROM restaurant_tables
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("テーブルの取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        row.map(|r| Self::table_from_row(&r)).transpose()
    }

    async fn find_by_restaurant(
        &self,
        restaurant_id: RestaurantId,
    ) -> Result<Vec<Table>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, restaurant_id, table_number, seating_capacity, location, is_available
            FROM restaurant_tables
            WHERE restaurant_id = ?
            ORDER BY table_number ASC
            "#,
        )
        .bind(restaurant_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("テーブル一覧の取得に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        rows.iter().map(Self::table_from_row).collect()
    }

    async fn delete(&self, id: TableId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM restaurant_tables WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("テーブルの削除に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        Ok(())
    }

    fn next_identity(&self) -> TableId {
        TableId::new()
    }
}

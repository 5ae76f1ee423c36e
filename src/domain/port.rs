use crate::domain::event::DomainEvent;
use crate::domain::model::{
    CustomerId, Reservation, ReservationId, ReservationStatus, RestaurantConfig, RestaurantId,
    Table, TableId,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// ログレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level_str = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        write!(f, "{}", level_str)
    }
}

/// ロガーの抽象
/// アプリケーションサービスが処理の節目で構造化ログを出力するために使う
pub trait Logger: Send + Sync {
    fn log(
        &self,
        level: LogLevel,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    fn debug(&self, component: &str, message: &str) {
        self.log(LogLevel::Debug, component, message, None, None);
    }

    fn info(&self, component: &str, message: &str) {
        self.log(LogLevel::Info, component, message, None, None);
    }

    fn warn(&self, component: &str, message: &str) {
        self.log(LogLevel::Warn, component, message, None, None);
    }

    fn error(&self, component: &str, message: &str) {
        self.log(LogLevel::Error, component, message, None, None);
    }
}

/// 時計の抽象
/// 「現在時刻」への参照をすべてこのポート経由にすることで、
/// キャンセルポリシー判定などを決定的にテストできる
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// リポジトリ操作のエラー
#[derive(Debug, Clone, PartialEq)]
pub enum RepositoryError {
    /// データベース接続エラー
    ConnectionFailed(String),
    /// データ操作エラー
    OperationFailed(String),
    /// データ取得エラー
    FetchFailed(String),
    /// 同時実行の競合（同一テーブル・重複区間の予約挿入など）
    Conflict(String),
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            RepositoryError::OperationFailed(msg) => write!(f, "Operation failed: {}", msg),
            RepositoryError::FetchFailed(msg) => write!(f, "Fetch failed: {}", msg),
            RepositoryError::Conflict(msg) => write!(f, "Conflict: {}", msg),
        }
    }
}

impl std::error::Error for RepositoryError {}

/// レストラン設定のリポジトリ
/// 店舗マスタの管理は別コンテキストの責務のため、読み取り専用
#[async_trait]
pub trait RestaurantRepository: Send + Sync {
    /// IDでレストラン設定を取得（営業時間・休業日を含む）
    async fn find_by_id(
        &self,
        id: RestaurantId,
    ) -> Result<Option<RestaurantConfig>, RepositoryError>;
}

/// テーブルのリポジトリ
#[async_trait]
pub trait TableRepository: Send + Sync {
    /// テーブルを保存（新規・更新両対応）
    async fn save(&self, table: &Table) -> Result<(), RepositoryError>;

    /// IDでテーブルを取得
    async fn find_by_id(&self, id: TableId) -> Result<Option<Table>, RepositoryError>;

    /// レストランの全テーブルをテーブル番号の昇順で取得
    async fn find_by_restaurant(
        &self,
        restaurant_id: RestaurantId,
    ) -> Result<Vec<Table>, RepositoryError>;

    /// テーブルを削除
    async fn delete(&self, id: TableId) -> Result<(), RepositoryError>;

    /// 新しいテーブルIDを発行
    fn next_identity(&self) -> TableId;
}

/// 予約のリポジトリ
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// 新規予約を挿入する
    /// 同一テーブル・重複区間の既存予約との競合チェックを挿入と同一トランザクションで行い、
    /// 競合が検出された場合はRepositoryError::Conflictを返す
    async fn insert(&self, reservation: &Reservation) -> Result<(), RepositoryError>;

    /// 既存予約を保存（キャンセル・ステータス変更の永続化）
    async fn save(&self, reservation: &Reservation) -> Result<(), RepositoryError>;

    /// IDで予約を取得
    async fn find_by_id(
        &self,
        id: ReservationId,
    ) -> Result<Option<Reservation>, RepositoryError>;

    /// 予約番号で予約を取得
    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Reservation>, RepositoryError>;

    /// レストラン・予約日で有効な（キャンセル以外の）予約を取得
    async fn find_active_by_restaurant_and_date(
        &self,
        restaurant_id: RestaurantId,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, RepositoryError>;

    /// 顧客の予約履歴を予約日・時刻の降順で取得
    async fn find_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Reservation>, RepositoryError>;

    /// レストランの予約を日付・ステータスで絞り込んで昇順で取得
    async fn find_by_restaurant(
        &self,
        restaurant_id: RestaurantId,
        date: Option<NaiveDate>,
        status: Option<ReservationStatus>,
    ) -> Result<Vec<Reservation>, RepositoryError>;

    /// 予約番号が既に使われているかどうか
    async fn reference_exists(&self, reference: &str) -> Result<bool, RepositoryError>;

    /// 指定日以降に有効な予約を持つテーブルかどうか
    async fn has_active_for_table(
        &self,
        table_id: TableId,
        from: NaiveDate,
    ) -> Result<bool, RepositoryError>;

    /// 指定日以降の有効な予約件数を取得
    async fn count_active_for_table(
        &self,
        table_id: TableId,
        from: NaiveDate,
    ) -> Result<u64, RepositoryError>;

    /// 新しい予約IDを発行
    fn next_identity(&self) -> ReservationId;
}

/// イベント発行時のエラー
#[derive(Debug, thiserror::Error)]
pub enum PublisherError {
    #[error("Failed to publish event: {0}")]
    PublishFailed(String),
}

/// ドメインイベントの発行者
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &DomainEvent) -> Result<(), PublisherError>;
}

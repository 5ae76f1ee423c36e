use crate::domain::error::DomainError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// レストランの一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RestaurantId(Uuid);

impl RestaurantId {
    /// 新しい一意のRestaurantIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから RestaurantId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からRestaurantIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for RestaurantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for RestaurantId {
    fn default() -> Self {
        Self::new()
    }
}

/// テーブルの一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableId(Uuid);

impl TableId {
    /// 新しい一意のTableIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから TableId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からTableIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for TableId {
    fn default() -> Self {
        Self::new()
    }
}

/// 予約の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReservationId(Uuid);

impl ReservationId {
    /// 新しい一意のReservationIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから ReservationId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からReservationIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for ReservationId {
    fn default() -> Self {
        Self::new()
    }
}

/// 顧客の一意識別子
/// 顧客の実在性検証は顧客ディレクトリ側の責務（この層では識別子として扱うだけ）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(Uuid);

impl CustomerId {
    /// 新しい一意のCustomerIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから CustomerId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からCustomerIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for CustomerId {
    fn default() -> Self {
        Self::new()
    }
}

/// テーブルの設置場所
/// 閉じた列挙として表現する（自由文字列タグは使わない）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableLocation {
    /// 店内標準席
    Standard,
    /// 屋外席
    Outdoor,
    /// テラス席
    Terrace,
    /// ビーチビュー席
    BeachView,
    /// バーエリア席
    BarArea,
    /// 個室
    Private,
    /// 窓際席
    Window,
}

impl fmt::Display for TableLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location_str = match self {
            TableLocation::Standard => "Standard",
            TableLocation::Outdoor => "Outdoor",
            TableLocation::Terrace => "Terrace",
            TableLocation::BeachView => "BeachView",
            TableLocation::BarArea => "BarArea",
            TableLocation::Private => "Private",
            TableLocation::Window => "Window",
        };
        write!(f, "{}", location_str)
    }
}

impl TableLocation {
    /// 文字列からTableLocationを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "Standard" => Ok(TableLocation::Standard),
            "Outdoor" => Ok(TableLocation::Outdoor),
            "Terrace" => Ok(TableLocation::Terrace),
            "BeachView" => Ok(TableLocation::BeachView),
            "BarArea" => Ok(TableLocation::BarArea),
            "Private" => Ok(TableLocation::Private),
            "Window" => Ok(TableLocation::Window),
            _ => Err(DomainError::InvalidValue(format!(
                "無効なテーブル設置場所: {}",
                s
            ))),
        }
    }
}

/// 予約のステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservationStatus {
    /// 保留中
    Pending,
    /// 確定済み（テーブル割当済み）
    Confirmed,
    /// 着席済み
    Seated,
    /// 利用完了
    Completed,
    /// キャンセル済み
    Cancelled,
    /// 無断キャンセル
    NoShow,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status_str = match self {
            ReservationStatus::Pending => "Pending",
            ReservationStatus::Confirmed => "Confirmed",
            ReservationStatus::Seated => "Seated",
            ReservationStatus::Completed => "Completed",
            ReservationStatus::Cancelled => "Cancelled",
            ReservationStatus::NoShow => "NoShow",
        };
        write!(f, "{}", status_str)
    }
}

impl ReservationStatus {
    /// 文字列からReservationStatusを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "Pending" => Ok(ReservationStatus::Pending),
            "Confirmed" => Ok(ReservationStatus::Confirmed),
            "Seated" => Ok(ReservationStatus::Seated),
            "Completed" => Ok(ReservationStatus::Completed),
            "Cancelled" => Ok(ReservationStatus::Cancelled),
            "NoShow" => Ok(ReservationStatus::NoShow),
            _ => Err(DomainError::InvalidValue(format!(
                "無効な予約ステータス: {}",
                s
            ))),
        }
    }

    /// テーブルを占有するステータスかどうか
    /// Cancelled以外の予約はすべて重複判定の対象になる
    pub fn occupies_table(&self) -> bool {
        *self != ReservationStatus::Cancelled
    }

    /// 終端ステータスかどうか（以降の状態遷移は不可）
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Completed
                | ReservationStatus::Cancelled
                | ReservationStatus::NoShow
        )
    }
}

/// 予約がテーブルを占有する絶対時間区間 [start, end) を表す値オブジェクト
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpan {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeSpan {
    /// 新しい時間区間を作成
    /// 開始時刻は終了時刻より前である必要がある
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, DomainError> {
        if start >= end {
            return Err(DomainError::InvalidValue(
                "時間区間の開始は終了より前である必要があります".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    /// 開始時刻を取得
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// 終了時刻を取得
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// 半開区間同士の重複判定
    /// existing.start < slot.end AND existing.end > slot.start
    pub fn overlaps(&self, other: &TimeSpan) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// 予約番号を表す値オブジェクト
/// 形式: RES-YYYYMMDD-NNNN（日付部分は予約作成日、NNNNは1000〜9999）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingReference(String);

impl BookingReference {
    /// 作成日と4桁の乱数サフィックスから予約番号を生成
    pub fn generate(created_on: NaiveDate, suffix: u32) -> Result<Self, DomainError> {
        if !(1000..=9999).contains(&suffix) {
            return Err(DomainError::InvalidBookingReference(format!(
                "サフィックスは4桁である必要があります: {}",
                suffix
            )));
        }
        Ok(Self(format!(
            "RES-{}-{}",
            created_on.format("%Y%m%d"),
            suffix
        )))
    }

    /// 文字列から予約番号を作成（形式を検証する）
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        let bytes = s.as_bytes();
        let valid = bytes.len() == 17
            && s.starts_with("RES-")
            && bytes[4..12].iter().all(|b| b.is_ascii_digit())
            && bytes[12] == b'-'
            && bytes[13..17].iter().all(|b| b.is_ascii_digit());

        if !valid {
            return Err(DomainError::InvalidBookingReference(format!(
                "予約番号の形式が不正です: {}",
                s
            )));
        }
        Ok(Self(s.to_string()))
    }

    /// 内部の文字列を取得
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 空き時間枠
/// 空き照会エンジンの出力1件分（開始時刻の昇順で並ぶ）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// 枠の開始時刻（壁時計時刻）
    pub time: chrono::NaiveTime,
    /// この枠で予約可能かどうか
    pub is_available: bool,
    /// この枠で空いているテーブル数
    pub available_table_count: u32,
}

use crate::domain::error::DomainError;
use crate::domain::model::RestaurantId;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};

/// 曜日ごとの営業時間
/// 閉店時刻が開店時刻以前の場合は深夜営業（日をまたぐ営業）として扱う
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpeningHours {
    day_of_week: Weekday,
    open_time: NaiveTime,
    close_time: NaiveTime,
    is_closed: bool,
}

impl OpeningHours {
    /// 新しい営業時間レコードを作成
    /// 営業日の場合、開店時刻と閉店時刻が同一であってはならない
    pub fn new(
        day_of_week: Weekday,
        open_time: NaiveTime,
        close_time: NaiveTime,
        is_closed: bool,
    ) -> Result<Self, DomainError> {
        if !is_closed && open_time == close_time {
            return Err(DomainError::InvalidOpeningHours(format!(
                "{:?}曜日の開店時刻と閉店時刻が同一です",
                day_of_week
            )));
        }
        Ok(Self {
            day_of_week,
            open_time,
            close_time,
            is_closed,
        })
    }

    /// 定休日レコードを作成
    pub fn closed(day_of_week: Weekday) -> Self {
        Self {
            day_of_week,
            open_time: NaiveTime::MIN,
            close_time: NaiveTime::MIN,
            is_closed: true,
        }
    }

    /// 曜日を取得
    pub fn day_of_week(&self) -> Weekday {
        self.day_of_week
    }

    /// 開店時刻を取得
    pub fn open_time(&self) -> NaiveTime {
        self.open_time
    }

    /// 閉店時刻を取得
    pub fn close_time(&self) -> NaiveTime {
        self.close_time
    }

    /// 定休日かどうか
    pub fn is_closed(&self) -> bool {
        self.is_closed
    }

    /// 営業時間が日をまたぐかどうか（例: 22:00〜02:00の深夜営業）
    pub fn spans_midnight(&self) -> bool {
        !self.is_closed && self.close_time <= self.open_time
    }
}

/// レストラン設定集約
/// 空き照会・割当エンジンへの読み取り専用入力
/// プロビジョニングは外部の設定ストアの責務
#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantConfig {
    id: RestaurantId,
    name: String,
    opening_hours: Vec<OpeningHours>,
    closure_dates: Vec<NaiveDate>,
    default_booking_duration_minutes: u32,
    time_slot_interval_minutes: u32,
    cancellation_policy_hours: i64,
}

impl RestaurantConfig {
    /// 新しいレストラン設定を作成
    /// バリデーション:
    /// - 予約時間（duration）と枠間隔（interval）は正の整数
    /// - キャンセルポリシー時間は非負
    pub fn new(
        id: RestaurantId,
        name: String,
        opening_hours: Vec<OpeningHours>,
        closure_dates: Vec<NaiveDate>,
        default_booking_duration_minutes: u32,
        time_slot_interval_minutes: u32,
        cancellation_policy_hours: i64,
    ) -> Result<Self, DomainError> {
        if default_booking_duration_minutes == 0 {
            return Err(DomainError::InvalidValue(
                "予約時間は正の分数である必要があります".to_string(),
            ));
        }
        if time_slot_interval_minutes == 0 {
            return Err(DomainError::InvalidValue(
                "時間枠の間隔は正の分数である必要があります".to_string(),
            ));
        }
        if cancellation_policy_hours < 0 {
            return Err(DomainError::InvalidValue(
                "キャンセルポリシー時間は非負である必要があります".to_string(),
            ));
        }
        Ok(Self {
            id,
            name,
            opening_hours,
            closure_dates,
            default_booking_duration_minutes,
            time_slot_interval_minutes,
            cancellation_policy_hours,
        })
    }

    /// レストランIDを取得
    pub fn id(&self) -> RestaurantId {
        self.id
    }

    /// 店名を取得
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 指定された曜日の営業時間レコードを取得
    pub fn opening_hours_for(&self, day_of_week: Weekday) -> Option<&OpeningHours> {
        self.opening_hours
            .iter()
            .find(|hours| hours.day_of_week() == day_of_week)
    }

    /// 指定された日が臨時休業日かどうか
    pub fn is_closed_on(&self, date: NaiveDate) -> bool {
        self.closure_dates.contains(&date)
    }

    /// 予約開始の絶対時刻を計算する
    /// 深夜営業日では、開店時刻より前の時刻（日付をまたいだ枠）は翌日の壁時計時刻として扱う
    /// 予約の帳簿上の日付（営業日）は呼び出し側が指定した日付のまま変わらない
    pub fn reservation_start(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        let rolls_over = self
            .opening_hours_for(date.weekday())
            .map_or(false, |hours| {
                hours.spans_midnight() && time < hours.open_time()
            });
        let start_date = if rolls_over {
            date + Duration::days(1)
        } else {
            date
        };
        start_date.and_time(time).and_utc()
    }

    /// 予約1件がテーブルを占有する時間
    pub fn booking_duration(&self) -> Duration {
        Duration::minutes(self.default_booking_duration_minutes as i64)
    }

    /// 予約枠を提示する間隔
    pub fn slot_interval(&self) -> Duration {
        Duration::minutes(self.time_slot_interval_minutes as i64)
    }

    /// 予約時間（分）を取得
    pub fn default_booking_duration_minutes(&self) -> u32 {
        self.default_booking_duration_minutes
    }

    /// 枠間隔（分）を取得
    pub fn time_slot_interval_minutes(&self) -> u32 {
        self.time_slot_interval_minutes
    }

    /// キャンセル・変更に必要なリードタイム（時間）を取得
    pub fn cancellation_policy_hours(&self) -> i64 {
        self.cancellation_policy_hours
    }
}

use crate::domain::error::DomainError;
use crate::domain::model::{
    BookingReference, Reservation, RestaurantConfig, Table, TableId, TableLocation, TimeSlot,
    TimeSpan,
};
use crate::domain::port::ReservationRepository;
use chrono::{Datelike, Duration, NaiveDate};
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;

/// 空き照会エンジン
/// 営業時間と既存予約から、指定日・指定人数で予約可能な時間枠を列挙する
pub struct AvailabilityService;

impl AvailabilityService {
    pub fn new() -> Self {
        Self
    }

    /// 指定日の空き時間枠を計算する
    /// 定休日・臨時休業日は空のリストを返す
    /// 枠は開店時刻から「閉店時刻 − 滞在時間」まで、予約間隔刻みで列挙される
    pub fn compute_available_slots(
        &self,
        config: &RestaurantConfig,
        tables: &[Table],
        reservations: &[Reservation],
        date: NaiveDate,
        party_size: u32,
    ) -> Result<Vec<TimeSlot>, DomainError> {
        if party_size == 0 {
            return Err(DomainError::InvalidPartySize);
        }

        // 臨時休業日チェック
        if config.is_closed_on(date) {
            return Ok(Vec::new());
        }

        // 曜日の営業時間を取得（定休日なら空）
        let hours = match config.opening_hours_for(date.weekday()) {
            Some(hours) if !hours.is_closed() => hours,
            _ => return Ok(Vec::new()),
        };

        let duration = config.booking_duration();
        let interval = config.slot_interval();

        let window_start = date.and_time(hours.open_time()).and_utc();
        // 閉店時刻が開店時刻以前なら深夜営業（閉店は翌日の時刻として扱う）
        let close_date = if hours.spans_midnight() {
            date + Duration::days(1)
        } else {
            date
        };
        let window_end = close_date.and_time(hours.close_time()).and_utc();

        // 最終予約開始時刻 = 閉店時刻 − 滞在時間
        let last_start = window_end - duration;

        let mut slots = Vec::new();
        let mut slot_start = window_start;
        while slot_start <= last_start {
            let span = TimeSpan::new(slot_start, slot_start + duration)?;
            let booked = booked_table_ids(reservations, &span);

            let available_count = tables
                .iter()
                .filter(|t| t.can_seat(party_size) && !booked.contains(&t.id()))
                .count() as u32;

            slots.push(TimeSlot {
                time: slot_start.time(),
                is_available: available_count > 0,
                available_table_count: available_count,
            });

            slot_start += interval;
        }

        Ok(slots)
    }
}

impl Default for AvailabilityService {
    fn default() -> Self {
        Self::new()
    }
}

/// 指定区間と重複する有効予約が占有しているテーブルIDの集合
pub fn booked_table_ids(reservations: &[Reservation], span: &TimeSpan) -> HashSet<TableId> {
    reservations
        .iter()
        .filter(|r| r.occupies(span))
        .map(|r| r.table_id())
        .collect()
}

/// テーブル割当エンジン
/// 候補テーブルから割り当てるテーブルを1つ選択する
pub struct TableAllocator;

impl TableAllocator {
    pub fn new() -> Self {
        Self
    }

    /// 予約に割り当てるテーブルを選択する
    /// 選択ルール:
    /// 1. 利用可能・人数収容可・未予約のテーブルが候補
    /// 2. 希望設置場所があれば、まずその場所のテーブルから選ぶ
    /// 3. 希望場所に候補がなければ、場所を無視してフォールバック
    /// 4. 候補の中では収容人数が最小のテーブルを選ぶ（同数ならテーブル番号の若い方）
    pub fn select_table<'a>(
        &self,
        tables: &'a [Table],
        booked: &HashSet<TableId>,
        party_size: u32,
        preferred_location: Option<TableLocation>,
    ) -> Option<&'a Table> {
        let candidates: Vec<&Table> = tables
            .iter()
            .filter(|t| t.can_seat(party_size) && !booked.contains(&t.id()))
            .collect();

        if let Some(location) = preferred_location {
            let preferred = candidates
                .iter()
                .filter(|t| t.location() == location)
                .min_by_key(|t| (t.seating_capacity(), t.table_number()))
                .copied();
            if preferred.is_some() {
                return preferred;
            }
        }

        candidates
            .into_iter()
            .min_by_key(|t| (t.seating_capacity(), t.table_number()))
    }
}

impl Default for TableAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// 予約番号の発行サービス
/// 生成した番号が既存予約と衝突していないことをリポジトリで確認し、
/// 衝突していれば再生成する
pub struct BookingReferenceService<R: ReservationRepository + ?Sized> {
    reservation_repository: Arc<R>,
}

impl<R: ReservationRepository + ?Sized> BookingReferenceService<R> {
    pub fn new(reservation_repository: Arc<R>) -> Self {
        Self {
            reservation_repository,
        }
    }

    /// 一意な予約番号を生成する
    pub async fn generate(&self, today: NaiveDate) -> Result<BookingReference, DomainError> {
        loop {
            let suffix = {
                let mut rng = rand::thread_rng();
                rng.gen_range(1000..=9999)
            };
            let candidate = BookingReference::generate(today, suffix)?;

            let exists = self
                .reservation_repository
                .reference_exists(candidate.as_str())
                .await
                .map_err(|e| DomainError::RepositoryError(e.to_string()))?;

            if !exists {
                return Ok(candidate);
            }
        }
    }
}

use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use proptest::prelude::*;
use restaurant_reservation_management::domain::model::{
    BookingReference, CustomerId, OpeningHours, Reservation, ReservationId, RestaurantConfig,
    RestaurantId, Table, TableId, TableLocation, TimeSpan,
};
use restaurant_reservation_management::domain::service::{
    booked_table_ids, AvailabilityService, TableAllocator,
};
use std::collections::HashSet;

fn config_with_window(
    open_hour: u32,
    close_hour: u32,
    duration_minutes: u32,
    interval_minutes: u32,
) -> RestaurantConfig {
    let hours = vec![OpeningHours::new(
        Weekday::Sat,
        NaiveTime::from_hms_opt(open_hour, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(close_hour, 0, 0).unwrap(),
        false,
    )
    .unwrap()];
    RestaurantConfig::new(
        RestaurantId::new(),
        "テスト店舗".to_string(),
        hours,
        vec![],
        duration_minutes,
        interval_minutes,
        5,
    )
    .unwrap()
}

fn table_with(restaurant_id: RestaurantId, number: u32, capacity: u32) -> Table {
    Table::new(
        TableId::new(),
        restaurant_id,
        number,
        capacity,
        TableLocation::Standard,
        true,
    )
    .unwrap()
}

fn reservation_for(table_id: TableId, restaurant_id: RestaurantId, span: TimeSpan) -> Reservation {
    Reservation::new(
        ReservationId::new(),
        BookingReference::from_string("RES-20240520-1234").unwrap(),
        restaurant_id,
        table_id,
        CustomerId::new(),
        span.start().date_naive(),
        span.start().time(),
        span,
        2,
        None,
        None,
        None,
        Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap(),
    )
    .unwrap()
}

// 空き照会エンジンのプロパティベーステスト
proptest! {
    /// 時間枠は常に開始時刻の昇順で、間隔ちょうどで並ぶ
    #[test]
    fn test_slots_are_ascending_and_evenly_spaced(
        open_hour in 8u32..14,
        duration_minutes in prop::sample::select(vec![60u32, 90, 120]),
        interval_minutes in prop::sample::select(vec![15u32, 30, 60]),
    ) {
        let close_hour = open_hour + 8;
        let config = config_with_window(open_hour, close_hour, duration_minutes, interval_minutes);
        let tables = vec![table_with(config.id(), 1, 4)];
        // 2024-06-01は土曜日
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let slots = AvailabilityService::new()
            .compute_available_slots(&config, &tables, &[], date, 2)
            .unwrap();

        prop_assert!(!slots.is_empty());
        for pair in slots.windows(2) {
            let gap = pair[1].time - pair[0].time;
            prop_assert_eq!(gap, Duration::minutes(interval_minutes as i64));
        }
    }

    /// 最終枠の開始は「閉店時刻 − 滞在時間」を超えない
    #[test]
    fn test_last_slot_respects_closing_time(
        open_hour in 8u32..14,
        duration_minutes in prop::sample::select(vec![60u32, 90, 120]),
        interval_minutes in prop::sample::select(vec![15u32, 30, 60]),
    ) {
        let close_hour = open_hour + 8;
        let config = config_with_window(open_hour, close_hour, duration_minutes, interval_minutes);
        let tables = vec![table_with(config.id(), 1, 4)];
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let slots = AvailabilityService::new()
            .compute_available_slots(&config, &tables, &[], date, 2)
            .unwrap();

        let close = NaiveTime::from_hms_opt(close_hour, 0, 0).unwrap();
        let last_bookable = close - Duration::minutes(duration_minutes as i64);
        prop_assert!(slots.last().unwrap().time <= last_bookable);
    }

    /// テーブルが1つで既存予約がある場合、その予約と重複する枠は空きなしになる
    #[test]
    fn test_overlapping_slots_are_blocked(
        reserved_hour in 12u32..18,
    ) {
        let config = config_with_window(10, 22, 120, 30);
        let table = table_with(config.id(), 1, 4);
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let start = date
            .and_time(NaiveTime::from_hms_opt(reserved_hour, 0, 0).unwrap())
            .and_utc();
        let span = TimeSpan::new(start, start + Duration::minutes(120)).unwrap();
        let reservations = vec![reservation_for(table.id(), config.id(), span)];

        let slots = AvailabilityService::new()
            .compute_available_slots(&config, &[table], &reservations, date, 2)
            .unwrap();

        for slot in &slots {
            let slot_start = date.and_time(slot.time).and_utc();
            let slot_span = TimeSpan::new(slot_start, slot_start + Duration::minutes(120)).unwrap();
            if slot_span.overlaps(&span) {
                prop_assert!(!slot.is_available, "overlapping slot {} must be blocked", slot.time);
            } else {
                prop_assert!(slot.is_available, "non-overlapping slot {} must be free", slot.time);
            }
        }
    }
}

// 時間区間のプロパティベーステスト
proptest! {
    /// 重複判定は対称（a.overlaps(b) == b.overlaps(a)）
    #[test]
    fn test_overlap_is_symmetric(
        start1 in 0i64..1_000,
        len1 in 1i64..500,
        start2 in 0i64..1_000,
        len2 in 1i64..500,
    ) {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let a = TimeSpan::new(
            base + Duration::minutes(start1),
            base + Duration::minutes(start1 + len1),
        ).unwrap();
        let b = TimeSpan::new(
            base + Duration::minutes(start2),
            base + Duration::minutes(start2 + len2),
        ).unwrap();

        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }

    /// 半開区間なので、端が接するだけの区間は重複しない
    #[test]
    fn test_adjacent_spans_do_not_overlap(
        start in 0i64..1_000,
        len1 in 1i64..500,
        len2 in 1i64..500,
    ) {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let a = TimeSpan::new(
            base + Duration::minutes(start),
            base + Duration::minutes(start + len1),
        ).unwrap();
        let b = TimeSpan::new(
            base + Duration::minutes(start + len1),
            base + Duration::minutes(start + len1 + len2),
        ).unwrap();

        prop_assert!(!a.overlaps(&b));
        prop_assert!(!b.overlaps(&a));
    }
}

// テーブル割当エンジンのプロパティベーステスト
proptest! {
    /// 割り当てられたテーブルの収容人数は常に人数以上
    #[test]
    fn test_allocated_table_respects_capacity(
        capacities in prop::collection::vec(1u32..12, 1..8),
        party_size in 1u32..12,
    ) {
        let restaurant_id = RestaurantId::new();
        let tables: Vec<Table> = capacities
            .iter()
            .enumerate()
            .map(|(i, &cap)| table_with(restaurant_id, i as u32 + 1, cap))
            .collect();

        let allocator = TableAllocator::new();
        if let Some(table) = allocator.select_table(&tables, &HashSet::new(), party_size, None) {
            prop_assert!(table.seating_capacity() >= party_size);
            // 候補の中で最小の収容人数が選ばれる
            let min_fit = tables
                .iter()
                .filter(|t| t.seating_capacity() >= party_size)
                .map(|t| t.seating_capacity())
                .min()
                .unwrap();
            prop_assert_eq!(table.seating_capacity(), min_fit);
        } else {
            // 割当失敗は収容可能なテーブルが存在しない場合のみ
            prop_assert!(tables.iter().all(|t| t.seating_capacity() < party_size));
        }
    }

    /// 予約済みテーブルは決して割り当てられない
    #[test]
    fn test_booked_tables_are_never_allocated(
        capacities in prop::collection::vec(2u32..8, 2..6),
        booked_index in 0usize..6,
    ) {
        let restaurant_id = RestaurantId::new();
        let tables: Vec<Table> = capacities
            .iter()
            .enumerate()
            .map(|(i, &cap)| table_with(restaurant_id, i as u32 + 1, cap))
            .collect();

        let booked_index = booked_index % tables.len();
        let booked: HashSet<TableId> = [tables[booked_index].id()].into_iter().collect();

        let allocator = TableAllocator::new();
        if let Some(table) = allocator.select_table(&tables, &booked, 2, None) {
            prop_assert!(!booked.contains(&table.id()));
        }
    }
}

// 予約番号・キャンセルポリシーのプロパティベーステスト
proptest! {
    /// 生成された予約番号は常に形式検証を通過する
    #[test]
    fn test_generated_reference_is_well_formed(
        year in 2020i32..2030,
        month in 1u32..13,
        day in 1u32..29,
        suffix in 1000u32..10_000,
    ) {
        let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        let reference = BookingReference::generate(date, suffix).unwrap();

        prop_assert_eq!(reference.as_str().len(), 17);
        prop_assert!(BookingReference::from_string(reference.as_str()).is_ok());
    }

    /// 4桁以外のサフィックスは拒否される
    #[test]
    fn test_out_of_range_suffix_is_rejected(
        suffix in prop_oneof![0u32..1000, 10_000u32..100_000],
    ) {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        prop_assert!(BookingReference::generate(date, suffix).is_err());
    }

    /// キャンセル可否は現在時刻に対して単調（早い時点で不可なら、それ以降も不可）
    #[test]
    fn test_cancellation_window_is_monotonic(
        policy_hours in 1i64..48,
        offset1 in 0i64..100,
        offset2 in 0i64..100,
    ) {
        let start = Utc.with_ymd_and_hms(2024, 6, 10, 18, 0, 0).unwrap();
        let span = TimeSpan::new(start, start + Duration::minutes(120)).unwrap();
        let reservation = reservation_for(TableId::new(), RestaurantId::new(), span);

        let earlier = start - Duration::hours(offset1.max(offset2));
        let later = start - Duration::hours(offset1.min(offset2));

        let allowed_earlier = reservation.can_cancel_or_modify(policy_hours, earlier);
        let allowed_later = reservation.can_cancel_or_modify(policy_hours, later);

        // earlier時点で不可なら、later時点でも不可
        if !allowed_earlier {
            prop_assert!(!allowed_later);
        }
    }
}

// 予約台帳の不変条件
proptest! {
    /// 有効予約の占有テーブル集合は、キャンセルすると必ず縮小する
    #[test]
    fn test_cancelled_reservation_releases_table(
        hour in 10u32..20,
    ) {
        let restaurant_id = RestaurantId::new();
        let table_id = TableId::new();
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let start = date
            .and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap())
            .and_utc();
        let span = TimeSpan::new(start, start + Duration::minutes(120)).unwrap();

        let mut reservation = reservation_for(table_id, restaurant_id, span);
        let reservations = vec![reservation.clone()];
        prop_assert!(booked_table_ids(&reservations, &span).contains(&table_id));

        reservation
            .cancel("理由".to_string(), start - Duration::hours(24))
            .unwrap();
        let reservations = vec![reservation];
        prop_assert!(!booked_table_ids(&reservations, &span).contains(&table_id));
    }
}

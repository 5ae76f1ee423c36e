use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use restaurant_reservation_management::adapter::driver::rest_api::{create_router, AppStateInner};
use restaurant_reservation_management::application::service::{
    ReservationApplicationService, ReservationQueryService, TableApplicationService,
};
use restaurant_reservation_management::domain::event::DomainEvent;
use restaurant_reservation_management::domain::model::{
    CustomerId, OpeningHours, Reservation, ReservationId, ReservationStatus, RestaurantConfig,
    RestaurantId, Table, TableId, TableLocation,
};
use restaurant_reservation_management::domain::port::{
    Clock, EventPublisher, LogLevel, Logger, PublisherError, RepositoryError,
    ReservationRepository, RestaurantRepository, TableRepository,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// 固定時刻を返すテスト用Clock
struct FixedClock {
    now: DateTime<Utc>,
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

/// 何も出力しないテスト用Logger
struct NullLogger;

impl Logger for NullLogger {
    fn log(
        &self,
        _level: LogLevel,
        _component: &str,
        _message: &str,
        _correlation_id: Option<Uuid>,
        _context: Option<HashMap<String, String>>,
    ) {
    }
}

/// イベントを握りつぶすテスト用EventPublisher
struct NullEventPublisher;

#[async_trait]
impl EventPublisher for NullEventPublisher {
    async fn publish(&self, _event: &DomainEvent) -> Result<(), PublisherError> {
        Ok(())
    }
}

/// インメモリのレストラン設定リポジトリ
struct InMemoryRestaurantRepository {
    configs: Vec<RestaurantConfig>,
}

#[async_trait]
impl RestaurantRepository for InMemoryRestaurantRepository {
    async fn find_by_id(
        &self,
        id: RestaurantId,
    ) -> Result<Option<RestaurantConfig>, RepositoryError> {
        Ok(self.configs.iter().find(|c| c.id() == id).cloned())
    }
}

/// インメモリのテーブルリポジトリ
struct InMemoryTableRepository {
    tables: Mutex<Vec<Table>>,
}

#[async_trait]
impl TableRepository for InMemoryTableRepository {
    async fn save(&self, table: &Table) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().unwrap();
        tables.retain(|t| t.id() != table.id());
        tables.push(table.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TableId) -> Result<Option<Table>, RepositoryError> {
        Ok(self.tables.lock().unwrap().iter().find(|t| t.id() == id).cloned())
    }

    async fn find_by_restaurant(
        &self,
        restaurant_id: RestaurantId,
    ) -> Result<Vec<Table>, RepositoryError> {
        let mut tables: Vec<Table> = self
            .tables
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.restaurant_id() == restaurant_id)
            .cloned()
            .collect();
        tables.sort_by_key(|t| t.table_number());
        Ok(tables)
    }

    async fn delete(&self, id: TableId) -> Result<(), RepositoryError> {
        self.tables.lock().unwrap().retain(|t| t.id() != id);
        Ok(())
    }

    fn next_identity(&self) -> TableId {
        TableId::new()
    }
}

/// インメモリの予約リポジトリ
struct InMemoryReservationRepository {
    reservations: Mutex<Vec<Reservation>>,
}

#[async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn insert(&self, reservation: &Reservation) -> Result<(), RepositoryError> {
        let mut reservations = self.reservations.lock().unwrap();
        let conflict = reservations.iter().any(|r| {
            r.table_id() == reservation.table_id()
                && r.status().occupies_table()
                && r.span().overlaps(&reservation.span())
        });
        if conflict {
            return Err(RepositoryError::Conflict(
                "時間区間が既に予約されています".to_string(),
            ));
        }
        reservations.push(reservation.clone());
        Ok(())
    }

    async fn save(&self, reservation: &Reservation) -> Result<(), RepositoryError> {
        let mut reservations = self.reservations.lock().unwrap();
        reservations.retain(|r| r.id() != reservation.id());
        reservations.push(reservation.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: ReservationId,
    ) -> Result<Option<Reservation>, RepositoryError> {
        Ok(self
            .reservations
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id() == id)
            .cloned())
    }

    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Reservation>, RepositoryError> {
        Ok(self
            .reservations
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.booking_reference().as_str() == reference)
            .cloned())
    }

    async fn find_active_by_restaurant_and_date(
        &self,
        restaurant_id: RestaurantId,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, RepositoryError> {
        Ok(self
            .reservations
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                r.restaurant_id() == restaurant_id
                    && r.reservation_date() == date
                    && r.status().occupies_table()
            })
            .cloned()
            .collect())
    }

    async fn find_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Reservation>, RepositoryError> {
        let mut result: Vec<Reservation> = self
            .reservations
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.customer_id() == customer_id)
            .cloned()
            .collect();
        result.sort_by_key(|r| std::cmp::Reverse((r.reservation_date(), r.reservation_time())));
        Ok(result)
    }

    async fn find_by_restaurant(
        &self,
        restaurant_id: RestaurantId,
        date: Option<NaiveDate>,
        status: Option<ReservationStatus>,
    ) -> Result<Vec<Reservation>, RepositoryError> {
        let mut result: Vec<Reservation> = self
            .reservations
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.restaurant_id() == restaurant_id)
            .filter(|r| date.map_or(true, |d| r.reservation_date() == d))
            .filter(|r| status.map_or(true, |s| r.status() == s))
            .cloned()
            .collect();
        result.sort_by_key(|r| (r.reservation_date(), r.reservation_time()));
        Ok(result)
    }

    async fn reference_exists(&self, reference: &str) -> Result<bool, RepositoryError> {
        Ok(self
            .reservations
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.booking_reference().as_str() == reference))
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
        Ok(self
            .reservations
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                r.table_id() == table_id
                    && r.status().occupies_table()
                    && r.reservation_date() >= from
            })
            .count() as u64)
    }

    fn next_identity(&self) -> ReservationId {
        ReservationId::new()
    }
}

/// インメモリアダプタで組み立てたテストサーバー
/// 店舗は毎日17:00〜23:00営業、滞在120分、間隔30分、キャンセルポリシー5時間
fn build_server(tables: Vec<(u32, u32, TableLocation)>, now: DateTime<Utc>) -> (TestServer, RestaurantId) {
    let restaurant_id = RestaurantId::new();
    let opening_hours = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
    .into_iter()
    .map(|day| {
        OpeningHours::new(
            day,
            NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
            false,
        )
        .unwrap()
    })
    .collect();

    let config = RestaurantConfig::new(
        restaurant_id,
        "ビーチサイドダイニング".to_string(),
        opening_hours,
        vec![],
        120,
        30,
        5,
    )
    .unwrap();

    let tables = tables
        .into_iter()
        .map(|(number, capacity, location)| {
            Table::new(TableId::new(), restaurant_id, number, capacity, location, true).unwrap()
        })
        .collect();

    let restaurant_repository = Arc::new(InMemoryRestaurantRepository {
        configs: vec![config],
    });
    let table_repository = Arc::new(InMemoryTableRepository {
        tables: Mutex::new(tables),
    });
    let reservation_repository = Arc::new(InMemoryReservationRepository {
        reservations: Mutex::new(Vec::new()),
    });
    let logger = Arc::new(NullLogger);
    let clock = Arc::new(FixedClock { now });

    let reservation_service = Arc::new(ReservationApplicationService::new(
        restaurant_repository.clone(),
        table_repository.clone(),
        reservation_repository.clone(),
        Arc::new(NullEventPublisher),
        logger.clone(),
        clock.clone(),
    ));
    let query_service = Arc::new(ReservationQueryService::new(reservation_repository.clone()));
    let table_service = Arc::new(TableApplicationService::new(
        restaurant_repository,
        table_repository,
        reservation_repository,
        logger,
        clock,
    ));

    let state = AppStateInner {
        reservation_service,
        query_service,
        table_service,
    };
    let app = create_router().with_state(state);

    (TestServer::new(app).unwrap(), restaurant_id)
}

fn default_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap()
}

fn reservation_payload(restaurant_id: RestaurantId, time: &str) -> Value {
    json!({
        "restaurant_id": restaurant_id.as_uuid(),
        "customer_id": Uuid::new_v4(),
        "date": "2024-06-01",
        "time": time,
        "number_of_guests": 2
    })
}

#[tokio::test]
async fn test_health_check() {
    let (server, _) = build_server(vec![(1, 4, TableLocation::Standard)], default_now());

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_availability_endpoint() {
    let (server, restaurant_id) =
        build_server(vec![(1, 4, TableLocation::Standard)], default_now());

    let response = server
        .get(&format!("/restaurants/{}/availability", restaurant_id))
        .add_query_param("date", "2024-06-01")
        .add_query_param("party_size", 2)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["party_size"], 2);
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 9);
    assert_eq!(slots[0]["time"], "17:00");
    assert_eq!(slots[8]["time"], "21:00");
    assert!(slots.iter().all(|s| s["is_available"] == true));
}

#[tokio::test]
async fn test_availability_requires_query_params() {
    let (server, restaurant_id) =
        build_server(vec![(1, 4, TableLocation::Standard)], default_now());

    let response = server
        .get(&format!("/restaurants/{}/availability", restaurant_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_PARAMETER");
}

#[tokio::test]
async fn test_availability_unknown_restaurant_returns_404() {
    let (server, _) = build_server(vec![(1, 4, TableLocation::Standard)], default_now());

    let response = server
        .get(&format!("/restaurants/{}/availability", Uuid::new_v4()))
        .add_query_param("date", "2024-06-01")
        .add_query_param("party_size", 2)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_create_and_fetch_reservation() {
    let (server, restaurant_id) =
        build_server(vec![(1, 4, TableLocation::Standard)], default_now());

    let response = server
        .post("/reservations")
        .json(&reservation_payload(restaurant_id, "18:00:00"))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let created: Value = response.json();
    assert_eq!(created["status"], "Confirmed");
    assert_eq!(created["date"], "2024-06-01");
    assert_eq!(created["time"], "18:00");
    let reference = created["booking_reference"].as_str().unwrap();
    assert!(reference.starts_with("RES-20240520-"));

    // IDでも予約番号でも同じ予約が取れる
    let by_id: Value = server
        .get(&format!("/reservations/{}", created["reservation_id"].as_str().unwrap()))
        .await
        .json();
    assert_eq!(by_id["booking_reference"], reference);

    let by_reference: Value = server
        .get(&format!("/reservations/by-reference/{}", reference))
        .await
        .json();
    assert_eq!(by_reference["reservation_id"], created["reservation_id"]);
}

#[tokio::test]
async fn test_get_missing_reservation_returns_404() {
    let (server, _) = build_server(vec![(1, 4, TableLocation::Standard)], default_now());

    let response = server.get(&format!("/reservations/{}", Uuid::new_v4())).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_fully_booked_returns_409() {
    let (server, restaurant_id) =
        build_server(vec![(1, 4, TableLocation::Standard)], default_now());

    let first = server
        .post("/reservations")
        .json(&reservation_payload(restaurant_id, "18:00:00"))
        .await;
    assert_eq!(first.status_code(), StatusCode::CREATED);

    // 同じ1卓に重複する時間帯 → 満席
    let second = server
        .post("/reservations")
        .json(&reservation_payload(restaurant_id, "19:00:00"))
        .await;
    assert_eq!(second.status_code(), StatusCode::CONFLICT);

    let body: Value = second.json();
    assert_eq!(body["code"], "FULLY_BOOKED");
}

#[tokio::test]
async fn test_invalid_location_returns_400() {
    let (server, restaurant_id) =
        build_server(vec![(1, 4, TableLocation::Standard)], default_now());

    let mut payload = reservation_payload(restaurant_id, "18:00:00");
    payload["preferred_location"] = json!("Rooftop");

    let response = server.post("/reservations").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_LOCATION");
}

#[tokio::test]
async fn test_cancellation_flow() {
    // 予約開始のたっぷり前なのでキャンセル可能
    let (server, restaurant_id) =
        build_server(vec![(1, 4, TableLocation::Standard)], default_now());

    let created: Value = server
        .post("/reservations")
        .json(&reservation_payload(restaurant_id, "18:00:00"))
        .await
        .json();
    let reservation_id = created["reservation_id"].as_str().unwrap().to_string();

    let eligibility: Value = server
        .get(&format!("/reservations/{}/can-cancel", reservation_id))
        .await
        .json();
    assert_eq!(eligibility["can_cancel_or_modify"], true);

    let response = server
        .post(&format!("/reservations/{}/cancel", reservation_id))
        .json(&json!({ "reason": "予定変更" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let cancelled: Value = server
        .get(&format!("/reservations/{}", reservation_id))
        .await
        .json();
    assert_eq!(cancelled["status"], "Cancelled");
    assert_eq!(cancelled["cancellation_reason"], "予定変更");
}

#[tokio::test]
async fn test_late_cancellation_returns_409() {
    // 現在時刻が予約開始の3時間前（ポリシーは5時間）
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 15, 0, 0).unwrap();
    let (server, restaurant_id) = build_server(vec![(1, 4, TableLocation::Standard)], now);

    let created: Value = server
        .post("/reservations")
        .json(&reservation_payload(restaurant_id, "18:00:00"))
        .await
        .json();
    let reservation_id = created["reservation_id"].as_str().unwrap().to_string();

    let eligibility: Value = server
        .get(&format!("/reservations/{}/can-cancel", reservation_id))
        .await
        .json();
    assert_eq!(eligibility["can_cancel_or_modify"], false);

    let response = server
        .post(&format!("/reservations/{}/cancel", reservation_id))
        .json(&json!({}))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    let body: Value = response.json();
    assert_eq!(body["code"], "CANCELLATION_WINDOW_PASSED");
}

#[tokio::test]
async fn test_cancel_unknown_reservation_returns_404() {
    // 存在しない予約のキャンセルはポリシー違反の409ではなく404
    let (server, _) = build_server(vec![(1, 4, TableLocation::Standard)], default_now());

    let response = server
        .post(&format!("/reservations/{}/cancel", Uuid::new_v4()))
        .json(&json!({}))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_status_update_endpoint() {
    let (server, restaurant_id) =
        build_server(vec![(1, 4, TableLocation::Standard)], default_now());

    let created: Value = server
        .post("/reservations")
        .json(&reservation_payload(restaurant_id, "18:00:00"))
        .await
        .json();
    let reservation_id = created["reservation_id"].as_str().unwrap().to_string();

    let response = server
        .put(&format!("/reservations/{}/status", reservation_id))
        .json(&json!({ "status": "Seated" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "Seated");

    // 不正なステータス値は400
    let response = server
        .put(&format!("/reservations/{}/status", reservation_id))
        .json(&json!({ "status": "Teleported" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_STATUS");

    // Seated → Confirmed は不正な遷移
    let response = server
        .put(&format!("/reservations/{}/status", reservation_id))
        .json(&json!({ "status": "Confirmed" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_customer_reservation_history() {
    let (server, restaurant_id) = build_server(
        vec![(1, 4, TableLocation::Standard), (2, 4, TableLocation::Window)],
        default_now(),
    );
    let customer_id = Uuid::new_v4();

    for time in ["18:00:00", "20:30:00"] {
        let mut payload = reservation_payload(restaurant_id, time);
        payload["customer_id"] = json!(customer_id);
        let response = server.post("/reservations").json(&payload).await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
    }

    let history: Value = server
        .get(&format!("/customers/{}/reservations", customer_id))
        .await
        .json();
    let reservations = history.as_array().unwrap();
    assert_eq!(reservations.len(), 2);
    // 新しい予約が先頭
    assert_eq!(reservations[0]["time"], "20:30");
    assert_eq!(reservations[1]["time"], "18:00");
}

#[tokio::test]
async fn test_restaurant_reservations_with_status_filter() {
    let (server, restaurant_id) = build_server(
        vec![(1, 4, TableLocation::Standard), (2, 4, TableLocation::Window)],
        default_now(),
    );

    let first: Value = server
        .post("/reservations")
        .json(&reservation_payload(restaurant_id, "18:00:00"))
        .await
        .json();
    server
        .post("/reservations")
        .json(&reservation_payload(restaurant_id, "20:30:00"))
        .await
        .json::<Value>();
    server
        .post(&format!(
            "/reservations/{}/cancel",
            first["reservation_id"].as_str().unwrap()
        ))
        .json(&json!({}))
        .await;

    let all: Value = server
        .get(&format!("/restaurants/{}/reservations", restaurant_id))
        .add_query_param("date", "2024-06-01")
        .await
        .json();
    assert_eq!(all.as_array().unwrap().len(), 2);

    let cancelled: Value = server
        .get(&format!("/restaurants/{}/reservations", restaurant_id))
        .add_query_param("status", "Cancelled")
        .await
        .json();
    let cancelled = cancelled.as_array().unwrap();
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0]["reservation_id"], first["reservation_id"]);

    let response = server
        .get(&format!("/restaurants/{}/reservations", restaurant_id))
        .add_query_param("status", "Imaginary")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_table_administration_endpoints() {
    let (server, restaurant_id) =
        build_server(vec![(1, 4, TableLocation::Standard)], default_now());

    // 一覧には予約件数が載る
    let tables: Value = server
        .get(&format!("/restaurants/{}/tables", restaurant_id))
        .await
        .json();
    let tables = tables.as_array().unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0]["active_reservations"], 0);

    // 追加
    let response = server
        .post(&format!("/restaurants/{}/tables", restaurant_id))
        .json(&json!({
            "table_number": 2,
            "seating_capacity": 6,
            "location": "Terrace"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let added: Value = response.json();
    assert_eq!(added["seating_capacity"], 6);
    assert_eq!(added["location"], "Terrace");

    // 削除
    let table_id = added["table_id"].as_str().unwrap();
    let response = server.delete(&format!("/tables/{}", table_id)).await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let tables: Value = server
        .get(&format!("/restaurants/{}/tables", restaurant_id))
        .await
        .json();
    assert_eq!(tables.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_table_deletion_blocked_while_reserved() {
    let (server, restaurant_id) =
        build_server(vec![(1, 4, TableLocation::Standard)], default_now());

    let created: Value = server
        .post("/reservations")
        .json(&reservation_payload(restaurant_id, "18:00:00"))
        .await
        .json();
    let table_id = created["table_id"].as_str().unwrap().to_string();

    let response = server.delete(&format!("/tables/{}", table_id)).await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["code"], "TABLE_IN_USE");

    // キャンセル後は削除できる
    server
        .post(&format!(
            "/reservations/{}/cancel",
            created["reservation_id"].as_str().unwrap()
        ))
        .json(&json!({}))
        .await;
    let response = server.delete(&format!("/tables/{}", table_id)).await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
}

use restaurant_reservation_management::adapter::driven::{
    ConsoleEventPublisher, ConsoleLogger, MySqlReservationRepository, MySqlRestaurantRepository,
    MySqlTableRepository, SystemClock,
};
use restaurant_reservation_management::adapter::driver::rest_api::{create_router, AppStateInner};
use restaurant_reservation_management::adapter::{DatabaseConfig, DatabaseMigration};
use restaurant_reservation_management::application::service::{
    ReservationApplicationService, ReservationQueryService, TableApplicationService,
};

use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== レストラン予約管理システム REST API ===");
    println!();

    // .envファイルから環境変数を読み込む
    dotenvy::dotenv().ok();

    // データベース設定を読み込む
    let config = DatabaseConfig::from_env()?;
    println!(
        "データベース設定を読み込みました: {}:{}",
        config.host, config.port
    );

    // 接続プールを作成
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.connection_string())
        .await?;
    println!("データベース接続プールを作成しました");

    // マイグレーションを実行
    let migration = DatabaseMigration::new(pool.clone());
    migration.run().await?;
    println!("データベースマイグレーションを実行しました");

    // MySQLリポジトリを作成
    let restaurant_repository = Arc::new(MySqlRestaurantRepository::new(pool.clone()));
    let table_repository = Arc::new(MySqlTableRepository::new(pool.clone()));
    let reservation_repository = Arc::new(MySqlReservationRepository::new(pool.clone()));

    // ロガー・イベント発行者・時計を作成
    let logger = Arc::new(ConsoleLogger::new());
    let event_publisher = Arc::new(ConsoleEventPublisher::new());
    let clock = Arc::new(SystemClock::new());

    // アプリケーションサービスを作成
    let reservation_service = ReservationApplicationService::new(
        restaurant_repository.clone(),
        table_repository.clone(),
        reservation_repository.clone(),
        event_publisher,
        logger.clone(),
        clock.clone(),
    );
    let query_service = ReservationQueryService::new(reservation_repository.clone());
    let table_service = TableApplicationService::new(
        restaurant_repository,
        table_repository,
        reservation_repository,
        logger,
        clock,
    );

    // アプリケーション状態を作成
    let app_state = AppStateInner {
        reservation_service: Arc::new(reservation_service),
        query_service: Arc::new(query_service),
        table_service: Arc::new(table_service),
    };

    // REST APIルーターを作成
    let app = create_router()
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // サーバーを起動
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    println!("REST APIサーバーが起動しました: http://localhost:3000");
    println!("ヘルスチェック: GET http://localhost:3000/health");
    println!("API仕様:");
    println!("  GET    /restaurants/:id/availability?date=&party_size= - 空き時間枠の照会");
    println!("  POST   /reservations - 予約作成");
    println!("  GET    /reservations/:id - 予約詳細取得");
    println!("  GET    /reservations/by-reference/:reference - 予約番号での取得");
    println!("  GET    /reservations/:id/can-cancel - キャンセル可否判定");
    println!("  POST   /reservations/:id/cancel - 予約キャンセル");
    println!("  PUT    /reservations/:id/status - 予約ステータス変更");
    println!("  GET    /customers/:id/reservations - 顧客の予約履歴");
    println!("  GET    /restaurants/:id/reservations - レストランの予約一覧");
    println!("  GET    /restaurants/:id/tables - テーブル一覧");
    println!("  POST   /restaurants/:id/tables - テーブル追加");
    println!("  DELETE /tables/:id - テーブル削除");
    println!();

    axum::serve(listener, app).await?;

    Ok(())
}

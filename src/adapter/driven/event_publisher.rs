use crate::domain::event::DomainEvent;
use crate::domain::port::{EventPublisher, PublisherError};
use async_trait::async_trait;

/// コンソールイベント発行者
/// ドメインイベントをコンソールに出力する
pub struct ConsoleEventPublisher;

impl ConsoleEventPublisher {
    /// 新しいコンソールイベント発行者を作成
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleEventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for ConsoleEventPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), PublisherError> {
        match event {
            DomainEvent::ReservationConfirmed(e) => {
                println!("🍽️ [イベント] 予約確定");
                println!("  予約番号: {}", e.booking_reference);
                println!("  予約ID: {:?}", e.reservation_id);
                println!("  テーブルID: {:?}", e.table_id);
                println!("  人数: {}名", e.number_of_guests);
                println!(
                    "  利用時間: {} 〜 {}",
                    e.span.start().format("%Y-%m-%d %H:%M"),
                    e.span.end().format("%H:%M")
                );
                println!("  発生日時: {}", e.occurred_at.format("%Y-%m-%d %H:%M:%S"));
            }
            DomainEvent::ReservationCancelled(e) => {
                println!("❌ [イベント] 予約キャンセル");
                println!("  予約番号: {}", e.booking_reference);
                println!("  予約ID: {:?}", e.reservation_id);
                println!("  キャンセル理由: {}", e.reason);
                println!("  発生日時: {}", e.occurred_at.format("%Y-%m-%d %H:%M:%S"));
            }
        }
        println!(); // 空行を追加
        Ok(())
    }
}

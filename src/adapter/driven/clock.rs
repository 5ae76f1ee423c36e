use crate::domain::port::Clock;
use chrono::{DateTime, Utc};

/// システム時計
/// 実際の現在時刻を返すClock実装
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

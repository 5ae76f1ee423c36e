/// ドメイン層のエラー型
/// ビジネスルール違反を表現する
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 営業時間の定義が不正（例: 営業日なのに開店時刻と閉店時刻が同じ）
    InvalidOpeningHours(String),
    /// 無効な人数（例: 0人での予約）
    InvalidPartySize,
    /// 無効な予約状態（例: キャンセル済みの予約を着席済みにしようとした）
    InvalidReservationState(String),
    /// 予約番号の形式が不正
    InvalidBookingReference(String),
    /// 条件を満たす空きテーブルがない
    NoTableAvailable,
    /// 今後の予約が残っているテーブルは削除できない
    TableHasActiveReservations,
    /// 無効な値
    InvalidValue(String),
    /// リポジトリ操作の失敗（ドメインサービス内での永続化エラー）
    RepositoryError(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::InvalidOpeningHours(msg) => write!(f, "Invalid opening hours: {}", msg),
            DomainError::InvalidPartySize => write!(f, "Invalid party size"),
            DomainError::InvalidReservationState(msg) => {
                write!(f, "Invalid reservation state: {}", msg)
            }
            DomainError::InvalidBookingReference(msg) => {
                write!(f, "Invalid booking reference: {}", msg)
            }
            DomainError::NoTableAvailable => write!(f, "No table available"),
            DomainError::TableHasActiveReservations => {
                write!(f, "Table has active reservations")
            }
            DomainError::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
            DomainError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

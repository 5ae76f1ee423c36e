use crate::domain::error::DomainError;
use crate::domain::model::{RestaurantId, TableId, TableLocation};

/// テーブルエンティティ
/// レストランの座席在庫1卓分を表す
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    id: TableId,
    restaurant_id: RestaurantId,
    table_number: u32,
    seating_capacity: u32,
    location: TableLocation,
    is_available: bool,
}

impl Table {
    /// 新しいテーブルを作成
    /// 座席数は1以上である必要がある
    pub fn new(
        id: TableId,
        restaurant_id: RestaurantId,
        table_number: u32,
        seating_capacity: u32,
        location: TableLocation,
        is_available: bool,
    ) -> Result<Self, DomainError> {
        if seating_capacity == 0 {
            return Err(DomainError::InvalidValue(
                "座席数は1以上である必要があります".to_string(),
            ));
        }
        Ok(Self {
            id,
            restaurant_id,
            table_number,
            seating_capacity,
            location,
            is_available,
        })
    }

    /// テーブルIDを取得
    pub fn id(&self) -> TableId {
        self.id
    }

    /// 所属レストランIDを取得
    pub fn restaurant_id(&self) -> RestaurantId {
        self.restaurant_id
    }

    /// 卓番号を取得
    pub fn table_number(&self) -> u32 {
        self.table_number
    }

    /// 座席数を取得
    pub fn seating_capacity(&self) -> u32 {
        self.seating_capacity
    }

    /// 設置場所を取得
    pub fn location(&self) -> TableLocation {
        self.location
    }

    /// 割当対象かどうか（管理者が無効化したテーブルは割当から除外される）
    pub fn is_available(&self) -> bool {
        self.is_available
    }

    /// 指定された人数を収容でき、かつ割当可能な状態かどうか
    pub fn can_seat(&self, party_size: u32) -> bool {
        self.is_available && self.seating_capacity >= party_size
    }
}

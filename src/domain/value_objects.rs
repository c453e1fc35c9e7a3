use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 蔵書ID - カタログの集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId(Uuid);

impl BookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

/// 貸出ID - 貸出台帳の集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorrowId(Uuid);

impl BorrowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for BorrowId {
    fn default() -> Self {
        Self::new()
    }
}

/// 予約ID - 予約キューの集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReservationId(Uuid);

impl ReservationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for ReservationId {
    fn default() -> Self {
        Self::new()
    }
}

/// 利用者ID - 認証コンテキストへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

/// 在庫数エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// 貸出可能な冊数がない
    NoCopiesAvailable,
    /// 貸出可能冊数が所蔵冊数を超えている
    AvailableExceedsTotal { total: u32, available: u32 },
}

/// 在庫数
///
/// 不変条件：0 ≤ 貸出可能冊数 ≤ 所蔵冊数
/// 型システムでこの制約を強制し、不正な組み合わせを作成できないようにする。
/// 所蔵冊数は登録時に決まり、貸出・返却では変化しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    copies_total: u32,
    copies_available: u32,
}

impl Inventory {
    /// 新規登録（全冊貸出可能）
    pub fn new(copies_total: u32) -> Self {
        Self {
            copies_total,
            copies_available: copies_total,
        }
    }

    /// 永続化された冊数から復元する
    ///
    /// # エラー
    /// 貸出可能冊数が所蔵冊数を超える場合は`InventoryError::AvailableExceedsTotal`
    pub fn from_counts(copies_total: u32, copies_available: u32) -> Result<Self, InventoryError> {
        if copies_available > copies_total {
            return Err(InventoryError::AvailableExceedsTotal {
                total: copies_total,
                available: copies_available,
            });
        }
        Ok(Self {
            copies_total,
            copies_available,
        })
    }

    /// 1冊貸し出す
    ///
    /// # エラー
    /// 貸出可能冊数が0の場合は`InventoryError::NoCopiesAvailable`を返す
    pub fn checkout(self) -> Result<Self, InventoryError> {
        if self.copies_available == 0 {
            return Err(InventoryError::NoCopiesAvailable);
        }
        Ok(Self {
            copies_available: self.copies_available - 1,
            ..self
        })
    }

    /// 1冊返却される
    ///
    /// 所蔵冊数で頭打ちにする（二重返却で上限を超えないように）。
    pub fn checkin(self) -> Self {
        Self {
            copies_available: self.copies_available.saturating_add(1).min(self.copies_total),
            ..self
        }
    }

    pub fn copies_total(&self) -> u32 {
        self.copies_total
    }

    pub fn copies_available(&self) -> u32 {
        self.copies_available
    }

    /// 貸出可能か（1冊以上残っているか）
    pub fn is_available(&self) -> bool {
        self.copies_available > 0
    }
}

/// 1日あたりの延滞料金
pub const FINE_PER_DAY: u32 = 5;

/// 延滞料金
///
/// 返却期限を過ぎた満日数 × 5 で計算される。負の値は持たない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fine(u32);

impl Fine {
    /// 延滞日数から延滞料金を計算する
    ///
    /// 負の日数（期限前）は0として扱う。
    pub fn for_days_late(days_late: i64) -> Self {
        let days = u32::try_from(days_late.max(0)).unwrap_or(u32::MAX);
        Self(days.saturating_mul(FINE_PER_DAY))
    }

    pub fn amount(&self) -> u32 {
        self.0
    }
}

impl TryFrom<i32> for Fine {
    type Error = std::num::TryFromIntError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(Self(u32::try_from(value)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_new_is_fully_available() {
        let inventory = Inventory::new(3);
        assert_eq!(inventory.copies_total(), 3);
        assert_eq!(inventory.copies_available(), 3);
        assert!(inventory.is_available());
    }

    #[test]
    fn test_inventory_checkout_decrements_by_one() {
        let inventory = Inventory::new(2).checkout().unwrap();
        assert_eq!(inventory.copies_available(), 1);
        assert_eq!(inventory.copies_total(), 2);
    }

    #[test]
    fn test_inventory_checkout_fails_at_zero() {
        let inventory = Inventory::new(1).checkout().unwrap();
        assert!(!inventory.is_available());

        let result = inventory.checkout();
        assert_eq!(result.unwrap_err(), InventoryError::NoCopiesAvailable);
    }

    #[test]
    fn test_inventory_checkin_is_clamped_to_total() {
        let inventory = Inventory::new(2);
        let inventory = inventory.checkin();
        assert_eq!(inventory.copies_available(), 2);

        let inventory = inventory.checkout().unwrap().checkin().checkin();
        assert_eq!(inventory.copies_available(), 2);
    }

    #[test]
    fn test_inventory_zero_copies_book() {
        let inventory = Inventory::new(0);
        assert!(!inventory.is_available());
        assert_eq!(inventory.checkin().copies_available(), 0);
    }

    #[test]
    fn test_inventory_from_counts() {
        let inventory = Inventory::from_counts(3, 1).unwrap();
        assert_eq!(inventory.copies_available(), 1);

        let result = Inventory::from_counts(3, 4);
        assert_eq!(
            result.unwrap_err(),
            InventoryError::AvailableExceedsTotal {
                total: 3,
                available: 4
            }
        );
    }

    #[test]
    fn test_fine_for_days_late() {
        assert_eq!(Fine::for_days_late(3).amount(), 15);
        assert_eq!(Fine::for_days_late(0).amount(), 0);
        assert_eq!(Fine::for_days_late(-2).amount(), 0);
    }

    #[test]
    fn test_fine_try_from_negative_fails() {
        assert_eq!(Fine::try_from(10).unwrap().amount(), 10);
        assert!(Fine::try_from(-1).is_err());
    }

    #[test]
    fn test_id_creation() {
        assert_ne!(BookId::new(), BookId::new());
        assert_ne!(BorrowId::new(), BorrowId::new());
        assert_ne!(ReservationId::new(), ReservationId::new());
        assert_ne!(UserId::new(), UserId::new());
    }

    #[test]
    fn test_user_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = UserId::from_uuid(uuid);
        assert_eq!(id.value(), uuid);
    }
}

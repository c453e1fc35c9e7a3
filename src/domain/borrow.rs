use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{
    BookBorrowed, BookId, BookReturned, BorrowBookError, BorrowId, Fine, ReturnBookError, UserId,
    book::Book,
};

/// 貸出期間（日数）
pub const BORROW_PERIOD_DAYS: i64 = 14;

// ============================================================================
// 型安全な状態パターン
// ============================================================================

/// Borrow集約の共通フィールド
///
/// すべての貸出状態（Active, Returned）で共有されるコアデータ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowCore {
    // 識別子
    pub borrow_id: BorrowId,

    // 他の集約への参照（IDのみ）
    pub user_id: UserId,
    pub book_id: BookId,

    // 貸出期間
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

/// 貸出中状態
///
/// ビジネスルール：
/// - returned_dateを持たない
/// - 返却のみ可能
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveBorrow {
    #[serde(flatten)]
    pub core: BorrowCore,
}

impl std::ops::Deref for ActiveBorrow {
    type Target = BorrowCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// 返却済み状態
///
/// ビジネスルール：
/// - returned_dateが必須（型で保証）
/// - 延滞料金は期限超過時のみ設定
/// - 終端状態（これ以上の遷移なし）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnedBorrow {
    #[serde(flatten)]
    pub core: BorrowCore,
    pub returned_date: DateTime<Utc>,
    pub fine: Option<Fine>,
}

impl std::ops::Deref for ReturnedBorrow {
    type Target = BorrowCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

impl ReturnedBorrow {
    /// 返却を取り消して貸出中に戻す
    ///
    /// 返却処理の途中で在庫の戻しに失敗した場合の補償処理専用。
    pub fn reopen(self) -> ActiveBorrow {
        ActiveBorrow { core: self.core }
    }
}

/// Borrow集約の統合型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Borrow {
    Active(ActiveBorrow),
    Returned(ReturnedBorrow),
}

impl Borrow {
    pub fn core(&self) -> &BorrowCore {
        match self {
            Borrow::Active(active) => &active.core,
            Borrow::Returned(returned) => &returned.core,
        }
    }

    pub fn borrow_id(&self) -> BorrowId {
        self.core().borrow_id
    }

    pub fn user_id(&self) -> UserId {
        self.core().user_id
    }

    pub fn book_id(&self) -> BookId {
        self.core().book_id
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Borrow::Active(_))
    }

    pub fn returned_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Borrow::Active(_) => None,
            Borrow::Returned(returned) => Some(returned.returned_date),
        }
    }

    pub fn fine(&self) -> Option<Fine> {
        match self {
            Borrow::Active(_) => None,
            Borrow::Returned(returned) => returned.fine,
        }
    }
}

/// 返却時点での延滞判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lateness {
    /// 返却期限以前（期限ちょうどを含む）
    OnTime,
    /// 返却期限超過
    Late { days_late: i64, fine: Fine },
}

/// 純粋関数：延滞判定と延滞料金の計算
///
/// ビジネスルール：
/// - returned_at > due_date の場合のみ延滞
/// - 延滞日数は満日数（切り捨て）
/// - 1日未満の超過は延滞扱いだが料金は0
pub fn assess_lateness(due_date: DateTime<Utc>, returned_at: DateTime<Utc>) -> Lateness {
    if returned_at <= due_date {
        return Lateness::OnTime;
    }

    let days_late = (returned_at - due_date).num_days();
    Lateness::Late {
        days_late,
        fine: Fine::for_days_late(days_late),
    }
}

/// 純粋関数：蔵書を借りる
///
/// ビジネスルール：
/// - 貸出可能冊数が1冊以上あること
/// - 貸出期間は14日間
/// - 同じ利用者による同じ蔵書の重複貸出は許可する
///
/// 副作用なし。在庫の減算は呼び出し側がカタログに対して原子的に行う。
pub fn borrow_book(
    book: &Book,
    user_id: UserId,
    borrowed_at: DateTime<Utc>,
) -> Result<(ActiveBorrow, BookBorrowed), BorrowBookError> {
    if !book.inventory.is_available() {
        return Err(BorrowBookError::NoCopiesAvailable);
    }

    let borrow_id = BorrowId::new();
    let due_date = borrowed_at + Duration::days(BORROW_PERIOD_DAYS);

    let borrow = ActiveBorrow {
        core: BorrowCore {
            borrow_id,
            user_id,
            book_id: book.book_id,
            borrow_date: borrowed_at,
            due_date,
        },
    };

    let event = BookBorrowed {
        borrow_id,
        book_id: book.book_id,
        user_id,
        borrow_date: borrowed_at,
        due_date,
    };

    Ok((borrow, event))
}

/// 純粋関数：蔵書を返却する
///
/// ビジネスルール：
/// - Active状態のみ受け付ける（Returnedは二重返却としてエラー）
/// - 延滞時は満日数 × 5 の延滞料金を記録する
///
/// 副作用なし。ReturnedBorrowとイベントを返す。
pub fn return_book(
    borrow: Borrow,
    returned_at: DateTime<Utc>,
) -> Result<(ReturnedBorrow, BookReturned), ReturnBookError> {
    let active = match borrow {
        Borrow::Active(active) => active,
        Borrow::Returned(_) => return Err(ReturnBookError::AlreadyReturned),
    };

    let (days_late, fine) = match assess_lateness(active.due_date, returned_at) {
        Lateness::OnTime => (0, None),
        Lateness::Late { days_late, fine } => (days_late, Some(fine)),
    };

    let event = BookReturned {
        borrow_id: active.borrow_id,
        book_id: active.book_id,
        user_id: active.user_id,
        returned_date: returned_at,
        days_late,
        fine,
    };

    let returned = ReturnedBorrow {
        core: active.core,
        returned_date: returned_at,
        fine,
    };

    Ok((returned, event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Inventory, book::Book};
    use chrono::TimeZone;

    fn book_with_copies(total: u32, available: u32) -> Book {
        Book {
            book_id: BookId::new(),
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            category: "Science Fiction".to_string(),
            isbn: "9780441013593".to_string(),
            description: String::new(),
            inventory: Inventory::from_counts(total, available).unwrap(),
            ebook: None,
            cover_image: None,
            created_at: Utc::now(),
        }
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    /// 返却期限が2024-01-01になる貸出
    fn borrow_due_new_year() -> ActiveBorrow {
        let book = book_with_copies(1, 1);
        let borrowed_at = at(2024, 1, 1) - Duration::days(BORROW_PERIOD_DAYS);
        let (borrow, _) = borrow_book(&book, UserId::new(), borrowed_at).unwrap();
        borrow
    }

    #[test]
    fn test_borrow_book_creates_active_borrow_due_in_14_days() {
        let book = book_with_copies(3, 2);
        let user_id = UserId::new();
        let borrowed_at = Utc::now();

        let (borrow, event) = borrow_book(&book, user_id, borrowed_at).unwrap();

        assert_eq!(borrow.due_date, borrowed_at + Duration::days(14));
        assert_eq!(borrow.borrow_date, borrowed_at);
        assert_eq!(borrow.book_id, book.book_id);
        assert_eq!(borrow.user_id, user_id);

        assert_eq!(event.borrow_id, borrow.borrow_id);
        assert_eq!(event.due_date, borrow.due_date);
    }

    #[test]
    fn test_borrow_book_fails_without_available_copies() {
        let book = book_with_copies(2, 0);

        let result = borrow_book(&book, UserId::new(), Utc::now());
        assert_eq!(result.unwrap_err(), BorrowBookError::NoCopiesAvailable);
    }

    #[test]
    fn test_return_three_days_late_charges_fifteen() {
        let borrow = borrow_due_new_year();

        let (returned, event) = return_book(Borrow::Active(borrow), at(2024, 1, 4)).unwrap();

        assert_eq!(returned.fine, Some(Fine::for_days_late(3)));
        assert_eq!(returned.fine.map(|f| f.amount()), Some(15));
        assert_eq!(event.days_late, 3);
        assert!(event.was_overdue());
    }

    #[test]
    fn test_return_exactly_on_due_date_has_no_fine() {
        let borrow = borrow_due_new_year();

        let (returned, event) = return_book(Borrow::Active(borrow), at(2024, 1, 1)).unwrap();

        assert_eq!(returned.returned_date, at(2024, 1, 1));
        assert!(returned.fine.is_none());
        assert!(!event.was_overdue());
    }

    #[test]
    fn test_return_early_has_no_fine() {
        let borrow = borrow_due_new_year();

        let (returned, _) = return_book(Borrow::Active(borrow), at(2023, 12, 30)).unwrap();
        assert!(returned.fine.is_none());
    }

    #[test]
    fn test_return_less_than_a_day_late_records_zero_fine() {
        let borrow = borrow_due_new_year();
        let returned_at = at(2024, 1, 1) + Duration::hours(5);

        let (returned, event) = return_book(Borrow::Active(borrow), returned_at).unwrap();

        assert_eq!(returned.fine.map(|f| f.amount()), Some(0));
        assert_eq!(event.days_late, 0);
        assert!(event.was_overdue());
    }

    #[test]
    fn test_partial_days_are_truncated() {
        let due = at(2024, 1, 1);
        let lateness = assess_lateness(due, due + Duration::days(2) + Duration::hours(23));

        assert_eq!(
            lateness,
            Lateness::Late {
                days_late: 2,
                fine: Fine::for_days_late(2)
            }
        );
    }

    #[test]
    fn test_return_fails_when_already_returned() {
        let borrow = borrow_due_new_year();
        let (returned, _) = return_book(Borrow::Active(borrow), at(2023, 12, 25)).unwrap();

        let result = return_book(Borrow::Returned(returned), at(2023, 12, 26));
        assert_eq!(result.unwrap_err(), ReturnBookError::AlreadyReturned);
    }

    #[test]
    fn test_reopen_restores_active_state() {
        let borrow = borrow_due_new_year();
        let borrow_id = borrow.borrow_id;
        let (returned, _) = return_book(Borrow::Active(borrow), at(2024, 1, 10)).unwrap();

        let reopened = returned.reopen();
        assert_eq!(reopened.borrow_id, borrow_id);
        assert!(Borrow::Active(reopened).returned_date().is_none());
    }

    #[test]
    fn test_borrow_accessors() {
        let borrow = borrow_due_new_year();
        let user_id = borrow.user_id;
        let (returned, _) = return_book(Borrow::Active(borrow), at(2024, 1, 3)).unwrap();
        let borrow = Borrow::Returned(returned);

        assert!(!borrow.is_active());
        assert_eq!(borrow.user_id(), user_id);
        assert_eq!(borrow.returned_date(), Some(at(2024, 1, 3)));
        assert_eq!(borrow.fine().map(|f| f.amount()), Some(10));
    }
}

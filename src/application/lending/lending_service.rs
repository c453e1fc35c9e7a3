use crate::application::ServiceDependencies;
use crate::application::catalog::{UNKNOWN_TITLE, resolve_titles};
use crate::domain::{
    self, BookReturned, BorrowId, UserId,
    borrow::{ActiveBorrow, Borrow},
    commands::{BorrowBook, ReturnBook},
};
use crate::ports::CheckoutOutcome;

use super::errors::{LendingApplicationError, Result};

/// 返却結果
///
/// 利用者に表示するメッセージの元になる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnOutcome {
    pub borrow_id: BorrowId,
    pub book_id: domain::BookId,
    pub on_time: bool,
    pub days_late: i64,
    /// 延滞料金（期限内の返却は0）
    pub fine: u32,
}

impl ReturnOutcome {
    fn from_event(event: &BookReturned) -> Self {
        Self {
            borrow_id: event.borrow_id,
            book_id: event.book_id,
            on_time: !event.was_overdue(),
            days_late: event.days_late,
            fine: event.fine.map(|f| f.amount()).unwrap_or(0),
        }
    }

    pub fn message(&self) -> String {
        if self.on_time {
            "Book returned on time. Thank you!".to_string()
        } else {
            format!(
                "Book returned. Late by {} days. Fine: {} units.",
                self.days_late, self.fine
            )
        }
    }
}

/// 利用者の貸出一覧の1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowSummary {
    pub borrow: Borrow,
    /// 蔵書が削除済みの場合は"Unknown"
    pub title: String,
}

/// 蔵書を借りる
///
/// ビジネスルール：
/// - 蔵書が存在すること
/// - 貸出可能冊数が1冊以上あること
/// - 返却期限は貸出日時の14日後
///
/// # 一貫性保証
///
/// 在庫の減算はカタログストアの条件付き更新で行い、
/// 最後の1冊を並行して借りようとしても成功するのは1件だけ。
/// 貸出記録の保存に失敗した場合は在庫を戻してからエラーを返す。
pub async fn borrow_book(deps: &ServiceDependencies, cmd: BorrowBook) -> Result<ActiveBorrow> {
    // 1. 蔵書の存在確認
    let book = deps
        .catalog_store
        .get_by_id(cmd.book_id)
        .await
        .map_err(LendingApplicationError::CatalogStoreError)?
        .ok_or(LendingApplicationError::BookNotFound)?;

    // 2. ドメインロジック実行（純粋関数）
    let (borrow, event) = domain::borrow::borrow_book(&book, cmd.user_id, cmd.borrowed_at)?;

    // 3. 在庫の条件付き減算
    let checkout = deps
        .catalog_store
        .try_checkout(cmd.book_id)
        .await
        .map_err(LendingApplicationError::CatalogStoreError)?;

    match checkout {
        CheckoutOutcome::CheckedOut(_) => {}
        CheckoutOutcome::Unavailable => return Err(LendingApplicationError::BookUnavailable),
        CheckoutOutcome::NotFound => return Err(LendingApplicationError::BookNotFound),
    }

    // 4. 貸出記録の保存（失敗時は在庫を戻す）
    if let Err(err) = deps.lending_ledger.insert(borrow.clone()).await {
        tracing::error!(
            book_id = %cmd.book_id.value(),
            "Failed to record borrow, restoring inventory: {}",
            err
        );
        if let Err(compensation_err) = deps.catalog_store.checkin(cmd.book_id).await {
            tracing::error!(
                book_id = %cmd.book_id.value(),
                "Failed to restore inventory: {}",
                compensation_err
            );
        }
        return Err(LendingApplicationError::LendingLedgerError(err));
    }

    tracing::info!(
        borrow_id = %event.borrow_id.value(),
        user_id = %event.user_id.value(),
        due_date = %event.due_date,
        "Book borrowed: {}",
        book.title
    );

    Ok(borrow)
}

/// 蔵書を返却する
///
/// ビジネスルール：
/// - 貸出中の記録のみ返却できる（二重返却はエラー）
/// - 返却期限を過ぎた場合は満日数 × 5 の延滞料金
/// - 返却者が貸出者本人かどうかは検証しない
///
/// # 一貫性保証
///
/// 返却済みへの更新は貸出中の場合のみ成功するため、並行する二重返却で
/// 在庫が2回戻ることはない。在庫の戻しに失敗した場合は貸出中に戻す。
/// 返却成功後、その蔵書の最も古い未充足の予約者に通知する（失敗しても返却は成功）。
pub async fn return_book(deps: &ServiceDependencies, cmd: ReturnBook) -> Result<ReturnOutcome> {
    // 1. 貸出記録の取得
    let borrow = deps
        .lending_ledger
        .get_by_id(cmd.borrow_id)
        .await
        .map_err(LendingApplicationError::LendingLedgerError)?
        .ok_or(LendingApplicationError::BorrowNotFound)?;

    if borrow.user_id() != cmd.returned_by {
        tracing::warn!(
            borrow_id = %cmd.borrow_id.value(),
            borrower = %borrow.user_id().value(),
            returned_by = %cmd.returned_by.value(),
            "Book returned by a different user than the borrower"
        );
    }

    // 2. ドメインロジック実行（純粋関数）
    let (returned, event) = domain::borrow::return_book(borrow, cmd.returned_at)?;

    // 3. 条件付きで返却済みに更新
    let updated = deps
        .lending_ledger
        .mark_returned(&returned)
        .await
        .map_err(LendingApplicationError::LendingLedgerError)?;

    if !updated {
        return Err(LendingApplicationError::AlreadyReturned);
    }

    // 4. 在庫を戻す（失敗時は貸出中に戻す）
    match deps.catalog_store.checkin(event.book_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            tracing::warn!(
                book_id = %event.book_id.value(),
                "Returned book is no longer in the catalog"
            );
        }
        Err(err) => {
            tracing::error!(
                borrow_id = %event.borrow_id.value(),
                "Failed to restore inventory, reopening borrow: {}",
                err
            );
            match deps.lending_ledger.reopen(&returned).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(
                        borrow_id = %event.borrow_id.value(),
                        "Borrow was changed by another request, not reopened"
                    );
                }
                Err(compensation_err) => {
                    tracing::error!(
                        borrow_id = %event.borrow_id.value(),
                        "Failed to reopen borrow: {}",
                        compensation_err
                    );
                }
            }
            return Err(LendingApplicationError::CatalogStoreError(err));
        }
    }

    tracing::info!(
        borrow_id = %event.borrow_id.value(),
        days_late = event.days_late,
        fine = event.fine.map(|f| f.amount()).unwrap_or(0),
        "Book returned"
    );

    // 5. 次の予約者への通知
    notify_next_reservation_holder(deps, &event).await;

    Ok(ReturnOutcome::from_event(&event))
}

/// 返却された蔵書の最も古い未充足の予約者に通知する
///
/// 失敗はログに記録するだけで返却結果には影響しない。
async fn notify_next_reservation_holder(deps: &ServiceDependencies, event: &BookReturned) {
    let reservation = match deps
        .reservation_queue
        .next_unfulfilled_for_book(event.book_id)
        .await
    {
        Ok(Some(reservation)) => reservation,
        Ok(None) => return,
        Err(err) => {
            tracing::warn!(
                book_id = %event.book_id.value(),
                "Failed to look up reservations: {}",
                err
            );
            return;
        }
    };

    let title = match deps.catalog_store.get_by_id(event.book_id).await {
        Ok(Some(book)) => book.title,
        _ => UNKNOWN_TITLE.to_string(),
    };

    if let Err(err) = deps
        .notification_service
        .notify_reservation_holder(&reservation, &title, event)
        .await
    {
        tracing::warn!(
            reservation_id = %reservation.reservation_id.value(),
            "Failed to notify reservation holder: {}",
            err
        );
    }
}

/// 利用者の全貸出（返却済みを含む）を蔵書タイトル付きで取得する
pub async fn list_borrows_for_user(
    deps: &ServiceDependencies,
    user_id: UserId,
) -> Result<Vec<BorrowSummary>> {
    let borrows = deps
        .lending_ledger
        .find_by_user_id(user_id)
        .await
        .map_err(LendingApplicationError::LendingLedgerError)?;

    let titles = resolve_titles(
        deps.catalog_store.as_ref(),
        borrows.iter().map(Borrow::book_id),
    )
    .await
    .map_err(LendingApplicationError::CatalogStoreError)?;

    Ok(borrows
        .into_iter()
        .map(|borrow| {
            let title = titles
                .get(&borrow.book_id())
                .cloned()
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
            BorrowSummary { borrow, title }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_outcome_message_on_time() {
        let outcome = ReturnOutcome {
            borrow_id: BorrowId::new(),
            book_id: domain::BookId::new(),
            on_time: true,
            days_late: 0,
            fine: 0,
        };
        assert_eq!(outcome.message(), "Book returned on time. Thank you!");
    }

    #[test]
    fn test_return_outcome_message_late() {
        let outcome = ReturnOutcome {
            borrow_id: BorrowId::new(),
            book_id: domain::BookId::new(),
            on_time: false,
            days_late: 3,
            fine: 15,
        };
        assert_eq!(
            outcome.message(),
            "Book returned. Late by 3 days. Fine: 15 units."
        );
    }
}

use super::lock;
use crate::domain::{
    BorrowId, UserId,
    borrow::{ActiveBorrow, Borrow, ReturnedBorrow},
};
use crate::ports::lending_ledger::{BorrowCount, LendingLedger as LendingLedgerTrait, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// LendingLedgerのインメモリ実装
///
/// 記録順を保持するためVecで管理する。集計の同順位は記録順で決まる。
pub struct LendingLedger {
    borrows: Mutex<Vec<Borrow>>,
}

impl LendingLedger {
    pub fn new() -> Self {
        Self {
            borrows: Mutex::new(Vec::new()),
        }
    }
}

impl Default for LendingLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LendingLedgerTrait for LendingLedger {
    async fn insert(&self, borrow: ActiveBorrow) -> Result<()> {
        let mut borrows = lock(&self.borrows)?;
        if borrows.iter().any(|b| b.borrow_id() == borrow.borrow_id) {
            return Err(format!("borrow {} already exists", borrow.borrow_id.value()).into());
        }
        borrows.push(Borrow::Active(borrow));
        Ok(())
    }

    async fn get_by_id(&self, borrow_id: BorrowId) -> Result<Option<Borrow>> {
        let borrows = lock(&self.borrows)?;
        Ok(borrows.iter().find(|b| b.borrow_id() == borrow_id).cloned())
    }

    async fn mark_returned(&self, returned: &ReturnedBorrow) -> Result<bool> {
        let mut borrows = lock(&self.borrows)?;
        let Some(slot) = borrows
            .iter_mut()
            .find(|b| b.borrow_id() == returned.borrow_id)
        else {
            return Ok(false);
        };
        if !slot.is_active() {
            return Ok(false);
        }
        *slot = Borrow::Returned(returned.clone());
        Ok(true)
    }

    async fn reopen(&self, returned: &ReturnedBorrow) -> Result<bool> {
        let mut borrows = lock(&self.borrows)?;
        let Some(slot) = borrows
            .iter_mut()
            .find(|b| b.borrow_id() == returned.borrow_id)
        else {
            return Ok(false);
        };
        if slot.returned_date() != Some(returned.returned_date) {
            return Ok(false);
        }
        *slot = Borrow::Active(returned.clone().reopen());
        Ok(true)
    }

    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Borrow>> {
        let borrows = lock(&self.borrows)?;
        Ok(borrows
            .iter()
            .filter(|b| b.user_id() == user_id)
            .cloned()
            .collect())
    }

    async fn count_active(&self) -> Result<u64> {
        let borrows = lock(&self.borrows)?;
        Ok(borrows.iter().filter(|b| b.is_active()).count() as u64)
    }

    async fn top_borrowed_books(&self, limit: usize, offset: usize) -> Result<Vec<BorrowCount>> {
        let borrows = lock(&self.borrows)?;

        // 最初の貸出の記録順で並べた集計
        let mut counts: Vec<BorrowCount> = Vec::new();
        for borrow in borrows.iter() {
            match counts.iter_mut().find(|c| c.book_id == borrow.book_id()) {
                Some(entry) => entry.count += 1,
                None => counts.push(BorrowCount {
                    book_id: borrow.book_id(),
                    count: 1,
                }),
            }
        }

        // 安定ソートなので同数は記録順のまま
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(counts.into_iter().skip(offset).take(limit).collect())
    }
}

//! PostgreSQLアダプターのテスト
//!
//! DATABASE_URLが指すデータベースを使用する。
//! `cargo test -- --ignored` で実行する。

mod common;

use chrono::{DateTime, Duration, Utc};
use common::{add_book_command, cleanup_database, create_test_pool};
use community_library::adapters::postgres::{
    PostgresCatalogStore, PostgresLendingLedger, PostgresReservationQueue,
};
use community_library::domain::{
    BookId, UserId,
    book::add_book,
    borrow::{Borrow, ReturnedBorrow, borrow_book, return_book},
    reservation::reserve_book,
};
use community_library::ports::{CatalogStore, CheckoutOutcome, LendingLedger, ReservationQueue};
use serial_test::serial;

/// PostgreSQLの時刻精度（マイクロ秒）に合わせて丸める
fn truncate_to_micros(dt: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(dt.timestamp_micros()).expect("Invalid timestamp")
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_catalog_store_insert_search_and_delete() {
    let pool = create_test_pool().await;
    cleanup_database(&pool).await;
    let store = PostgresCatalogStore::new(pool.clone());

    let mut cmd = add_book_command("100% Pure_Title", 2);
    cmd.added_at = truncate_to_micros(Utc::now());
    cmd.ebook = Some("pure.epub".to_string());
    let book = add_book(cmd);
    store.insert(book.clone()).await.unwrap();
    store
        .insert(add_book(add_book_command("Plain", 1)))
        .await
        .unwrap();

    let loaded = store.get_by_id(book.book_id).await.unwrap().unwrap();
    assert_eq!(loaded, book);

    // LIKEのメタ文字は文字通りに扱われる
    let found = store.search(Some("100%")).await.unwrap();
    assert_eq!(found.len(), 1);
    let found = store.search(Some("pure_")).await.unwrap();
    assert_eq!(found.len(), 1);
    let found = store.search(None).await.unwrap();
    assert_eq!(found.len(), 2);

    let ebooks = store.find_with_ebook().await.unwrap();
    assert_eq!(ebooks.len(), 1);
    assert_eq!(store.count().await.unwrap(), 2);

    assert!(store.delete(book.book_id).await.unwrap());
    assert!(!store.delete(book.book_id).await.unwrap());
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_catalog_store_titles_by_ids() {
    let pool = create_test_pool().await;
    cleanup_database(&pool).await;
    let store = PostgresCatalogStore::new(pool.clone());
    let kindred = add_book(add_book_command("Kindred", 1));
    let dawn = add_book(add_book_command("Dawn", 1));
    store.insert(kindred.clone()).await.unwrap();
    store.insert(dawn.clone()).await.unwrap();
    store.delete(dawn.book_id).await.unwrap();

    let titles = store
        .titles_by_ids(&[kindred.book_id, dawn.book_id, BookId::new()])
        .await
        .unwrap();

    assert_eq!(titles.len(), 1);
    assert_eq!(titles.get(&kindred.book_id).map(String::as_str), Some("Kindred"));
    assert!(store.titles_by_ids(&[]).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_catalog_store_checkout_and_checkin_bounds() {
    let pool = create_test_pool().await;
    cleanup_database(&pool).await;
    let store = PostgresCatalogStore::new(pool.clone());
    let book = add_book(add_book_command("Bounded", 1));
    store.insert(book.clone()).await.unwrap();

    let first = store.try_checkout(book.book_id).await.unwrap();
    assert!(matches!(first, CheckoutOutcome::CheckedOut(inv) if inv.copies_available() == 0));

    let second = store.try_checkout(book.book_id).await.unwrap();
    assert_eq!(second, CheckoutOutcome::Unavailable);

    let restored = store.checkin(book.book_id).await.unwrap().unwrap();
    assert_eq!(restored.copies_available(), 1);

    // 所蔵冊数を超えない
    let clamped = store.checkin(book.book_id).await.unwrap().unwrap();
    assert_eq!(clamped.copies_available(), 1);

    let missing = add_book(add_book_command("Missing", 1));
    assert_eq!(
        store.try_checkout(missing.book_id).await.unwrap(),
        CheckoutOutcome::NotFound
    );
    assert!(store.checkin(missing.book_id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_concurrent_checkout_of_last_copy() {
    let pool = create_test_pool().await;
    cleanup_database(&pool).await;
    let store = std::sync::Arc::new(PostgresCatalogStore::new(pool.clone()));
    let book = add_book(add_book_command("Contended", 1));
    store.insert(book.clone()).await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            let book_id = book.book_id;
            tokio::spawn(async move { store.try_checkout(book_id).await.unwrap() })
        })
        .collect();

    let mut checked_out = 0;
    for handle in handles {
        if matches!(handle.await.unwrap(), CheckoutOutcome::CheckedOut(_)) {
            checked_out += 1;
        }
    }

    assert_eq!(checked_out, 1);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_lending_ledger_return_is_conditional() {
    let pool = create_test_pool().await;
    cleanup_database(&pool).await;
    let ledger = PostgresLendingLedger::new(pool.clone());
    let book = add_book(add_book_command("Ledger", 1));
    let user_id = UserId::new();
    let borrowed_at = truncate_to_micros(Utc::now() - Duration::days(20));

    let (active, _) = borrow_book(&book, user_id, borrowed_at).unwrap();
    ledger.insert(active.clone()).await.unwrap();
    assert_eq!(ledger.count_active().await.unwrap(), 1);

    let returned_at = truncate_to_micros(Utc::now());
    let (returned, event) = return_book(Borrow::Active(active.clone()), returned_at).unwrap();
    assert!(event.was_overdue());

    assert!(ledger.mark_returned(&returned).await.unwrap());
    assert!(!ledger.mark_returned(&returned).await.unwrap());

    let loaded = ledger.get_by_id(active.borrow_id).await.unwrap().unwrap();
    assert_eq!(loaded, Borrow::Returned(returned.clone()));
    assert_eq!(ledger.count_active().await.unwrap(), 0);

    // 別の返却日時では戻らない
    let other = ReturnedBorrow {
        returned_date: returned.returned_date + Duration::seconds(1),
        ..returned.clone()
    };
    assert!(!ledger.reopen(&other).await.unwrap());
    let still_returned = ledger.get_by_id(active.borrow_id).await.unwrap().unwrap();
    assert!(!still_returned.is_active());

    assert!(ledger.reopen(&returned).await.unwrap());
    let reopened = ledger.get_by_id(active.borrow_id).await.unwrap().unwrap();
    assert!(reopened.is_active());
    assert!(reopened.fine().is_none());

    let history = ledger.find_by_user_id(user_id).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_lending_ledger_top_borrowed_tie_break() {
    let pool = create_test_pool().await;
    cleanup_database(&pool).await;
    let ledger = PostgresLendingLedger::new(pool.clone());
    let a = add_book(add_book_command("A", 5));
    let b = add_book(add_book_command("B", 5));
    let c = add_book(add_book_command("C", 5));

    for book in [&b, &c, &c, &b, &a, &a, &a, &a, &a] {
        let (active, _) = borrow_book(book, UserId::new(), Utc::now()).unwrap();
        ledger.insert(active).await.unwrap();
    }

    let top = ledger.top_borrowed_books(10, 0).await.unwrap();
    let order: Vec<_> = top.iter().map(|t| (t.book_id, t.count)).collect();
    assert_eq!(order, vec![(a.book_id, 5), (b.book_id, 2), (c.book_id, 2)]);

    let limited = ledger.top_borrowed_books(1, 0).await.unwrap();
    assert_eq!(limited.len(), 1);

    let page = ledger.top_borrowed_books(2, 1).await.unwrap();
    let order: Vec<_> = page.iter().map(|t| t.book_id).collect();
    assert_eq!(order, vec![b.book_id, c.book_id]);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_reservation_queue_uniqueness_and_order() {
    let pool = create_test_pool().await;
    cleanup_database(&pool).await;
    let queue = PostgresReservationQueue::new(pool.clone());
    let book = add_book(add_book_command("Queued", 1));
    let first_user = UserId::new();
    let second_user = UserId::new();
    let now = truncate_to_micros(Utc::now());

    let (second, _) = reserve_book(second_user, book.book_id, now);
    let (first, _) = reserve_book(first_user, book.book_id, now - Duration::hours(1));
    assert!(queue.insert_if_absent(second.clone()).await.unwrap());
    assert!(queue.insert_if_absent(first.clone()).await.unwrap());

    let (duplicate, _) = reserve_book(first_user, book.book_id, now);
    assert!(!queue.insert_if_absent(duplicate).await.unwrap());

    let next = queue
        .next_unfulfilled_for_book(book.book_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(next, first);

    assert_eq!(queue.find_by_user_id(first_user).await.unwrap(), vec![first.clone()]);
    assert!(queue.delete(first.reservation_id).await.unwrap());
    assert!(!queue.delete(first.reservation_id).await.unwrap());
    assert!(queue.get_by_id(first.reservation_id).await.unwrap().is_none());
}

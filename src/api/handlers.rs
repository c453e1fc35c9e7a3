use crate::application::{
    ServiceDependencies,
    catalog::{self, CatalogApplicationError},
    lending,
    reports::{self, TOP_BOOKS_LIMIT},
    reservation,
};
use crate::domain::{
    BookId, BorrowId, ReservationId, UserId,
    commands::{BorrowBook, CancelReservation, ReserveBook, ReturnBook},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::{
    error::ApiError,
    types::{
        AddBookRequest, BookResponse, BookReturnedResponse, BorrowCreatedResponse, BorrowResponse,
        DashboardResponse, ReportResponse, ReservableBookResponse, ReservationResponse,
        SearchBooksQuery, UserQuery, UserRequest,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Catalog handlers
// ============================================================================

/// GET /books - 蔵書を検索
///
/// `q`を省略した場合は全件を返す。
pub async fn search_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchBooksQuery>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let books = catalog::search_catalog(&state.service_deps, query.q.as_deref()).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// POST /books - 蔵書を登録（管理者）
pub async fn add_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddBookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let book = catalog::add_book(&state.service_deps, req.to_command()).await?;
    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// GET /books/:id - 蔵書詳細
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = catalog::get_book(&state.service_deps, BookId::from_uuid(book_id)).await?;
    Ok(Json(BookResponse::from(book)))
}

/// DELETE /books/:id - 蔵書を削除（管理者）
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    catalog::delete_book(&state.service_deps, BookId::from_uuid(book_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /ebooks - 電子書籍の一覧
pub async fn list_ebooks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let books = catalog::list_ebooks(&state.service_deps).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

// ============================================================================
// Lending handlers
// ============================================================================

/// POST /books/:id/borrow - 蔵書を借りる
///
/// 強制されるビジネスルール:
/// - 蔵書が存在すること
/// - 貸出可能冊数が1冊以上あること（なければ予約を促す）
pub async fn borrow_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
    Json(req): Json<UserRequest>,
) -> Result<(StatusCode, Json<BorrowCreatedResponse>), ApiError> {
    let cmd = BorrowBook {
        user_id: req.user_id(),
        book_id: BookId::from_uuid(book_id),
        borrowed_at: Utc::now(),
    };

    let borrow = lending::borrow_book(&state.service_deps, cmd).await?;
    Ok((StatusCode::CREATED, Json(BorrowCreatedResponse::from(borrow))))
}

/// POST /borrows/:id/return - 蔵書を返却
///
/// 強制されるビジネスルール:
/// - 貸出が存在すること
/// - 既に返却済みでないこと
/// - 期限超過時は延滞料金を記録する
pub async fn return_book(
    State(state): State<Arc<AppState>>,
    Path(borrow_id): Path<Uuid>,
    Json(req): Json<UserRequest>,
) -> Result<Json<BookReturnedResponse>, ApiError> {
    let cmd = ReturnBook {
        borrow_id: BorrowId::from_uuid(borrow_id),
        returned_by: req.user_id(),
        returned_at: Utc::now(),
    };

    let outcome = lending::return_book(&state.service_deps, cmd).await?;
    Ok(Json(BookReturnedResponse::from(outcome)))
}

/// GET /users/:id/borrows - 利用者の貸出一覧
pub async fn list_user_borrows(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<BorrowResponse>>, ApiError> {
    let borrows =
        lending::list_borrows_for_user(&state.service_deps, UserId::from_uuid(user_id)).await?;
    Ok(Json(borrows.into_iter().map(BorrowResponse::from).collect()))
}

// ============================================================================
// Reservation handlers
// ============================================================================

/// POST /books/:id/reserve - 蔵書を予約
pub async fn reserve_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
    Json(req): Json<UserRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>), ApiError> {
    let book_id = BookId::from_uuid(book_id);
    let cmd = ReserveBook {
        user_id: req.user_id(),
        book_id,
        reserved_at: Utc::now(),
    };

    let reservation = reservation::reserve_book(&state.service_deps, cmd).await?;
    let title = match catalog::get_book(&state.service_deps, book_id).await {
        Ok(book) => book.title,
        Err(CatalogApplicationError::BookNotFound) => catalog::UNKNOWN_TITLE.to_string(),
        Err(err) => return Err(err.into()),
    };

    Ok((
        StatusCode::CREATED,
        Json(ReservationResponse::new(reservation, title)),
    ))
}

/// DELETE /reservations/:id?user_id= - 予約を取消
///
/// 予約者本人のみ取り消せる。
pub async fn cancel_reservation(
    State(state): State<Arc<AppState>>,
    Path(reservation_id): Path<Uuid>,
    Query(query): Query<UserQuery>,
) -> Result<StatusCode, ApiError> {
    let user_id = query
        .user_id
        .ok_or_else(|| ApiError::BadRequest("user_id query parameter is required".to_string()))?;

    let cmd = CancelReservation {
        user_id: UserId::from_uuid(user_id),
        reservation_id: ReservationId::from_uuid(reservation_id),
    };

    reservation::cancel_reservation(&state.service_deps, cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/:id/reservations - 利用者の予約一覧
pub async fn list_user_reservations(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<ReservationResponse>>, ApiError> {
    let reservations =
        reservation::list_reservations_for_user(&state.service_deps, UserId::from_uuid(user_id))
            .await?;
    Ok(Json(
        reservations
            .into_iter()
            .map(ReservationResponse::from)
            .collect(),
    ))
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /users/:id/dashboard - 利用者ダッシュボード
///
/// 貸出一覧・予約一覧・予約済みフラグ付きの全蔵書をまとめて返す。
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let deps = &state.service_deps;
    let user_id = UserId::from_uuid(user_id);

    let borrows = lending::list_borrows_for_user(deps, user_id).await?;
    let reservations = reservation::list_reservations_for_user(deps, user_id).await?;
    let books = reservation::reservable_books_for_user(deps, user_id).await?;

    Ok(Json(DashboardResponse {
        borrows: borrows.into_iter().map(BorrowResponse::from).collect(),
        reservations: reservations
            .into_iter()
            .map(ReservationResponse::from)
            .collect(),
        books: books.into_iter().map(ReservableBookResponse::from).collect(),
    }))
}

/// GET /reports - 統計と人気蔵書
pub async fn report(State(state): State<Arc<AppState>>) -> Result<Json<ReportResponse>, ApiError> {
    let stats = reports::library_stats(&state.service_deps).await?;
    let top_books = reports::top_borrowed_books(&state.service_deps, TOP_BOOKS_LIMIT).await?;

    Ok(Json(ReportResponse::new(stats, top_books)))
}

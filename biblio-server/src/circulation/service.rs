//! Circulation service: checkout, return, and the overdue sweep
//!
//! Every state transition applies its catalog and membership effects as
//! one SQLite transaction. The counter preconditions live in guarded
//! UPDATE statements, so concurrent requests for the same book or member
//! serialize on the database write lock instead of racing in application
//! code; any precondition failure rolls the whole transaction back with
//! no partial counter movement.

use chrono::NaiveDate;
use chrono_tz::Tz;
use sqlx::SqlitePool;

use super::error::{CirculationError, CirculationResult};
use super::fine::FinePolicy;
use crate::db::repository::{book, borrow, member};
use crate::utils::time;
use shared::models::{BorrowCreate, BorrowReturn, BorrowWithDetails};

#[derive(Clone)]
pub struct CirculationService {
    pool: SqlitePool,
    timezone: Tz,
    loan_period_days: i64,
    fine_policy: FinePolicy,
}

impl CirculationService {
    pub fn new(
        pool: SqlitePool,
        timezone: Tz,
        loan_period_days: i64,
        fine_policy: FinePolicy,
    ) -> Self {
        Self {
            pool,
            timezone,
            loan_period_days,
            fine_policy,
        }
    }

    pub fn fine_policy(&self) -> FinePolicy {
        self.fine_policy
    }

    fn today(&self) -> NaiveDate {
        time::today(self.timezone)
    }

    /// Check a book out to a member.
    ///
    /// Order matters: the member-side limit is taken first, so a limit
    /// violation never costs an inventory slot. Both effects plus the
    /// ledger insert commit together or not at all.
    pub async fn checkout(
        &self,
        data: &BorrowCreate,
        employee_id: Option<i64>,
    ) -> CirculationResult<BorrowWithDetails> {
        let borrow_date = self.today();
        let due_date = data
            .due_date
            .unwrap_or_else(|| time::default_due_date(borrow_date, self.loan_period_days));
        if due_date < borrow_date {
            return Err(CirculationError::InvalidDueDate {
                borrow_date,
                due_date,
            });
        }

        let mut tx = self.pool.begin().await.map_err(crate::db::repository::RepoError::from)?;

        member::record_checkout(&mut tx, data.member_id).await?;
        book::check_out(&mut tx, data.book_id).await?;
        let id = borrow::insert(
            &mut tx,
            data.book_id,
            data.member_id,
            employee_id,
            borrow_date,
            due_date,
        )
        .await?;

        tx.commit().await.map_err(crate::db::repository::RepoError::from)?;

        tracing::info!(
            borrow_id = id,
            book_id = data.book_id,
            member_id = data.member_id,
            due_date = %due_date,
            "Borrow created"
        );

        borrow::find_with_details(&self.pool, id)
            .await?
            .ok_or(CirculationError::BorrowNotFound(id))
    }

    /// Return a borrowed book.
    ///
    /// Finalizes the fine when the return lands past the due date, checks
    /// the copy back into the catalog and releases the member's slot, all
    /// in one transaction.
    pub async fn return_borrow(
        &self,
        borrow_id: i64,
        data: &BorrowReturn,
    ) -> CirculationResult<BorrowWithDetails> {
        let mut tx = self.pool.begin().await.map_err(crate::db::repository::RepoError::from)?;

        let record = borrow::find_by_id_for_update(&mut tx, borrow_id)
            .await?
            .ok_or(CirculationError::BorrowNotFound(borrow_id))?;
        if !record.status.is_outstanding() {
            return Err(CirculationError::AlreadyReturned(borrow_id));
        }

        let return_date = data.return_date.unwrap_or_else(|| self.today());
        if return_date < record.borrow_date {
            return Err(CirculationError::InvalidDateRange {
                borrow_date: record.borrow_date,
                return_date,
            });
        }

        let fine_amount = self.fine_policy.assess(record.due_date, return_date);

        borrow::finalize_return(&mut tx, borrow_id, return_date, fine_amount).await?;
        book::check_in(&mut tx, record.book_id).await?;
        member::record_return(&mut tx, record.member_id).await?;

        tx.commit().await.map_err(crate::db::repository::RepoError::from)?;

        tracing::info!(
            borrow_id,
            book_id = record.book_id,
            member_id = record.member_id,
            return_date = %return_date,
            fine_amount,
            "Borrow returned"
        );

        borrow::find_with_details(&self.pool, borrow_id)
            .await?
            .ok_or(CirculationError::BorrowNotFound(borrow_id))
    }

    /// Flip overdue actives and refresh accrued fines.
    ///
    /// Run periodically by [`super::OverdueScheduler`]; each row is
    /// updated through a status-guarded statement so the sweep can race
    /// with a concurrent return and lose cleanly. Returns the number of
    /// borrows newly marked overdue.
    pub async fn sweep_overdue(&self) -> CirculationResult<usize> {
        let today = self.today();

        let mut flipped = 0usize;
        for record in borrow::find_due_for_sweep(&self.pool, today).await? {
            let fine = self.fine_policy.assess(record.due_date, today);
            if borrow::set_overdue(&self.pool, record.id, fine).await? {
                tracing::info!(
                    borrow_id = record.id,
                    book_id = record.book_id,
                    member_id = record.member_id,
                    fine,
                    "Borrow marked overdue"
                );
                flipped += 1;
            }
        }

        // Keep accrued fines current on rows already overdue
        for record in borrow::find_overdue(&self.pool).await? {
            let fine = self.fine_policy.assess(record.due_date, today);
            if fine != record.fine_amount {
                borrow::set_fine(&self.pool, record.id, fine).await?;
            }
        }

        Ok(flipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::RepoError;
    use crate::db::DbService;
    use chrono::Duration;
    use shared::models::{BookCreate, BorrowStatus, MemberCreate};
    use shared::ErrorCode;

    const TZ: Tz = chrono_tz::UTC;

    async fn test_service() -> CirculationService {
        let db = DbService::new_in_memory().await.unwrap();
        CirculationService::new(db.pool, TZ, 14, FinePolicy::default())
    }

    async fn seed_book(pool: &SqlitePool, isbn: &str, total: i64) -> i64 {
        book::create(
            pool,
            BookCreate {
                title: format!("Book {isbn}"),
                isbn: isbn.to_string(),
                author_names: vec!["Test Author".to_string()],
                category_name: Some("Fiction".to_string()),
                publication_year: Some(1999),
                total_copies: Some(total),
                available_copies: None,
                cover_image: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn seed_member(pool: &SqlitePool, name: &str, limit: i64) -> i64 {
        member::create(
            pool,
            MemberCreate {
                account_id: None,
                full_name: name.to_string(),
                email: None,
                phone: "0500000000".to_string(),
                membership_type: None,
                membership_level: None,
                max_borrow_limit: Some(limit),
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn available_copies(pool: &SqlitePool, book_id: i64) -> i64 {
        book::find_by_id(pool, book_id)
            .await
            .unwrap()
            .unwrap()
            .available_copies
    }

    async fn current_borrowed(pool: &SqlitePool, member_id: i64) -> i64 {
        member::find_by_id(pool, member_id)
            .await
            .unwrap()
            .unwrap()
            .current_borrowed
    }

    fn assert_business_error(err: CirculationError, expected: ErrorCode) {
        match err {
            CirculationError::Repo(RepoError::Business(code, _)) => assert_eq!(code, expected),
            other => panic!("Expected business error {expected:?}, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_checkout_defaults_due_date_to_loan_period() {
        let svc = test_service().await;
        let book_id = seed_book(&svc.pool, "9780000000001", 1).await;
        let member_id = seed_member(&svc.pool, "Reader", 1).await;

        let borrow = svc
            .checkout(
                &BorrowCreate {
                    book_id,
                    member_id,
                    due_date: None,
                },
                None,
            )
            .await
            .unwrap();

        let today = time::today(TZ);
        assert_eq!(borrow.borrow_date, today);
        assert_eq!(borrow.due_date, today + Duration::days(14));
        assert_eq!(borrow.status, BorrowStatus::Active);
        assert_eq!(borrow.fine_amount, 0.0);
        assert_eq!(available_copies(&svc.pool, book_id).await, 0);
        assert_eq!(current_borrowed(&svc.pool, member_id).await, 1);
    }

    #[tokio::test]
    async fn test_checkout_sets_book_status_borrowed_at_zero() {
        let svc = test_service().await;
        let book_id = seed_book(&svc.pool, "9780000000002", 2).await;
        let member_id = seed_member(&svc.pool, "Reader", 5).await;

        svc.checkout(&BorrowCreate { book_id, member_id, due_date: None }, None)
            .await
            .unwrap();
        let book = book::find_by_id(&svc.pool, book_id).await.unwrap().unwrap();
        assert_eq!(book.available_copies, 1);
        assert_eq!(book.status, shared::models::BookStatus::Available);

        svc.checkout(&BorrowCreate { book_id, member_id, due_date: None }, None)
            .await
            .unwrap();
        let book = book::find_by_id(&svc.pool, book_id).await.unwrap().unwrap();
        assert_eq!(book.available_copies, 0);
        assert_eq!(book.status, shared::models::BookStatus::Borrowed);
    }

    #[tokio::test]
    async fn test_checkout_fails_when_no_copies_and_member_unchanged() {
        let svc = test_service().await;
        let book_id = seed_book(&svc.pool, "9780000000003", 1).await;
        let first = seed_member(&svc.pool, "First", 3).await;
        let second = seed_member(&svc.pool, "Second", 3).await;

        svc.checkout(&BorrowCreate { book_id, member_id: first, due_date: None }, None)
            .await
            .unwrap();

        let err = svc
            .checkout(&BorrowCreate { book_id, member_id: second, due_date: None }, None)
            .await
            .unwrap_err();
        assert_business_error(err, ErrorCode::InsufficientCopies);

        // No partial effect: the second member's counter never moved
        assert_eq!(current_borrowed(&svc.pool, second).await, 0);
        assert_eq!(available_copies(&svc.pool, book_id).await, 0);
    }

    #[tokio::test]
    async fn test_checkout_fails_at_borrow_limit_and_book_unchanged() {
        let svc = test_service().await;
        let first_book = seed_book(&svc.pool, "9780000000004", 1).await;
        let second_book = seed_book(&svc.pool, "9780000000005", 1).await;
        let member_id = seed_member(&svc.pool, "Limited", 1).await;

        svc.checkout(&BorrowCreate { book_id: first_book, member_id, due_date: None }, None)
            .await
            .unwrap();
        let at_limit = member::find_by_id(&svc.pool, member_id).await.unwrap().unwrap();
        assert!(!at_limit.can_borrow());

        let err = svc
            .checkout(&BorrowCreate { book_id: second_book, member_id, due_date: None }, None)
            .await
            .unwrap_err();
        assert_business_error(err, ErrorCode::BorrowLimitExceeded);

        // No partial effect: the second book's inventory never moved
        assert_eq!(available_copies(&svc.pool, second_book).await, 1);
        assert_eq!(current_borrowed(&svc.pool, member_id).await, 1);
    }

    #[tokio::test]
    async fn test_checkout_rejects_lost_book() {
        let svc = test_service().await;
        let book_id = seed_book(&svc.pool, "9780000000006", 1).await;
        let member_id = seed_member(&svc.pool, "Reader", 3).await;

        book::update(
            &svc.pool,
            book_id,
            shared::models::BookUpdate {
                title: None,
                isbn: None,
                author_names: None,
                category_name: None,
                publication_year: None,
                total_copies: None,
                available_copies: None,
                cover_image: None,
                status: Some(shared::models::BookStatus::Lost),
            },
        )
        .await
        .unwrap();

        let err = svc
            .checkout(&BorrowCreate { book_id, member_id, due_date: None }, None)
            .await
            .unwrap_err();
        assert_business_error(err, ErrorCode::BookLost);
        assert_eq!(current_borrowed(&svc.pool, member_id).await, 0);
    }

    #[tokio::test]
    async fn test_checkout_rejects_due_date_before_borrow_date() {
        let svc = test_service().await;
        let book_id = seed_book(&svc.pool, "9780000000007", 1).await;
        let member_id = seed_member(&svc.pool, "Reader", 3).await;

        let err = svc
            .checkout(
                &BorrowCreate {
                    book_id,
                    member_id,
                    due_date: Some(time::today(TZ) - Duration::days(1)),
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CirculationError::InvalidDueDate { .. }));
        assert_eq!(available_copies(&svc.pool, book_id).await, 1);
        assert_eq!(current_borrowed(&svc.pool, member_id).await, 0);
    }

    #[tokio::test]
    async fn test_round_trip_restores_counters() {
        let svc = test_service().await;
        let book_id = seed_book(&svc.pool, "9780000000008", 3).await;
        let member_id = seed_member(&svc.pool, "Reader", 2).await;

        let borrow = svc
            .checkout(&BorrowCreate { book_id, member_id, due_date: None }, None)
            .await
            .unwrap();
        assert_eq!(available_copies(&svc.pool, book_id).await, 2);
        assert_eq!(current_borrowed(&svc.pool, member_id).await, 1);

        let returned = svc
            .return_borrow(borrow.id, &BorrowReturn::default())
            .await
            .unwrap();
        assert_eq!(returned.status, BorrowStatus::Returned);
        assert_eq!(returned.fine_amount, 0.0);
        assert_eq!(available_copies(&svc.pool, book_id).await, 3);
        assert_eq!(current_borrowed(&svc.pool, member_id).await, 0);
    }

    #[tokio::test]
    async fn test_return_exactly_on_due_date_has_no_fine() {
        let svc = test_service().await;
        let book_id = seed_book(&svc.pool, "9780000000009", 1).await;
        let member_id = seed_member(&svc.pool, "Reader", 1).await;

        let borrow = svc
            .checkout(&BorrowCreate { book_id, member_id, due_date: None }, None)
            .await
            .unwrap();

        let returned = svc
            .return_borrow(
                borrow.id,
                &BorrowReturn {
                    return_date: Some(borrow.due_date),
                },
            )
            .await
            .unwrap();
        assert_eq!(returned.status, BorrowStatus::Returned);
        assert_eq!(returned.fine_amount, 0.0);
        assert_eq!(available_copies(&svc.pool, book_id).await, 1);
        assert_eq!(current_borrowed(&svc.pool, member_id).await, 0);
    }

    #[tokio::test]
    async fn test_late_return_accrues_per_day_fine() {
        let svc = test_service().await;
        let book_id = seed_book(&svc.pool, "9780000000010", 1).await;
        let member_id = seed_member(&svc.pool, "Reader", 1).await;

        let today = time::today(TZ);
        let borrow = svc
            .checkout(
                &BorrowCreate {
                    book_id,
                    member_id,
                    due_date: Some(today),
                },
                None,
            )
            .await
            .unwrap();

        let returned = svc
            .return_borrow(
                borrow.id,
                &BorrowReturn {
                    return_date: Some(today + Duration::days(4)),
                },
            )
            .await
            .unwrap();
        assert_eq!(returned.fine_amount, 2.0); // 4 days * 0.50
    }

    #[tokio::test]
    async fn test_return_rejects_date_before_borrow_date() {
        let svc = test_service().await;
        let book_id = seed_book(&svc.pool, "9780000000011", 1).await;
        let member_id = seed_member(&svc.pool, "Reader", 1).await;

        let borrow = svc
            .checkout(&BorrowCreate { book_id, member_id, due_date: None }, None)
            .await
            .unwrap();

        let err = svc
            .return_borrow(
                borrow.id,
                &BorrowReturn {
                    return_date: Some(borrow.borrow_date - Duration::days(1)),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CirculationError::InvalidDateRange { .. }));

        // Transaction rolled back: still checked out
        assert_eq!(available_copies(&svc.pool, book_id).await, 0);
        assert_eq!(current_borrowed(&svc.pool, member_id).await, 1);
    }

    #[tokio::test]
    async fn test_double_return_fails() {
        let svc = test_service().await;
        let book_id = seed_book(&svc.pool, "9780000000012", 1).await;
        let member_id = seed_member(&svc.pool, "Reader", 1).await;

        let borrow = svc
            .checkout(&BorrowCreate { book_id, member_id, due_date: None }, None)
            .await
            .unwrap();
        svc.return_borrow(borrow.id, &BorrowReturn::default())
            .await
            .unwrap();

        let err = svc
            .return_borrow(borrow.id, &BorrowReturn::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CirculationError::AlreadyReturned(_)));

        // Counters untouched by the failed second return
        assert_eq!(available_copies(&svc.pool, book_id).await, 1);
        assert_eq!(current_borrowed(&svc.pool, member_id).await, 0);
    }

    #[tokio::test]
    async fn test_check_in_on_full_shelf_is_over_return() {
        let svc = test_service().await;
        let book_id = seed_book(&svc.pool, "9780000000013", 1).await;

        let mut tx = svc.pool.begin().await.unwrap();
        let err = book::check_in(&mut tx, book_id).await.unwrap_err();
        match err {
            RepoError::Business(code, _) => assert_eq!(code, ErrorCode::OverReturn),
            other => panic!("Expected OverReturn, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_return_of_nonexistent_borrow() {
        let svc = test_service().await;
        let err = svc
            .return_borrow(424242, &BorrowReturn::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CirculationError::BorrowNotFound(424242)));
    }

    #[tokio::test]
    async fn test_sweep_marks_overdue_and_accrues_fine() {
        let svc = test_service().await;
        let book_id = seed_book(&svc.pool, "9780000000014", 1).await;
        let member_id = seed_member(&svc.pool, "Reader", 1).await;

        let today = time::today(TZ);
        let borrow = svc
            .checkout(&BorrowCreate { book_id, member_id, due_date: Some(today) }, None)
            .await
            .unwrap();

        // Due today: not yet overdue
        assert_eq!(svc.sweep_overdue().await.unwrap(), 0);

        // Backdate the due date to simulate time passing
        sqlx::query("UPDATE borrow SET due_date = ? WHERE id = ?")
            .bind(today - Duration::days(6))
            .bind(borrow.id)
            .execute(&svc.pool)
            .await
            .unwrap();

        assert_eq!(svc.sweep_overdue().await.unwrap(), 1);
        let record = borrow::find_by_id(&svc.pool, borrow.id).await.unwrap().unwrap();
        assert_eq!(record.status, BorrowStatus::Overdue);
        assert_eq!(record.fine_amount, 3.0); // 6 days * 0.50

        // A second sweep flips nothing new and keeps the fine current
        assert_eq!(svc.sweep_overdue().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_overdue_borrow_can_still_be_returned() {
        let svc = test_service().await;
        let book_id = seed_book(&svc.pool, "9780000000015", 1).await;
        let member_id = seed_member(&svc.pool, "Reader", 1).await;

        let today = time::today(TZ);
        let borrow = svc
            .checkout(&BorrowCreate { book_id, member_id, due_date: Some(today) }, None)
            .await
            .unwrap();
        sqlx::query("UPDATE borrow SET due_date = ? WHERE id = ?")
            .bind(today - Duration::days(2))
            .bind(borrow.id)
            .execute(&svc.pool)
            .await
            .unwrap();
        svc.sweep_overdue().await.unwrap();

        let returned = svc
            .return_borrow(borrow.id, &BorrowReturn::default())
            .await
            .unwrap();
        assert_eq!(returned.status, BorrowStatus::Returned);
        assert_eq!(returned.fine_amount, 1.0); // 2 days * 0.50
        assert_eq!(available_copies(&svc.pool, book_id).await, 1);
        assert_eq!(current_borrowed(&svc.pool, member_id).await, 0);
    }

    #[tokio::test]
    async fn test_delete_is_blocked_while_outstanding() {
        let svc = test_service().await;
        let book_id = seed_book(&svc.pool, "9780000000016", 1).await;
        let member_id = seed_member(&svc.pool, "Reader", 1).await;

        let record = svc
            .checkout(&BorrowCreate { book_id, member_id, due_date: None }, None)
            .await
            .unwrap();

        let err = borrow::delete(&svc.pool, record.id).await.unwrap_err();
        match err {
            RepoError::Business(code, _) => assert_eq!(code, ErrorCode::BorrowStillActive),
            other => panic!("Expected BorrowStillActive, got {other:?}"),
        }

        // Deleting after return is an administrative correction and works
        svc.return_borrow(record.id, &BorrowReturn::default())
            .await
            .unwrap();
        assert!(borrow::delete(&svc.pool, record.id).await.unwrap());
        // Deletion reverses nothing
        assert_eq!(available_copies(&svc.pool, book_id).await, 1);
        assert_eq!(current_borrowed(&svc.pool, member_id).await, 0);
    }
}

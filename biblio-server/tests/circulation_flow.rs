//! End-to-end circulation flow against a real on-disk database
//!
//! Exercises the full stack the way the server wires it: DbService with
//! WAL + migrations, repositories, and the circulation engine, including
//! concurrent checkouts racing for the same title.

use biblio_server::db::repository::{book, borrow, employee, member};
use biblio_server::db::DbService;
use biblio_server::{CirculationService, FinePolicy};
use shared::models::{
    BookCreate, BorrowCreate, BorrowReturn, BorrowStatus, EmployeeCreate, MemberCreate,
};

async fn open_test_db(dir: &tempfile::TempDir) -> DbService {
    let path = dir.path().join("biblio-test.db");
    DbService::new(&path.to_string_lossy()).await.unwrap()
}

fn circulation(db: &DbService) -> CirculationService {
    CirculationService::new(db.pool.clone(), chrono_tz::UTC, 14, FinePolicy::default())
}

async fn seed_book(db: &DbService, isbn: &str, copies: i64) -> i64 {
    book::create(
        &db.pool,
        BookCreate {
            title: format!("Title {isbn}"),
            isbn: isbn.to_string(),
            author_names: vec!["Naguib Mahfouz".to_string(), "Taha Hussein".to_string()],
            category_name: Some("Literature".to_string()),
            publication_year: Some(1957),
            total_copies: Some(copies),
            available_copies: None,
            cover_image: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_member(db: &DbService, name: &str, limit: i64) -> i64 {
    member::create(
        &db.pool,
        MemberCreate {
            account_id: None,
            full_name: name.to_string(),
            email: None,
            phone: "0512345678".to_string(),
            membership_type: None,
            membership_level: None,
            max_borrow_limit: Some(limit),
        },
    )
    .await
    .unwrap()
    .id
}

#[tokio::test]
async fn test_full_borrow_lifecycle_with_staff() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_test_db(&dir).await;
    let svc = circulation(&db);

    // Staff member processing the loan
    let password_hash = biblio_server::auth::hash_password("staff-password").unwrap();
    let staff = employee::create(
        &db.pool,
        &EmployeeCreate {
            username: "librarian1".to_string(),
            display_name: Some("Librarian One".to_string()),
            email: None,
            password: "staff-password".to_string(),
            confirm_password: "staff-password".to_string(),
            role: None,
            phone: "0500000001".to_string(),
            address: None,
        },
        &password_hash,
    )
    .await
    .unwrap();

    let book_id = seed_book(&db, "9789770926130", 2).await;
    let member_id = seed_member(&db, "Layla Hassan", 3).await;

    // Checkout, processed by the staff member
    let record = svc
        .checkout(
            &BorrowCreate {
                book_id,
                member_id,
                due_date: None,
            },
            Some(staff.id),
        )
        .await
        .unwrap();
    assert_eq!(record.status, BorrowStatus::Active);
    assert_eq!(record.employee_id, Some(staff.id));
    assert_eq!(record.employee_name.as_deref(), Some("Librarian One"));
    assert_eq!(record.book_title, "Title 9789770926130");
    assert_eq!(record.member_name, "Layla Hassan");

    // Removing the employee nulls the ledger back-reference, keeps the row
    employee::delete(&db.pool, staff.id).await.unwrap();
    let after = borrow::find_with_details(&db.pool, record.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.employee_id, None);
    assert_eq!(after.employee_name, None);

    // Return on time
    let returned = svc
        .return_borrow(record.id, &BorrowReturn::default())
        .await
        .unwrap();
    assert_eq!(returned.status, BorrowStatus::Returned);
    assert_eq!(returned.fine_amount, 0.0);

    let final_book = book::find_by_id(&db.pool, book_id).await.unwrap().unwrap();
    assert_eq!(final_book.available_copies, 2);
    let final_member = member::find_by_id(&db.pool, member_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(final_member.current_borrowed, 0);
}

#[tokio::test]
async fn test_concurrent_checkouts_never_oversell() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_test_db(&dir).await;
    let svc = circulation(&db);

    const COPIES: i64 = 3;
    const CONTENDERS: usize = 8;

    let book_id = seed_book(&db, "9789770000001", COPIES).await;
    let mut members = Vec::new();
    for i in 0..CONTENDERS {
        members.push(seed_member(&db, &format!("Member {i}"), 5).await);
    }

    let mut handles = Vec::new();
    for member_id in members {
        let svc = svc.clone();
        handles.push(tokio::spawn(async move {
            svc.checkout(
                &BorrowCreate {
                    book_id,
                    member_id,
                    due_date: None,
                },
                None,
            )
            .await
        }));
    }

    let mut successes = 0usize;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    // Exactly one winner per copy, and the counter never went negative
    assert_eq!(successes, COPIES as usize);
    let final_book = book::find_by_id(&db.pool, book_id).await.unwrap().unwrap();
    assert_eq!(final_book.available_copies, 0);
    assert_eq!(final_book.total_copies, COPIES);

    // Each winner holds exactly one slot on the member side
    let outstanding = borrow::count_outstanding(&db.pool).await.unwrap();
    assert_eq!(outstanding, COPIES);
}

#[tokio::test]
async fn test_author_and_category_get_or_create_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_test_db(&dir).await;

    let first = seed_book(&db, "9789770000002", 1).await;
    let second = seed_book(&db, "9789770000003", 1).await;

    let a = book::find_with_details(&db.pool, first).await.unwrap().unwrap();
    let b = book::find_with_details(&db.pool, second).await.unwrap().unwrap();

    // Same free-text names resolve to the same rows
    assert_eq!(a.category_id, b.category_id);
    assert_eq!(a.category_name.as_deref(), Some("Literature"));
    let ids_a: Vec<i64> = a.authors.iter().map(|x| x.id).collect();
    let ids_b: Vec<i64> = b.authors.iter().map(|x| x.id).collect();
    assert_eq!(ids_a, ids_b);
    // Order preserved as supplied
    assert_eq!(a.authors[0].name, "Naguib Mahfouz");
    assert_eq!(a.authors[1].name, "Taha Hussein");
}

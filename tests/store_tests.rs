//! In-process store tests against an in-memory SQLite database.
//!
//! These exercise the real repository queries and the rental lifecycle
//! end-to-end: day-count arithmetic, rate snapshots, vehicle status
//! transitions, reconciler behavior and the financial summaries.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::sqlite::SqlitePoolOptions;

use locar_server::{
    error::AppError,
    models::{
        enums::{AgendaKind, PaymentMethod, PaymentStatus, RentalStatus, VehicleStatus},
        rental::CreateRental,
        vehicle::CreateVehicle,
    },
    repository::Repository,
    services::{rentals::month_range_of, Services},
};

async fn test_repository() -> Repository {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Repository::new(pool)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    date(y, m, d).and_time(time(h, min))
}

async fn register_vehicle(repo: &Repository, model: &str, plate: &str, rate: f64) -> i64 {
    repo.vehicles
        .create(&CreateVehicle {
            model: model.to_string(),
            plate: plate.to_string(),
            daily_rate: rate,
        })
        .await
        .expect("Failed to register vehicle")
        .id
}

fn booking(vehicle_id: i64, customer: &str, start: NaiveDate, end: NaiveDate) -> CreateRental {
    CreateRental {
        vehicle_id,
        customer_name: customer.to_string(),
        customer_phone: None,
        start_date: start,
        start_time: time(10, 0),
        end_date: end,
        end_time: time(10, 0),
        force: false,
    }
}

// ---------------------------------------------------------------------------
// Vehicles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn plate_is_upper_cased_and_unique() {
    let repo = test_repository().await;

    let vehicle = repo
        .vehicles
        .create(&CreateVehicle {
            model: "Onix".to_string(),
            plate: "abc1d23".to_string(),
            daily_rate: 120.0,
        })
        .await
        .unwrap();
    assert_eq!(vehicle.plate, "ABC1D23");
    assert_eq!(vehicle.status, VehicleStatus::Available);

    // Same plate with different casing must be rejected and create no row
    let err = repo
        .vehicles
        .create(&CreateVehicle {
            model: "Gol".to_string(),
            plate: "ABC1d23".to_string(),
            daily_rate: 90.0,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let fleet = repo.vehicles.list_with_active_rental().await.unwrap();
    assert_eq!(fleet.len(), 1);
}

#[tokio::test]
async fn availability_excludes_covered_dates_and_maintenance() {
    let repo = test_repository().await;
    let onix = register_vehicle(&repo, "Onix", "AAA1A11", 100.0).await;
    let gol = register_vehicle(&repo, "Gol", "BBB2B22", 80.0).await;

    repo.rentals
        .create(&booking(onix, "Maria", date(2024, 5, 1), date(2024, 5, 3)))
        .await
        .unwrap();
    repo.vehicles
        .set_status(gol, VehicleStatus::Maintenance)
        .await
        .unwrap();

    let mid_rental = repo.vehicles.available_on(date(2024, 5, 2)).await.unwrap();
    assert!(mid_rental.is_empty());

    let after_rental = repo.vehicles.available_on(date(2024, 5, 4)).await.unwrap();
    let ids: Vec<i64> = after_rental.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![onix]);
}

// ---------------------------------------------------------------------------
// Rental commands
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_snapshots_rate_and_marks_vehicle_rented() {
    let repo = test_repository().await;
    let vehicle_id = register_vehicle(&repo, "Onix", "AAA1A11", 100.0).await;

    let rental = repo
        .rentals
        .create(&booking(vehicle_id, "Maria", date(2024, 3, 1), date(2024, 3, 3)))
        .await
        .unwrap();

    assert_eq!(rental.status, RentalStatus::Active);
    assert_eq!(rental.payment_status, PaymentStatus::Pending);
    assert_eq!(rental.daily_rate, 100.0);
    assert_eq!(rental.day_count, 2);
    assert_eq!(rental.total_amount, 200.0);

    let vehicle = repo.vehicles.get_by_id(vehicle_id).await.unwrap();
    assert_eq!(vehicle.status, VehicleStatus::Rented);
}

#[tokio::test]
async fn same_day_rental_counts_one_day() {
    let repo = test_repository().await;
    let vehicle_id = register_vehicle(&repo, "Gol", "BBB2B22", 80.0).await;

    let rental = repo
        .rentals
        .create(&booking(vehicle_id, "João", date(2024, 3, 5), date(2024, 3, 5)))
        .await
        .unwrap();

    assert_eq!(rental.day_count, 1);
    assert_eq!(rental.total_amount, 80.0);
}

#[tokio::test]
async fn create_rejects_missing_vehicle() {
    let repo = test_repository().await;

    let err = repo
        .rentals
        .create(&booking(999, "Maria", date(2024, 3, 1), date(2024, 3, 3)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::VehicleNotFound(999)));
}

#[tokio::test]
async fn missing_ids_map_to_typed_not_found() {
    let repo = test_repository().await;

    let err = repo.vehicles.get_by_id(42).await.unwrap_err();
    assert!(matches!(err, AppError::VehicleNotFound(42)));

    let err = repo.rentals.get_by_id(42).await.unwrap_err();
    assert!(matches!(err, AppError::RentalNotFound(42)));

    let err = repo
        .rentals
        .record_payment(42, PaymentMethod::Pix, 100.0, date(2024, 3, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::RentalNotFound(42)));
}

#[tokio::test]
async fn overlapping_window_needs_force() {
    let repo = test_repository().await;
    let vehicle_id = register_vehicle(&repo, "Onix", "AAA1A11", 100.0).await;

    repo.rentals
        .create(&booking(vehicle_id, "Maria", date(2024, 3, 1), date(2024, 3, 5)))
        .await
        .unwrap();

    let err = repo
        .rentals
        .create(&booking(vehicle_id, "João", date(2024, 3, 4), date(2024, 3, 6)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));

    // Disjoint window is fine without force
    repo.rentals
        .create(&booking(vehicle_id, "João", date(2024, 3, 6), date(2024, 3, 8)))
        .await
        .unwrap();

    // Overlap goes through when forced
    let mut forced = booking(vehicle_id, "Ana", date(2024, 3, 4), date(2024, 3, 6));
    forced.force = true;
    repo.rentals.create(&forced).await.unwrap();
}

#[tokio::test]
async fn edit_recomputes_from_original_snapshot() {
    let repo = test_repository().await;
    let vehicle_id = register_vehicle(&repo, "Onix", "AAA1A11", 100.0).await;

    let rental = repo
        .rentals
        .create(&booking(vehicle_id, "Maria", date(2024, 3, 1), date(2024, 3, 3)))
        .await
        .unwrap();

    // Bump the vehicle's current rate; the rental snapshot must not move
    sqlx::query("UPDATE vehicles SET daily_rate = 500 WHERE id = ?")
        .bind(vehicle_id)
        .execute(&repo.pool)
        .await
        .unwrap();

    let updated = repo
        .rentals
        .update(
            rental.id,
            &locar_server::models::rental::UpdateRental {
                customer_name: "Maria Silva".to_string(),
                customer_phone: Some("11988887777".to_string()),
                start_date: date(2024, 3, 1),
                start_time: time(10, 0),
                end_date: date(2024, 3, 5),
                end_time: time(10, 0),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.customer_name, "Maria Silva");
    assert_eq!(updated.daily_rate, 100.0);
    assert_eq!(updated.day_count, 4);
    assert_eq!(updated.total_amount, 400.0);
    assert_eq!(updated.status, RentalStatus::Active);
}

#[tokio::test]
async fn cancel_releases_vehicle_only_when_last_active() {
    let repo = test_repository().await;
    let vehicle_id = register_vehicle(&repo, "Onix", "AAA1A11", 100.0).await;

    let first = repo
        .rentals
        .create(&booking(vehicle_id, "Maria", date(2024, 3, 1), date(2024, 3, 5)))
        .await
        .unwrap();
    let mut overlap = booking(vehicle_id, "João", date(2024, 3, 3), date(2024, 3, 7));
    overlap.force = true;
    let second = repo.rentals.create(&overlap).await.unwrap();

    let cancelled = repo.rentals.cancel(first.id).await.unwrap();
    assert_eq!(cancelled.status, RentalStatus::Cancelled);

    // The second rental still holds the vehicle
    let vehicle = repo.vehicles.get_by_id(vehicle_id).await.unwrap();
    assert_eq!(vehicle.status, VehicleStatus::Rented);

    repo.rentals.cancel(second.id).await.unwrap();
    let vehicle = repo.vehicles.get_by_id(vehicle_id).await.unwrap();
    assert_eq!(vehicle.status, VehicleStatus::Available);

    // Terminal states are final
    let err = repo.rentals.cancel(first.id).await.unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));
}

#[tokio::test]
async fn payment_leaves_status_untouched() {
    let repo = test_repository().await;
    let vehicle_id = register_vehicle(&repo, "Onix", "AAA1A11", 100.0).await;

    let rental = repo
        .rentals
        .create(&booking(vehicle_id, "Maria", date(2024, 3, 1), date(2024, 3, 3)))
        .await
        .unwrap();

    let paid = repo
        .rentals
        .record_payment(rental.id, PaymentMethod::Pix, 180.0, date(2024, 3, 2))
        .await
        .unwrap();

    assert_eq!(paid.status, RentalStatus::Active);
    assert_eq!(paid.payment_status, PaymentStatus::Paid);
    assert_eq!(paid.payment_method, Some(PaymentMethod::Pix));
    assert_eq!(paid.payment_date, Some(date(2024, 3, 2)));
    // Received amount may differ from the rental total
    assert_eq!(paid.amount_received, Some(180.0));
    assert_eq!(paid.total_amount, 200.0);
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reconciler_completes_overdue_paid_rentals() {
    let repo = test_repository().await;
    let vehicle_id = register_vehicle(&repo, "Onix", "AAA1A11", 100.0).await;

    let rental = repo
        .rentals
        .create(&booking(vehicle_id, "X", date(2024, 3, 1), date(2024, 3, 3)))
        .await
        .unwrap();
    assert_eq!(rental.total_amount, 200.0);

    repo.rentals
        .record_payment(rental.id, PaymentMethod::Pix, 200.0, date(2024, 3, 5))
        .await
        .unwrap();

    let reconciled = repo
        .rentals
        .reconcile_expired(at(2024, 3, 10, 0, 0))
        .await
        .unwrap();
    assert_eq!(reconciled, 1);

    let rental = repo.rentals.get_by_id(rental.id).await.unwrap();
    assert_eq!(rental.status, RentalStatus::Completed);
    let vehicle = repo.vehicles.get_by_id(vehicle_id).await.unwrap();
    assert_eq!(vehicle.status, VehicleStatus::Available);
}

#[tokio::test]
async fn reconciler_is_idempotent() {
    let repo = test_repository().await;
    let vehicle_id = register_vehicle(&repo, "Onix", "AAA1A11", 100.0).await;

    let rental = repo
        .rentals
        .create(&booking(vehicle_id, "Maria", date(2024, 3, 1), date(2024, 3, 3)))
        .await
        .unwrap();
    repo.rentals
        .record_payment(rental.id, PaymentMethod::Cash, 200.0, date(2024, 3, 4))
        .await
        .unwrap();

    let now = at(2024, 3, 10, 12, 0);
    assert_eq!(repo.rentals.reconcile_expired(now).await.unwrap(), 1);
    assert_eq!(repo.rentals.reconcile_expired(now).await.unwrap(), 0);
}

#[tokio::test]
async fn reconciler_skips_unpaid_and_future_rentals() {
    let repo = test_repository().await;
    let unpaid_vehicle = register_vehicle(&repo, "Onix", "AAA1A11", 100.0).await;
    let future_vehicle = register_vehicle(&repo, "Gol", "BBB2B22", 80.0).await;

    // Overdue but unpaid: stays active
    repo.rentals
        .create(&booking(unpaid_vehicle, "Maria", date(2024, 3, 1), date(2024, 3, 3)))
        .await
        .unwrap();

    // Paid but not yet due: stays active
    let future = repo
        .rentals
        .create(&booking(future_vehicle, "João", date(2024, 3, 9), date(2024, 3, 12)))
        .await
        .unwrap();
    repo.rentals
        .record_payment(future.id, PaymentMethod::Pix, 240.0, date(2024, 3, 9))
        .await
        .unwrap();

    assert_eq!(
        repo.rentals.reconcile_expired(at(2024, 3, 10, 0, 0)).await.unwrap(),
        0
    );

    for vehicle_id in [unpaid_vehicle, future_vehicle] {
        let vehicle = repo.vehicles.get_by_id(vehicle_id).await.unwrap();
        assert_eq!(vehicle.status, VehicleStatus::Rented);
    }
}

#[tokio::test]
async fn reconciler_respects_return_time_on_due_date() {
    let repo = test_repository().await;
    let vehicle_id = register_vehicle(&repo, "Onix", "AAA1A11", 100.0).await;

    let rental = repo
        .rentals
        .create(&booking(vehicle_id, "Maria", date(2024, 3, 1), date(2024, 3, 3)))
        .await
        .unwrap();
    repo.rentals
        .record_payment(rental.id, PaymentMethod::Pix, 200.0, date(2024, 3, 2))
        .await
        .unwrap();

    // Return is at 10:00; at 09:00 the rental is not yet overdue
    assert_eq!(
        repo.rentals.reconcile_expired(at(2024, 3, 3, 9, 0)).await.unwrap(),
        0
    );
    assert_eq!(
        repo.rentals.reconcile_expired(at(2024, 3, 3, 11, 0)).await.unwrap(),
        1
    );
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn agenda_tags_pickups_and_returns() {
    let repo = test_repository().await;
    let vehicle_id = register_vehicle(&repo, "Onix", "AAA1A11", 100.0).await;

    repo.rentals
        .create(&booking(vehicle_id, "Maria", date(2024, 5, 1), date(2024, 5, 3)))
        .await
        .unwrap();

    let pickups = repo.rentals.agenda_for(date(2024, 5, 1)).await.unwrap();
    assert_eq!(pickups.len(), 1);
    assert_eq!(pickups[0].kind, AgendaKind::Pickup);
    assert_eq!(pickups[0].vehicle_plate, "AAA1A11");

    let returns = repo.rentals.agenda_for(date(2024, 5, 3)).await.unwrap();
    assert_eq!(returns.len(), 1);
    assert_eq!(returns[0].kind, AgendaKind::Return);

    // Days the rental merely spans do not appear in the agenda
    assert!(repo.rentals.agenda_for(date(2024, 5, 2)).await.unwrap().is_empty());
}

#[tokio::test]
async fn monthly_calendar_includes_spanning_rentals() {
    let repo = test_repository().await;
    let vehicle_id = register_vehicle(&repo, "Onix", "AAA1A11", 100.0).await;

    // Spans the April/May boundary
    repo.rentals
        .create(&booking(vehicle_id, "Maria", date(2024, 4, 28), date(2024, 5, 2)))
        .await
        .unwrap();

    let april = repo
        .rentals
        .list_for_range(date(2024, 4, 1), date(2024, 4, 30))
        .await
        .unwrap();
    assert_eq!(april.len(), 1);

    let may = repo
        .rentals
        .list_for_range(date(2024, 5, 1), date(2024, 5, 31))
        .await
        .unwrap();
    assert_eq!(may.len(), 1);

    let june = repo
        .rentals
        .list_for_range(date(2024, 6, 1), date(2024, 6, 30))
        .await
        .unwrap();
    assert!(june.is_empty());
}

#[tokio::test]
async fn revenue_sums_are_zero_on_an_empty_store() {
    let repo = test_repository().await;

    assert_eq!(repo.rentals.total_revenue().await.unwrap(), 0.0);
    assert_eq!(repo.rentals.pending_revenue().await.unwrap(), 0.0);
    assert_eq!(
        repo.rentals
            .revenue_between(date(2024, 3, 1), date(2024, 3, 31))
            .await
            .unwrap(),
        0.0
    );
}

#[tokio::test]
async fn financial_summary_follows_received_amounts() {
    let repo = test_repository().await;
    let a = register_vehicle(&repo, "Onix", "AAA1A11", 100.0).await;
    let b = register_vehicle(&repo, "Gol", "BBB2B22", 50.0).await;
    let c = register_vehicle(&repo, "Uno", "CCC3C33", 30.0).await;

    let today = chrono::Local::now().date_naive();

    // A: paid, amount received 100
    let rental_a = repo
        .rentals
        .create(&booking(a, "A", date(2024, 3, 1), date(2024, 3, 1)))
        .await
        .unwrap();
    repo.rentals
        .record_payment(rental_a.id, PaymentMethod::Pix, 100.0, today)
        .await
        .unwrap();

    // B: paid, no received amount recorded, total 50
    let rental_b = repo
        .rentals
        .create(&booking(b, "B", date(2024, 3, 1), date(2024, 3, 1)))
        .await
        .unwrap();
    repo.rentals
        .record_payment(rental_b.id, PaymentMethod::Cash, 50.0, today)
        .await
        .unwrap();
    sqlx::query("UPDATE rentals SET amount_received = NULL WHERE id = ?")
        .bind(rental_b.id)
        .execute(&repo.pool)
        .await
        .unwrap();

    // C: active and pending, total 30
    repo.rentals
        .create(&booking(c, "C", date(2024, 3, 1), date(2024, 3, 1)))
        .await
        .unwrap();

    assert_eq!(repo.rentals.total_revenue().await.unwrap(), 150.0);
    assert_eq!(repo.rentals.pending_revenue().await.unwrap(), 30.0);

    let (month_start, month_end) = month_range_of(today);
    assert_eq!(
        repo.rentals.revenue_between(month_start, month_end).await.unwrap(),
        150.0
    );
    // A month with no payments sums to zero
    assert_eq!(
        repo.rentals
            .revenue_between(date(1999, 1, 1), date(1999, 1, 31))
            .await
            .unwrap(),
        0.0
    );
}

#[tokio::test]
async fn history_filters_by_status_and_period() {
    let repo = test_repository().await;
    let vehicle_id = register_vehicle(&repo, "Onix", "AAA1A11", 100.0).await;

    let first = repo
        .rentals
        .create(&booking(vehicle_id, "Maria", date(2024, 3, 1), date(2024, 3, 3)))
        .await
        .unwrap();
    repo.rentals.cancel(first.id).await.unwrap();
    repo.rentals
        .create(&booking(vehicle_id, "João", date(2024, 4, 1), date(2024, 4, 3)))
        .await
        .unwrap();

    let all = repo.rentals.list_all().await.unwrap();
    assert_eq!(all.len(), 2);
    // Newest first
    assert_eq!(all[0].customer_name, "João");

    let cancelled = repo.rentals.list_by_status(RentalStatus::Cancelled).await.unwrap();
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0].id, first.id);

    let march = repo
        .rentals
        .list_by_period(date(2024, 3, 1), date(2024, 3, 31))
        .await
        .unwrap();
    assert_eq!(march.len(), 1);
    assert_eq!(march[0].customer_name, "Maria");

    // Status and period narrow each other down when both are given
    let cancelled_in_march = repo
        .rentals
        .list_by_status_in_period(RentalStatus::Cancelled, date(2024, 3, 1), date(2024, 3, 31))
        .await
        .unwrap();
    assert_eq!(cancelled_in_march.len(), 1);
    assert_eq!(cancelled_in_march[0].id, first.id);

    let active_in_march = repo
        .rentals
        .list_by_status_in_period(RentalStatus::Active, date(2024, 3, 1), date(2024, 3, 31))
        .await
        .unwrap();
    assert!(active_in_march.is_empty());

    let services = Services::new(repo.clone());
    let combined = services
        .rentals
        .history(
            Some(RentalStatus::Cancelled),
            Some((date(2024, 3, 1), date(2024, 3, 31))),
        )
        .await
        .unwrap();
    assert_eq!(combined.len(), 1);
    assert_eq!(combined[0].id, first.id);
}

#[tokio::test]
async fn fleet_listing_shows_active_rental() {
    let repo = test_repository().await;
    let onix = register_vehicle(&repo, "Onix", "AAA1A11", 100.0).await;
    register_vehicle(&repo, "Gol", "BBB2B22", 80.0).await;

    repo.rentals
        .create(&booking(onix, "Maria", date(2024, 3, 1), date(2024, 3, 3)))
        .await
        .unwrap();

    let fleet = repo.vehicles.list_with_active_rental().await.unwrap();
    assert_eq!(fleet.len(), 2);

    let gol = fleet.iter().find(|v| v.model == "Gol").unwrap();
    assert!(gol.rental_id.is_none());

    let rented = fleet.iter().find(|v| v.model == "Onix").unwrap();
    assert_eq!(rented.status, VehicleStatus::Rented);
    assert_eq!(rented.customer_name.as_deref(), Some("Maria"));
    assert_eq!(rented.end_date, Some(date(2024, 3, 3)));
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

#[tokio::test]
async fn service_validation_rejects_bad_input() {
    let repo = test_repository().await;
    let services = Services::new(repo.clone());
    let vehicle_id = register_vehicle(&repo, "Onix", "AAA1A11", 100.0).await;

    let mut nameless = booking(vehicle_id, "", date(2024, 3, 1), date(2024, 3, 3));
    let err = services.rentals.create(nameless).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    nameless = booking(vehicle_id, "Maria", date(2024, 3, 3), date(2024, 3, 1));
    let err = services.rentals.create(nameless).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = services
        .vehicles
        .register(CreateVehicle {
            model: "Gol".to_string(),
            plate: "BBB2B22".to_string(),
            daily_rate: -1.0,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn stats_count_rentals_and_fleet() {
    let repo = test_repository().await;
    let services = Services::new(repo.clone());
    let onix = register_vehicle(&repo, "Onix", "AAA1A11", 100.0).await;
    let gol = register_vehicle(&repo, "Gol", "BBB2B22", 80.0).await;

    let active = repo
        .rentals
        .create(&booking(onix, "Maria", date(2024, 3, 1), date(2024, 3, 3)))
        .await
        .unwrap();
    let cancelled = repo
        .rentals
        .create(&booking(gol, "João", date(2024, 3, 1), date(2024, 3, 3)))
        .await
        .unwrap();
    repo.rentals.cancel(cancelled.id).await.unwrap();
    let completed = repo
        .rentals
        .create(&booking(gol, "Ana", date(2024, 4, 1), date(2024, 4, 2)))
        .await
        .unwrap();
    repo.rentals.complete(completed.id).await.unwrap();

    let stats = services.stats.general().await.unwrap();
    assert_eq!(stats.rentals.total, 3);
    assert_eq!(stats.rentals.active, 1);
    assert_eq!(stats.rentals.completed, 1);
    assert_eq!(stats.rentals.cancelled, 1);
    assert_eq!(stats.fleet.total, 2);
    assert_eq!(stats.fleet.rented, 1);
    assert_eq!(stats.fleet.available, 1);
    assert_eq!(active.status, RentalStatus::Active);
}

//! Demo data for a fresh station, used by the binary and by integration tests.

use chrono::NaiveDate;
use shared::{
    DailyRecord, Expense, ExpenseCategory, ExpenseType, PriceChange, RecordStatus, Role, Station, Tank, User,
};

fn october(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, day).unwrap_or_default()
}

/// Last day covered by the demo data
pub fn seed_date() -> NaiveDate {
    october(20)
}

pub fn daily_records() -> Vec<DailyRecord> {
    vec![DailyRecord {
        id: DailyRecord::generate_id(),
        date: october(20),
        opening_meter: Some(15420.0),
        closing_meter: Some(18650.0),
        unit_price: Some(1.45),
        litres_sold: 3230.0,
        total_sales: 4683.5,
        operator_name: "John Doe".to_string(),
        notes: Some("Normal operations".to_string()),
        status: RecordStatus::Submitted,
    }]
}

/// Diesel price history, newest first
pub fn price_history() -> Vec<PriceChange> {
    vec![
        PriceChange {
            id: PriceChange::generate_id(),
            date: october(18),
            product: "Diesel".to_string(),
            old_price: 1.42,
            new_price: 1.45,
            changed_by: "Admin User".to_string(),
            reason: "Market price adjustment".to_string(),
        },
        PriceChange {
            id: PriceChange::generate_id(),
            date: october(15),
            product: "Diesel".to_string(),
            old_price: 1.38,
            new_price: 1.42,
            changed_by: "Admin User".to_string(),
            reason: "Supplier price increase".to_string(),
        },
    ]
}

fn tank(id: &str, name: &str, capacity: f64, opening: f64, closing: f64) -> Tank {
    Tank {
        id: id.to_string(),
        name: name.to_string(),
        capacity,
        opening_reading: opening,
        closing_reading: closing,
        refill_volume: 0.0,
        current_level: closing,
    }
}

pub fn tanks() -> Vec<Tank> {
    vec![
        tank("tank::a", "Tank A - Diesel", 50000.0, 35000.0, 32500.0),
        tank("tank::b", "Tank B - Premium", 40000.0, 30000.0, 28000.0),
        tank("tank::c", "Tank C - Regular", 45000.0, 40000.0, 38000.0),
    ]
}

fn expense(
    date: NaiveDate,
    description: &str,
    amount: f64,
    category: ExpenseCategory,
    expense_type: ExpenseType,
) -> Expense {
    Expense {
        id: Expense::generate_id(),
        date,
        description: description.to_string(),
        amount,
        category,
        expense_type,
        approved_by: Some("Manager".to_string()),
        receipt: None,
    }
}

pub fn expenses() -> Vec<Expense> {
    vec![
        expense(october(20), "VIP Customer - Fleet Account", 450.0, ExpenseCategory::VipSales, ExpenseType::Vip),
        expense(october(20), "Maintenance - Pump Repair", 120.0, ExpenseCategory::Maintenance, ExpenseType::Operational),
        expense(october(19), "Utilities - Electricity", 280.0, ExpenseCategory::Utilities, ExpenseType::Operational),
    ]
}

fn user(name: &str, email: &str, role: Role, station: &str) -> User {
    User {
        id: User::generate_id(),
        name: name.to_string(),
        email: email.to_string(),
        role,
        station: station.to_string(),
        active: true,
    }
}

pub fn users() -> Vec<User> {
    vec![
        user("John Doe", "john@fuelstation.com", Role::Manager, "Station Alpha"),
        user("Jane Smith", "jane@fuelstation.com", Role::Attendant, "Station Alpha"),
        user("Mike Johnson", "mike@fuelstation.com", Role::Admin, "All Stations"),
    ]
}

fn station(name: &str, location: &str, manager: &str) -> Station {
    Station {
        id: Station::generate_id(),
        name: name.to_string(),
        location: location.to_string(),
        manager: manager.to_string(),
        active: true,
    }
}

pub fn stations() -> Vec<Station> {
    vec![
        station("Station Alpha", "Downtown", "John Doe"),
        station("Station Beta", "Highway 101", "Sarah Wilson"),
    ]
}

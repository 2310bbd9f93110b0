//! # Domain Module
//!
//! Contains all business logic for the fuel station operations core.
//!
//! The services here own the station's collections and enforce the rules
//! around them. They know nothing about screens, storage or export file
//! formats; a presentation layer parses form input into commands and turns
//! `StationError`s into notifications.
//!
//! ## Module Organization
//!
//! - **money**: Currency rounding, form input parsing and display formatting
//! - **daily_operations**: Daily meter records, live totals and submission
//! - **tank_service**: Tank levels, fill status bands and the reading editor
//! - **price_service**: Append-only price change ledger per product
//! - **expense_service**: Expenses, VIP sales and their totals
//! - **report_service**: Date range filtering, sales grouping and export snapshots
//! - **dashboard_service**: Today's figures and the weekly sales trend
//! - **admin_service**: Users, stations and station settings
//! - **seed_data**: Demo data for a fresh station
//!
//! ## Business Rules
//!
//! - Litres sold is `closing - opening` and total sales is litres times unit
//!   price, rounded half away from zero to cents
//! - A daily record cannot be submitted with a closing meter below its opening
//!   meter, and a Submitted record never changes again
//! - A tank's current level is its closing reading plus refill volume and may
//!   not exceed capacity when readings are committed
//! - Each price change's old price is the product's previous new price
//! - Expense totals are always recomputed from the entries
//! - Reports and the dashboard only count Submitted daily records

pub mod admin_service;
pub mod commands;
pub mod daily_operations;
pub mod dashboard_service;
pub mod errors;
pub mod expense_service;
pub mod money;
pub mod price_service;
pub mod report_service;
pub mod seed_data;
pub mod tank_service;

pub use admin_service::AdminService;
pub use daily_operations::DailyOperationsService;
pub use dashboard_service::DashboardService;
pub use errors::{ErrorKind, StationError, StationResult};
pub use expense_service::ExpenseService;
pub use price_service::PriceService;
pub use report_service::{Dated, ReportService};
pub use tank_service::TankService;

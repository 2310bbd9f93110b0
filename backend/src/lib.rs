//! # Backend
//!
//! Wires the station's domain services together. Each service owns one
//! collection; read-only views (dashboard, reports) borrow from the owners.
//! The backend is UI-agnostic: any presentation layer can drive it.

pub mod domain;

use chrono::NaiveDate;
use log::info;
use shared::{
    DashboardSnapshot, ExportFormat, ExportSnapshot, ReportDataset, ReportRequest, StationConfig, StationReport,
    StationSettings,
};

use crate::domain::seed_data;
use crate::domain::{
    AdminService, DailyOperationsService, DashboardService, ExpenseService, PriceService, ReportService,
    StationResult, TankService,
};

/// Main application state that holds all services
#[derive(Debug, Clone)]
pub struct Backend {
    pub config: StationConfig,
    pub daily_operations: DailyOperationsService,
    pub tank_service: TankService,
    pub price_service: PriceService,
    pub expense_service: ExpenseService,
    pub report_service: ReportService,
    pub dashboard_service: DashboardService,
    pub admin_service: AdminService,
}

impl Backend {
    /// A station with no history
    pub fn new(config: StationConfig) -> Self {
        let settings = StationSettings {
            default_price: config.default_unit_price,
            ..StationSettings::default()
        };
        Self {
            daily_operations: DailyOperationsService::new(config.clone()),
            tank_service: TankService::new(config.clone()),
            price_service: PriceService::new(config.default_unit_price),
            expense_service: ExpenseService::new(config.clone()),
            report_service: ReportService::new(config.clone()),
            dashboard_service: DashboardService::new(config.clone()),
            admin_service: AdminService::new(Vec::new(), Vec::new(), settings),
            config,
        }
    }

    /// A station pre-loaded with the demo data
    pub fn with_seed_data(config: StationConfig) -> StationResult<Self> {
        info!("Setting up domain services with demo data for {}", config.station_name);
        let mut backend = Self::new(config.clone());
        backend.daily_operations = DailyOperationsService::with_records(config.clone(), seed_data::daily_records());
        backend.tank_service = TankService::with_tanks(config.clone(), seed_data::tanks())?;
        backend.price_service = PriceService::from_history(seed_data::price_history(), config.default_unit_price)?;
        backend.expense_service = ExpenseService::with_expenses(config, seed_data::expenses());
        backend.admin_service = AdminService::new(
            seed_data::users(),
            seed_data::stations(),
            backend.admin_service.settings().clone(),
        );
        Ok(backend)
    }

    /// Save station settings and apply the default price to new drafts and
    /// to products without price history
    pub fn save_settings(&mut self, settings: StationSettings) -> StationResult<StationSettings> {
        let saved = self.admin_service.save_settings(settings)?;
        self.daily_operations.set_default_unit_price(saved.default_price);
        self.price_service.set_default_price(saved.default_price);
        info!("Default price is now {}", saved.default_price);
        Ok(saved)
    }

    pub fn dashboard(&self, date: NaiveDate) -> DashboardSnapshot {
        self.dashboard_service.snapshot(
            date,
            &self.daily_operations,
            &self.tank_service,
            &self.price_service,
            &self.expense_service,
        )
    }

    pub fn report(&self, request: &ReportRequest) -> StationReport {
        self.report_service
            .build_report(request, &self.daily_operations, &self.expense_service, &self.price_service)
    }

    pub fn export(
        &self,
        request: &ReportRequest,
        dataset: ReportDataset,
        format: ExportFormat,
        generated_on: NaiveDate,
    ) -> ExportSnapshot {
        self.report_service.export_snapshot_on(
            request,
            dataset,
            format,
            generated_on,
            &self.daily_operations,
            &self.expense_service,
            &self.price_service,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::prices::RecordPriceChangeCommand;
    use crate::domain::ErrorKind;
    use shared::{DailyRecordField, DateRange, ReportType, TankField, TankStatus};

    fn create_test_backend() -> Backend {
        Backend::with_seed_data(StationConfig::default()).unwrap()
    }

    #[test]
    fn test_seeded_dashboard() {
        let backend = create_test_backend();
        let dashboard = backend.dashboard(seed_data::seed_date());

        assert_eq!(dashboard.station_name, "Station Alpha");
        assert_eq!(dashboard.today.litres_sold, 3230.0);
        assert_eq!(dashboard.today.revenue, 4683.5);
        assert_eq!(dashboard.today.expenses, 570.0);
        assert_eq!(dashboard.tanks.len(), 3);
        assert_eq!(dashboard.tanks[0].fill_percentage, 65.0);
        assert_eq!(dashboard.tanks[0].status, TankStatus::Moderate);
        assert_eq!(dashboard.prices[0].price, 1.45);
        assert_eq!(dashboard.weekly_sales.len(), 7);
    }

    #[test]
    fn test_seeded_report_week() {
        let backend = create_test_backend();
        let request = ReportRequest {
            range: ReportService::default_range(seed_data::seed_date()),
            report_type: ReportType::Custom,
        };

        let report = backend.report(&request);

        assert_eq!(report.range, DateRange::new(seed_data::seed_date() - chrono::Duration::days(6), seed_data::seed_date()));
        assert_eq!(report.sales[0].revenue, 4683.5);
        assert_eq!(report.expense_totals.total, 850.0);
        assert_eq!(report.price_changes.len(), 2);

        let export = backend.export(&request, ReportDataset::Sales, ExportFormat::Csv, seed_data::seed_date());
        assert_eq!(export.rows.len(), 1);
    }

    #[test]
    fn test_day_of_operations() {
        let mut backend = create_test_backend();
        let day = seed_data::seed_date().succ_opt().unwrap();

        // Attendant fills in and submits the next day's record
        let draft = backend.daily_operations.new_draft_on(day, "Jane Smith");
        let draft = backend
            .daily_operations
            .update_draft_field(&draft, DailyRecordField::OpeningMeter, "18650")
            .unwrap();
        let draft = backend
            .daily_operations
            .update_draft_field(&draft, DailyRecordField::ClosingMeter, "19650")
            .unwrap();
        let submitted = backend.daily_operations.submit_daily_record(draft).unwrap();
        assert_eq!(submitted.total_sales, 1450.0);

        // A delivery arrives for Tank A
        backend
            .tank_service
            .update_tank_reading("tank::a", TankField::RefillVolume, 10000.0)
            .unwrap();
        backend.tank_service.commit_tank_edit("tank::a").unwrap();
        assert_eq!(backend.tank_service.summary("tank::a").unwrap().status, TankStatus::Good);

        // Price goes up
        backend
            .price_service
            .record_price_change_on(
                RecordPriceChangeCommand {
                    product: "Diesel".to_string(),
                    new_price: Some(1.49),
                    reason: "Market price adjustment".to_string(),
                    changed_by: "Mike Johnson".to_string(),
                },
                day,
            )
            .unwrap();

        let dashboard = backend.dashboard(day);
        assert_eq!(dashboard.today.revenue, 1450.0);
        assert_eq!(dashboard.prices[0].price, 1.49);
        assert_eq!(dashboard.weekly_sales[5].revenue, 4683.5);
        assert_eq!(dashboard.weekly_sales[6].revenue, 1450.0);
    }

    #[test]
    fn test_unknown_tank_is_not_found() {
        let mut backend = create_test_backend();
        let error = backend
            .tank_service
            .update_tank_reading("tank::z", TankField::ClosingReading, 1.0)
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_empty_backend_uses_configured_price() {
        let config = StationConfig {
            default_unit_price: 1.6,
            ..StationConfig::default()
        };
        let backend = Backend::new(config);
        assert_eq!(backend.price_service.current_price("Diesel"), 1.6);
        assert_eq!(backend.admin_service.settings().default_price, 1.6);
        assert!(backend.tank_service.tanks().is_empty());
    }

    #[test]
    fn test_saved_default_price_reaches_drafts_and_prices() {
        let mut backend = create_test_backend();
        backend
            .save_settings(StationSettings {
                default_price: 1.6,
                ..StationSettings::default()
            })
            .unwrap();

        let draft = backend.daily_operations.new_draft_on(seed_data::seed_date(), "Jane Smith");
        assert_eq!(draft.unit_price, Some(1.6));
        assert_eq!(backend.price_service.current_price("Premium"), 1.6);
        // Products with history keep their ledger price
        assert_eq!(backend.price_service.current_price("Diesel"), 1.45);

        let rejected = backend.save_settings(StationSettings {
            default_price: 0.0,
            ..StationSettings::default()
        });
        assert!(rejected.is_err());
        let draft = backend.daily_operations.new_draft_on(seed_data::seed_date(), "Jane Smith");
        assert_eq!(draft.unit_price, Some(1.6));
    }
}

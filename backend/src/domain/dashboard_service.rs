//! Dashboard aggregation.
//!
//! Read-only: pulls today's numbers, the tank cards, current prices and the
//! weekly sales trend out of the owning services.

use chrono::{Duration, NaiveDate};
use log::debug;
use shared::{DailyRecord, DailySalesPoint, DashboardSnapshot, Expense, ProductPrice, StationConfig, TodayStats};

use crate::domain::daily_operations::DailyOperationsService;
use crate::domain::expense_service::ExpenseService;
use crate::domain::money;
use crate::domain::price_service::PriceService;
use crate::domain::tank_service::TankService;

/// Headline figures for one day; only Submitted records count as sales
pub fn today_stats(records: &[DailyRecord], expenses: &[Expense], date: NaiveDate) -> TodayStats {
    let todays_records: Vec<&DailyRecord> = records
        .iter()
        .filter(|r| r.date == date && r.is_submitted())
        .collect();
    let revenue = money::sum_currency(todays_records.iter().map(|r| r.total_sales));
    let spent = money::sum_currency(expenses.iter().filter(|e| e.date == date).map(|e| e.amount));

    TodayStats {
        date,
        litres_sold: money::sum_currency(todays_records.iter().map(|r| r.litres_sold)),
        revenue,
        expenses: spent,
        net_balance: money::round_currency(money::difference(spent, revenue)),
    }
}

/// Seven days of sales ending on `week_ending`, oldest first, with empty days as zero
pub fn weekly_sales(records: &[DailyRecord], week_ending: NaiveDate) -> Vec<DailySalesPoint> {
    (0..7)
        .rev()
        .map(|offset| week_ending - Duration::days(offset))
        .map(|day| {
            let sold: Vec<&DailyRecord> = records
                .iter()
                .filter(|r| r.date == day && r.is_submitted())
                .collect();
            DailySalesPoint {
                date: day,
                day: day.format("%a").to_string(),
                litres: money::sum_currency(sold.iter().map(|r| r.litres_sold)),
                revenue: money::sum_currency(sold.iter().map(|r| r.total_sales)),
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct DashboardService {
    config: StationConfig,
}

impl DashboardService {
    pub fn new(config: StationConfig) -> Self {
        Self { config }
    }

    /// Current price per product; the default product is always listed
    pub fn current_prices(&self, price_service: &PriceService) -> Vec<ProductPrice> {
        let mut products = price_service.products();
        if !products.contains(&self.config.default_product) {
            products.insert(0, self.config.default_product.clone());
        }
        products
            .into_iter()
            .map(|product| ProductPrice {
                price: price_service.current_price(&product),
                product,
            })
            .collect()
    }

    pub fn snapshot(
        &self,
        date: NaiveDate,
        daily_operations: &DailyOperationsService,
        tank_service: &TankService,
        price_service: &PriceService,
        expense_service: &ExpenseService,
    ) -> DashboardSnapshot {
        let snapshot = DashboardSnapshot {
            station_name: self.config.station_name.clone(),
            today: today_stats(daily_operations.records(), expense_service.expenses(), date),
            tanks: tank_service.summaries(),
            prices: self.current_prices(price_service),
            weekly_sales: weekly_sales(daily_operations.records(), date),
        };
        debug!(
            "Dashboard for {} on {}: revenue {}, {} tanks",
            snapshot.station_name,
            date,
            money::format_currency(&self.config.currency_symbol, snapshot.today.revenue),
            snapshot.tanks.len()
        );
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{ExpenseCategory, ExpenseType, RecordStatus};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(on: NaiveDate, litres: f64, status: RecordStatus) -> DailyRecord {
        DailyRecord {
            id: DailyRecord::generate_id(),
            date: on,
            opening_meter: Some(0.0),
            closing_meter: Some(litres),
            unit_price: Some(1.45),
            litres_sold: litres,
            total_sales: money::line_total(litres, 1.45),
            operator_name: "Jane Smith".to_string(),
            notes: None,
            status,
        }
    }

    fn expense(on: NaiveDate, amount: f64, expense_type: ExpenseType) -> Expense {
        Expense {
            id: Expense::generate_id(),
            date: on,
            description: "Pump Repair".to_string(),
            amount,
            category: ExpenseCategory::Maintenance,
            expense_type,
            approved_by: None,
            receipt: None,
        }
    }

    #[test]
    fn test_today_stats() {
        let today = date(2025, 10, 20);
        let records = vec![
            record(today, 3230.0, RecordStatus::Submitted),
            record(today, 100.0, RecordStatus::Draft),
            record(date(2025, 10, 19), 50.0, RecordStatus::Submitted),
        ];
        let expenses = vec![
            expense(today, 450.0, ExpenseType::Vip),
            expense(today, 120.0, ExpenseType::Operational),
            expense(date(2025, 10, 19), 280.0, ExpenseType::Operational),
        ];

        let stats = today_stats(&records, &expenses, today);

        assert_eq!(stats.litres_sold, 3230.0);
        assert_eq!(stats.revenue, 4683.5);
        assert_eq!(stats.expenses, 570.0);
        assert_eq!(stats.net_balance, 4113.5);
    }

    #[test]
    fn test_today_stats_empty_day() {
        let stats = today_stats(&[], &[expense(date(2025, 10, 20), 10.0, ExpenseType::Operational)], date(2025, 10, 20));
        assert_eq!(stats.revenue, 0.0);
        assert_eq!(stats.net_balance, -10.0);
    }

    #[test]
    fn test_weekly_sales_zero_filled() {
        // 2025-10-19 is a Sunday
        let sunday = date(2025, 10, 19);
        let records = vec![
            record(date(2025, 10, 13), 1000.0, RecordStatus::Submitted),
            record(sunday, 200.0, RecordStatus::Submitted),
            record(date(2025, 10, 12), 999.0, RecordStatus::Submitted),
        ];

        let week = weekly_sales(&records, sunday);

        assert_eq!(week.len(), 7);
        let labels: Vec<&str> = week.iter().map(|p| p.day.as_str()).collect();
        assert_eq!(labels, vec!["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]);
        assert_eq!(week[0].litres, 1000.0);
        assert_eq!(week[0].revenue, 1450.0);
        assert_eq!(week[3].litres, 0.0);
        assert_eq!(week[6].date, sunday);
        assert_eq!(week[6].litres, 200.0);
    }

    #[test]
    fn test_current_prices_include_default_product() {
        let service = DashboardService::new(StationConfig::default());
        let prices = PriceService::new(1.45);
        let listed = service.current_prices(&prices);
        assert_eq!(
            listed,
            vec![ProductPrice {
                product: "Diesel".to_string(),
                price: 1.45
            }]
        );
    }
}

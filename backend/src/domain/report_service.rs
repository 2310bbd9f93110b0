//! Reporting views over the station's records.
//!
//! Every report is a read-only view: it filters the owning services'
//! collections by an inclusive date range and aggregates the result. Only
//! Submitted daily records count towards sales. Building the actual PDF,
//! spreadsheet or CSV file is left to whoever consumes the `ExportSnapshot`.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Local, NaiveDate};
use log::{debug, info};
use serde_json::{json, Map, Value};
use shared::{
    DailyRecord, DateRange, Expense, ExportFormat, ExportSnapshot, PriceChange, ReportDataset, ReportRequest,
    ReportType, SalesPeriodSummary, StationConfig, StationReport,
};

use crate::domain::daily_operations::DailyOperationsService;
use crate::domain::expense_service::{expense_totals, totals_by_category, ExpenseService};
use crate::domain::money;
use crate::domain::price_service::{price_delta, PriceService};

/// Anything that belongs to a single calendar day
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

impl Dated for DailyRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for PriceChange {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for Expense {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Items dated within `[from, to]`, in input order.
/// An inverted range matches nothing.
pub fn filter_by_date_range<T: Dated + Clone>(items: &[T], range: &DateRange) -> Vec<T> {
    items
        .iter()
        .filter(|item| range.contains(item.date()))
        .cloned()
        .collect()
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next_month.and_then(|d| d.pred_opt()).unwrap_or(first);
    (first, last)
}

/// Bucket bounds and label for a record date
fn bucket_for(date: NaiveDate, report_type: ReportType, range: &DateRange) -> (NaiveDate, NaiveDate, String) {
    match report_type {
        ReportType::Daily => (date, date, date.format("%Y-%m-%d").to_string()),
        ReportType::Weekly => {
            let start = week_start(date);
            let week = date.iso_week();
            (start, start + Duration::days(6), format!("{}-W{:02}", week.year(), week.week()))
        }
        ReportType::Monthly => {
            let (first, last) = month_bounds(date);
            (first, last, first.format("%B %Y").to_string())
        }
        ReportType::Custom => (range.from, range.to, format!("{} to {}", range.from, range.to)),
    }
}

/// Sales per period for the Submitted records inside the range, oldest first.
///
/// Daily, weekly and monthly reports only list periods that have records; a
/// custom report is always one period spanning the whole range.
pub fn group_sales(records: &[DailyRecord], range: &DateRange, report_type: ReportType) -> Vec<SalesPeriodSummary> {
    if range.is_inverted() {
        return Vec::new();
    }

    let mut buckets: BTreeMap<NaiveDate, (NaiveDate, String, Vec<&DailyRecord>)> = BTreeMap::new();
    if report_type == ReportType::Custom {
        let (start, end, label) = bucket_for(range.from, report_type, range);
        buckets.insert(start, (end, label, Vec::new()));
    }

    for record in records.iter().filter(|r| r.is_submitted() && range.contains(r.date)) {
        let (start, end, label) = bucket_for(record.date, report_type, range);
        buckets
            .entry(start)
            .or_insert_with(|| (end, label, Vec::new()))
            .2
            .push(record);
    }

    buckets
        .into_iter()
        .map(|(start, (end, label, members))| SalesPeriodSummary {
            period_start: start,
            period_end: end,
            label,
            litres_sold: money::sum_currency(members.iter().map(|r| r.litres_sold)),
            revenue: money::sum_currency(members.iter().map(|r| r.total_sales)),
            record_count: members.len(),
        })
        .collect()
}

fn into_row(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

fn dataset_name(dataset: ReportDataset) -> &'static str {
    match dataset {
        ReportDataset::Sales => "sales",
        ReportDataset::DailyRecords => "daily-records",
        ReportDataset::Expenses => "expenses",
        ReportDataset::PriceChanges => "price-changes",
    }
}

/// Builds reports and export snapshots from the other services' data
#[derive(Debug, Clone)]
pub struct ReportService {
    config: StationConfig,
}

impl ReportService {
    pub fn new(config: StationConfig) -> Self {
        Self { config }
    }

    /// Range shown when the reports screen opens: the seven days ending today
    pub fn default_range(today: NaiveDate) -> DateRange {
        DateRange::new(today - Duration::days(6), today)
    }

    pub fn build_report(
        &self,
        request: &ReportRequest,
        daily_operations: &DailyOperationsService,
        expense_service: &ExpenseService,
        price_service: &PriceService,
    ) -> StationReport {
        let range = &request.range;
        let expenses = filter_by_date_range(expense_service.expenses(), range);
        let report = StationReport {
            range: *range,
            report_type: request.report_type,
            sales: group_sales(daily_operations.records(), range, request.report_type),
            expense_totals: expense_totals(&expenses),
            expenses_by_category: totals_by_category(&expenses),
            price_changes: filter_by_date_range(price_service.entries(), range),
        };

        info!(
            "REPORT: {:?} report for {} to {}: {} sales periods, {} expenses, {} price changes",
            request.report_type,
            range.from,
            range.to,
            report.sales.len(),
            expenses.len(),
            report.price_changes.len()
        );
        report
    }

    pub fn export_snapshot(
        &self,
        request: &ReportRequest,
        dataset: ReportDataset,
        format: ExportFormat,
        daily_operations: &DailyOperationsService,
        expense_service: &ExpenseService,
        price_service: &PriceService,
    ) -> ExportSnapshot {
        self.export_snapshot_on(
            request,
            dataset,
            format,
            Local::now().date_naive(),
            daily_operations,
            expense_service,
            price_service,
        )
    }

    /// Filtered rows for one dataset, ready for a file writer
    #[allow(clippy::too_many_arguments)]
    pub fn export_snapshot_on(
        &self,
        request: &ReportRequest,
        dataset: ReportDataset,
        format: ExportFormat,
        generated_on: NaiveDate,
        daily_operations: &DailyOperationsService,
        expense_service: &ExpenseService,
        price_service: &PriceService,
    ) -> ExportSnapshot {
        let range = &request.range;
        let (columns, rows) = match dataset {
            ReportDataset::Sales => self.sales_rows(daily_operations.records(), request),
            ReportDataset::DailyRecords => self.daily_record_rows(daily_operations.records(), range),
            ReportDataset::Expenses => self.expense_rows(expense_service.expenses(), range),
            ReportDataset::PriceChanges => self.price_change_rows(price_service.entries(), range),
        };

        let file_name = format!(
            "{}-{}-{}-to-{}.{}",
            slug(&self.config.station_name),
            dataset_name(dataset),
            range.from,
            range.to,
            format.file_extension()
        );

        debug!("EXPORT: {} rows for {}", rows.len(), file_name);
        ExportSnapshot {
            format,
            dataset,
            range: *range,
            generated_on,
            file_name,
            columns,
            rows,
        }
    }

    fn sales_rows(&self, records: &[DailyRecord], request: &ReportRequest) -> (Vec<String>, Vec<Map<String, Value>>) {
        let rows = group_sales(records, &request.range, request.report_type)
            .into_iter()
            .map(|period| {
                into_row(json!({
                    "period": period.label,
                    "from": period.period_start.to_string(),
                    "to": period.period_end.to_string(),
                    "litres_sold": period.litres_sold,
                    "revenue": period.revenue,
                    "records": period.record_count,
                }))
            })
            .collect();
        (columns(&["period", "from", "to", "litres_sold", "revenue", "records"]), rows)
    }

    fn daily_record_rows(&self, records: &[DailyRecord], range: &DateRange) -> (Vec<String>, Vec<Map<String, Value>>) {
        let rows = filter_by_date_range(records, range)
            .into_iter()
            .filter(|r| r.is_submitted())
            .map(|r| {
                into_row(json!({
                    "date": r.date.to_string(),
                    "operator": r.operator_name,
                    "opening_meter": r.opening_meter,
                    "closing_meter": r.closing_meter,
                    "unit_price": r.unit_price,
                    "litres_sold": r.litres_sold,
                    "total_sales": r.total_sales,
                    "notes": r.notes,
                }))
            })
            .collect();
        (
            columns(&[
                "date",
                "operator",
                "opening_meter",
                "closing_meter",
                "unit_price",
                "litres_sold",
                "total_sales",
                "notes",
            ]),
            rows,
        )
    }

    fn expense_rows(&self, expenses: &[Expense], range: &DateRange) -> (Vec<String>, Vec<Map<String, Value>>) {
        let rows = filter_by_date_range(expenses, range)
            .into_iter()
            .map(|e| {
                into_row(json!({
                    "date": e.date.to_string(),
                    "description": e.description,
                    "category": e.category.label(),
                    "type": e.expense_type.label(),
                    "amount": e.amount,
                    "approved_by": e.approved_by,
                    "receipt": e.receipt.as_ref().map(|r| r.file_name.clone()),
                }))
            })
            .collect();
        (
            columns(&["date", "description", "category", "type", "amount", "approved_by", "receipt"]),
            rows,
        )
    }

    fn price_change_rows(&self, changes: &[PriceChange], range: &DateRange) -> (Vec<String>, Vec<Map<String, Value>>) {
        let rows = filter_by_date_range(changes, range)
            .into_iter()
            .map(|c| {
                let delta = price_delta(&c);
                into_row(json!({
                    "date": c.date.to_string(),
                    "product": c.product,
                    "old_price": c.old_price,
                    "new_price": c.new_price,
                    "difference": delta.difference,
                    "percent_change": delta.percent_change,
                    "changed_by": c.changed_by,
                    "reason": c.reason,
                }))
            })
            .collect();
        (
            columns(&[
                "date",
                "product",
                "old_price",
                "new_price",
                "difference",
                "percent_change",
                "changed_by",
                "reason",
            ]),
            rows,
        )
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a daily sales record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Still being edited; derived fields are a live preview
    Draft,
    /// Finalized; the record can no longer change
    Submitted,
}

/// One day of meter readings and sales for the station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub id: String,
    pub date: NaiveDate,
    /// Cumulative pump counter at the start of the day (None until entered)
    pub opening_meter: Option<f64>,
    /// Cumulative pump counter at the end of the day (None until entered)
    pub closing_meter: Option<f64>,
    /// Price per litre
    pub unit_price: Option<f64>,
    /// closing_meter - opening_meter, recomputed on every edit
    pub litres_sold: f64,
    /// litres_sold * unit_price rounded to cents, recomputed on every edit
    pub total_sales: f64,
    pub operator_name: String,
    pub notes: Option<String>,
    pub status: RecordStatus,
}

impl DailyRecord {
    pub fn generate_id() -> String {
        format!("daily::{}", uuid::Uuid::new_v4().simple())
    }

    pub fn is_submitted(&self) -> bool {
        self.status == RecordStatus::Submitted
    }
}

/// Editable inputs of a daily record form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyRecordField {
    Date,
    OpeningMeter,
    ClosingMeter,
    UnitPrice,
    OperatorName,
    Notes,
}

/// Result of the live sales calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyTotals {
    pub litres_sold: f64,
    pub total_sales: f64,
    /// False when the closing meter is below the opening meter
    pub meter_order_valid: bool,
}

/// A fuel storage tank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    pub id: String,
    pub name: String,
    pub capacity: f64,
    /// Volume in the tank at the start of the period
    pub opening_reading: f64,
    /// Volume in the tank at the end of the period
    pub closing_reading: f64,
    /// Volume delivered during the period
    #[serde(default)]
    pub refill_volume: f64,
    /// closing_reading + refill_volume
    pub current_level: f64,
}

/// Raw reading fields that can be edited on a tank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TankField {
    OpeningReading,
    ClosingReading,
    RefillVolume,
}

impl TankField {
    pub fn name(&self) -> &'static str {
        match self {
            TankField::OpeningReading => "opening_reading",
            TankField::ClosingReading => "closing_reading",
            TankField::RefillVolume => "refill_volume",
        }
    }
}

/// Fill-level band of a tank
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TankStatus {
    Low,
    Moderate,
    Good,
}

impl TankStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TankStatus::Good => "Good",
            TankStatus::Moderate => "Moderate",
            TankStatus::Low => "Low",
        }
    }
}

/// Derived view of a tank used by both the overview cards and the reading editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankSummary {
    pub id: String,
    pub name: String,
    pub capacity: f64,
    pub current_level: f64,
    pub volume_used: f64,
    pub fill_percentage: f64,
    pub status: TankStatus,
}

/// One entry of the price audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChange {
    pub id: String,
    pub date: NaiveDate,
    pub product: String,
    pub old_price: f64,
    pub new_price: f64,
    pub changed_by: String,
    pub reason: String,
}

impl PriceChange {
    pub fn generate_id() -> String {
        format!("price::{}", uuid::Uuid::new_v4().simple())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceDirection {
    Increase,
    Decrease,
    Unchanged,
}

/// Read-time view of a price change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceDelta {
    pub difference: f64,
    /// None when the old price is zero
    pub percent_change: Option<f64>,
    pub direction: PriceDirection,
}

/// Whether an expense is a VIP sale or an operating cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseType {
    Vip,
    Operational,
}

impl ExpenseType {
    pub fn label(&self) -> &'static str {
        match self {
            ExpenseType::Vip => "VIP",
            ExpenseType::Operational => "Operational",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    VipSales,
    Maintenance,
    Utilities,
    Supplies,
    Salaries,
    Transport,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 7] = [
        ExpenseCategory::VipSales,
        ExpenseCategory::Maintenance,
        ExpenseCategory::Utilities,
        ExpenseCategory::Supplies,
        ExpenseCategory::Salaries,
        ExpenseCategory::Transport,
        ExpenseCategory::Other,
    ];

    /// Display label as shown in the category picker
    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::VipSales => "VIP Sales",
            ExpenseCategory::Maintenance => "Maintenance",
            ExpenseCategory::Utilities => "Utilities",
            ExpenseCategory::Supplies => "Supplies",
            ExpenseCategory::Salaries => "Salaries",
            ExpenseCategory::Transport => "Transport",
            ExpenseCategory::Other => "Other",
        }
    }

    /// Parse a picker label, case-insensitive
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
    }
}

/// Reference to an uploaded receipt; the file itself lives with the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptRef {
    pub file_name: String,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub category: ExpenseCategory,
    pub expense_type: ExpenseType,
    pub approved_by: Option<String>,
    pub receipt: Option<ReceiptRef>,
}

impl Expense {
    pub fn generate_id() -> String {
        format!("expense::{}", uuid::Uuid::new_v4().simple())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpenseTotals {
    pub vip: f64,
    pub operational: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub label: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Attendant,
    Manager,
    Admin,
}

/// Screens and actions listed on the role permission matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewDashboard,
    DailyOperations,
    TankReadings,
    ManagePrices,
    ManageExpenses,
    ViewReports,
    ExportData,
    UserManagement,
    SystemSettings,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Attendant => "Attendant",
            Role::Manager => "Manager",
            Role::Admin => "Admin",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "attendant" => Some(Role::Attendant),
            "manager" => Some(Role::Manager),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Role::Attendant => &[
                Permission::ViewDashboard,
                Permission::DailyOperations,
                Permission::TankReadings,
            ],
            Role::Manager => &[
                Permission::ViewDashboard,
                Permission::DailyOperations,
                Permission::TankReadings,
                Permission::ManageExpenses,
                Permission::ViewReports,
                Permission::ExportData,
            ],
            Role::Admin => &[
                Permission::ViewDashboard,
                Permission::DailyOperations,
                Permission::TankReadings,
                Permission::ManagePrices,
                Permission::ManageExpenses,
                Permission::ViewReports,
                Permission::ExportData,
                Permission::UserManagement,
                Permission::SystemSettings,
            ],
        }
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub station: String,
    pub active: bool,
}

impl User {
    pub fn generate_id() -> String {
        format!("user::{}", uuid::Uuid::new_v4().simple())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub location: String,
    pub manager: String,
    pub active: bool,
}

impl Station {
    pub fn generate_id() -> String {
        format!("station::{}", uuid::Uuid::new_v4().simple())
    }
}

/// Station-wide defaults edited on the settings screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSettings {
    pub default_price: f64,
    pub auto_backup: bool,
    pub email_notifications: bool,
    pub two_factor_auth: bool,
}

impl Default for StationSettings {
    fn default() -> Self {
        Self {
            default_price: 1.45,
            auto_backup: true,
            email_notifications: true,
            two_factor_auth: false,
        }
    }
}

/// Configuration for the station domain services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    pub station_name: String,
    pub currency_symbol: String,
    /// Unit price used for new drafts and for products without price history
    pub default_unit_price: f64,
    pub default_product: String,
    /// Lowest fill percentage that still counts as Good
    pub good_fill_threshold: f64,
    /// Lowest fill percentage that still counts as Moderate
    pub moderate_fill_threshold: f64,
    pub max_description_length: usize,
    pub expense_categories: Vec<ExpenseCategory>,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            station_name: "Station Alpha".to_string(),
            currency_symbol: "$".to_string(),
            default_unit_price: 1.45,
            default_product: "Diesel".to_string(),
            good_fill_threshold: 70.0,
            moderate_fill_threshold: 40.0,
            max_description_length: 256,
            expense_categories: ExpenseCategory::ALL.to_vec(),
        }
    }
}

impl StationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_unit_price.is_finite() || self.default_unit_price <= 0.0 {
            return Err(ConfigError::InvalidDefaultPrice(self.default_unit_price));
        }
        if self.moderate_fill_threshold < 0.0
            || self.good_fill_threshold > 100.0
            || self.moderate_fill_threshold >= self.good_fill_threshold
        {
            return Err(ConfigError::InvalidThresholds {
                good: self.good_fill_threshold,
                moderate: self.moderate_fill_threshold,
            });
        }
        if self.expense_categories.is_empty() {
            return Err(ConfigError::NoExpenseCategories);
        }
        Ok(())
    }

    pub fn allows_category(&self, category: ExpenseCategory) -> bool {
        self.expense_categories.contains(&category)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidDefaultPrice(f64),
    InvalidThresholds { good: f64, moderate: f64 },
    NoExpenseCategories,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidDefaultPrice(price) => {
                write!(f, "Default unit price must be positive, got {}", price)
            }
            ConfigError::InvalidThresholds { good, moderate } => write!(
                f,
                "Fill thresholds must satisfy 0 <= moderate < good <= 100 (good={}, moderate={})",
                good, moderate
            ),
            ConfigError::NoExpenseCategories => write!(f, "At least one expense category is required"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Inclusive calendar range used by reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    pub fn is_inverted(&self) -> bool {
        self.from > self.to
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Daily,
    Weekly,
    Monthly,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Pdf,
    Excel,
    Csv,
}

impl ExportFormat {
    pub fn file_extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Which collection an export snapshot is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportDataset {
    Sales,
    DailyRecords,
    Expenses,
    PriceChanges,
}

/// Totals for one bucket of a sales report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesPeriodSummary {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub label: String,
    pub litres_sold: f64,
    pub revenue: f64,
    pub record_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub range: DateRange,
    pub report_type: ReportType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationReport {
    pub range: DateRange,
    pub report_type: ReportType,
    pub sales: Vec<SalesPeriodSummary>,
    pub expense_totals: ExpenseTotals,
    pub expenses_by_category: Vec<CategoryTotal>,
    pub price_changes: Vec<PriceChange>,
}

/// Filtered rows handed to an export collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSnapshot {
    pub format: ExportFormat,
    pub dataset: ReportDataset,
    pub range: DateRange,
    pub generated_on: NaiveDate,
    pub file_name: String,
    /// Column order for tabular formats; every row has exactly these keys
    pub columns: Vec<String>,
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Headline numbers for the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TodayStats {
    pub date: NaiveDate,
    pub litres_sold: f64,
    pub revenue: f64,
    pub expenses: f64,
    pub net_balance: f64,
}

/// One bar of the weekly sales chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySalesPoint {
    pub date: NaiveDate,
    pub day: String,
    pub litres: f64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPrice {
    pub product: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub station_name: String,
    pub today: TodayStats,
    pub tanks: Vec<TankSummary>,
    pub prices: Vec<ProductPrice>,
    pub weekly_sales: Vec<DailySalesPoint>,
}

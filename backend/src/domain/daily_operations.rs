//! Daily operations domain logic for the fuel station.
//!
//! This module owns the daily meter/sales records. It computes litres sold and
//! total sales from the pump meter readings, keeps the live preview consistent
//! while the attendant types, and enforces the draft → submitted lifecycle.
//!
//! ## Business Rules
//!
//! - Litres sold = closing meter - opening meter; total sales = litres × unit price
//!   rounded to cents
//! - Derived fields are always recomputed from inputs and never edited directly
//! - While drafting, unparsable meters simply mean "no figure yet" and a closing
//!   meter below the opening meter shows as a negative preview
//! - Submitting requires every input and a non-decreasing meter
//! - Submitted records are immutable

use chrono::{Local, NaiveDate};
use log::{debug, info, warn};
use shared::{DailyRecord, DailyRecordField, DailyTotals, RecordStatus, StationConfig};

use crate::domain::errors::{StationError, StationResult};
use crate::domain::money;

/// Live totals from raw form input.
///
/// Never fails: a meter that is empty or not a number yields zero litres, and a
/// price that is not a number counts as zero.
pub fn compute_daily_totals(opening_meter: &str, closing_meter: &str, unit_price: &str) -> DailyTotals {
    preview_totals(
        money::parse_preview(opening_meter),
        money::parse_preview(closing_meter),
        money::parse_preview(unit_price),
    )
}

/// Totals from typed readings
pub fn calculate_totals(opening_meter: f64, closing_meter: f64, unit_price: f64) -> DailyTotals {
    let litres_sold = money::difference(opening_meter, closing_meter);
    DailyTotals {
        litres_sold,
        total_sales: money::line_total(litres_sold, unit_price),
        meter_order_valid: closing_meter >= opening_meter,
    }
}

fn preview_totals(opening: Option<f64>, closing: Option<f64>, unit_price: Option<f64>) -> DailyTotals {
    match (opening, closing) {
        (Some(opening), Some(closing)) => calculate_totals(opening, closing, unit_price.unwrap_or(0.0)),
        _ => DailyTotals {
            litres_sold: 0.0,
            total_sales: 0.0,
            meter_order_valid: true,
        },
    }
}

/// Copy of `record` with litres sold and total sales recomputed from its inputs
pub fn with_derived_totals(record: &DailyRecord) -> DailyRecord {
    let totals = preview_totals(record.opening_meter, record.closing_meter, record.unit_price);
    DailyRecord {
        litres_sold: totals.litres_sold,
        total_sales: totals.total_sales,
        ..record.clone()
    }
}

/// Owner of the station's daily records
#[derive(Debug, Clone)]
pub struct DailyOperationsService {
    config: StationConfig,
    /// Newest date first
    records: Vec<DailyRecord>,
}

impl DailyOperationsService {
    pub fn new(config: StationConfig) -> Self {
        Self {
            config,
            records: Vec::new(),
        }
    }

    /// Load existing records; derived fields are recomputed on the way in
    pub fn with_records(config: StationConfig, records: Vec<DailyRecord>) -> Self {
        let mut service = Self::new(config);
        service.records = records.iter().map(with_derived_totals).collect();
        service.sort_records();
        service
    }

    /// Unit price that new drafts start with
    pub fn set_default_unit_price(&mut self, unit_price: f64) {
        self.config.default_unit_price = unit_price;
    }

    /// Start a draft for today
    pub fn new_draft(&self, operator_name: &str) -> DailyRecord {
        self.new_draft_on(Local::now().date_naive(), operator_name)
    }

    pub fn new_draft_on(&self, date: NaiveDate, operator_name: &str) -> DailyRecord {
        DailyRecord {
            id: DailyRecord::generate_id(),
            date,
            opening_meter: None,
            closing_meter: None,
            unit_price: Some(self.config.default_unit_price),
            litres_sold: 0.0,
            total_sales: 0.0,
            operator_name: operator_name.trim().to_string(),
            notes: None,
            status: RecordStatus::Draft,
        }
    }

    /// Apply one raw form value to a draft and recompute its totals.
    ///
    /// Meter and price inputs that are not numbers are kept as "not entered".
    /// Only an unparsable date or an attempt to edit a submitted record fails.
    pub fn update_draft_field(
        &self,
        draft: &DailyRecord,
        field: DailyRecordField,
        raw_value: &str,
    ) -> StationResult<DailyRecord> {
        if draft.is_submitted() {
            return Err(StationError::validation("Submitted records cannot be edited"));
        }

        let mut updated = draft.clone();
        match field {
            DailyRecordField::Date => {
                updated.date = NaiveDate::parse_from_str(raw_value.trim(), "%Y-%m-%d")
                    .map_err(|_| StationError::validation(format!("Invalid date '{}', expected YYYY-MM-DD", raw_value.trim())))?;
            }
            DailyRecordField::OpeningMeter => updated.opening_meter = money::parse_preview(raw_value),
            DailyRecordField::ClosingMeter => updated.closing_meter = money::parse_preview(raw_value),
            DailyRecordField::UnitPrice => updated.unit_price = money::parse_preview(raw_value),
            DailyRecordField::OperatorName => updated.operator_name = raw_value.trim().to_string(),
            DailyRecordField::Notes => {
                let notes = raw_value.trim();
                updated.notes = if notes.is_empty() { None } else { Some(notes.to_string()) };
            }
        }

        let updated = with_derived_totals(&updated);
        debug!(
            "Draft {} preview: litres_sold={} total_sales={:.2}",
            updated.id, updated.litres_sold, updated.total_sales
        );
        Ok(updated)
    }

    /// Store a draft, replacing an earlier version of the same draft
    pub fn save_draft(&mut self, draft: DailyRecord) -> StationResult<DailyRecord> {
        if draft.is_submitted() {
            return Err(StationError::validation("Only draft records can be saved as drafts"));
        }
        self.ensure_not_submitted(&draft.id)?;

        let draft = with_derived_totals(&draft);
        self.upsert(draft.clone());
        info!("Saved draft daily record {} for {}", draft.id, draft.date);
        Ok(draft)
    }

    /// Finalize a draft.
    ///
    /// Fails with `ValidationFailed` when an input is missing or invalid and
    /// with `InvalidMeterOrder` when the closing meter is below the opening
    /// meter. Nothing is stored on failure.
    pub fn submit_daily_record(&mut self, draft: DailyRecord) -> StationResult<DailyRecord> {
        if let Err(e) = self.validate_for_submit(&draft) {
            warn!("Rejected submission of daily record {}: {}", draft.id, e);
            return Err(e);
        }

        let mut record = with_derived_totals(&draft);
        record.status = RecordStatus::Submitted;
        self.upsert(record.clone());

        info!(
            "Submitted daily record {} for {}: {} L, {}",
            record.id,
            record.date,
            record.litres_sold,
            money::format_currency(&self.config.currency_symbol, record.total_sales)
        );
        Ok(record)
    }

    /// All records, newest date first
    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn get_record(&self, id: &str) -> Option<&DailyRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn submitted_records(&self) -> Vec<DailyRecord> {
        self.records.iter().filter(|r| r.is_submitted()).cloned().collect()
    }

    fn validate_for_submit(&self, draft: &DailyRecord) -> StationResult<()> {
        if draft.is_submitted() {
            return Err(StationError::validation("Record has already been submitted"));
        }
        self.ensure_not_submitted(&draft.id)?;

        if draft.operator_name.trim().is_empty() {
            return Err(StationError::validation("Operator name is required"));
        }
        let opening = draft
            .opening_meter
            .ok_or_else(|| StationError::validation("Opening meter reading is required"))?;
        let closing = draft
            .closing_meter
            .ok_or_else(|| StationError::validation("Closing meter reading is required"))?;
        let opening = money::check_range("Opening meter", opening)?;
        let closing = money::check_range("Closing meter", closing)?;
        if opening < 0.0 || closing < 0.0 {
            return Err(StationError::validation("Meter readings cannot be negative"));
        }
        if opening.fract() != 0.0 || closing.fract() != 0.0 {
            return Err(StationError::validation("Meter readings must be whole numbers"));
        }
        money::require_positive("Unit price", draft.unit_price)?;

        if closing < opening {
            return Err(StationError::InvalidMeterOrder { opening, closing });
        }
        Ok(())
    }

    fn ensure_not_submitted(&self, id: &str) -> StationResult<()> {
        match self.get_record(id) {
            Some(existing) if existing.is_submitted() => {
                Err(StationError::validation("Submitted records cannot be changed"))
            }
            _ => Ok(()),
        }
    }

    fn upsert(&mut self, record: DailyRecord) {
        match self.records.iter().position(|r| r.id == record.id) {
            Some(index) => self.records[index] = record,
            None => self.records.push(record),
        }
        self.sort_records();
    }

    fn sort_records(&mut self) {
        self.records.sort_by(|a, b| b.date.cmp(&a.date));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ErrorKind;

    fn create_test_service() -> DailyOperationsService {
        DailyOperationsService::new(StationConfig::default())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn filled_draft(service: &DailyOperationsService, opening: &str, closing: &str) -> DailyRecord {
        let draft = service.new_draft_on(date(2025, 10, 20), "John Doe");
        let draft = service
            .update_draft_field(&draft, DailyRecordField::OpeningMeter, opening)
            .unwrap();
        service
            .update_draft_field(&draft, DailyRecordField::ClosingMeter, closing)
            .unwrap()
    }

    #[test]
    fn test_compute_daily_totals_example() {
        let totals = compute_daily_totals("15420", "18650", "1.45");
        assert_eq!(totals.litres_sold, 3230.0);
        assert_eq!(totals.total_sales, 4683.5);
        assert!(totals.meter_order_valid);
    }

    #[test]
    fn test_compute_daily_totals_missing_meter_is_zero() {
        let totals = compute_daily_totals("", "18650", "1.45");
        assert_eq!(totals.litres_sold, 0.0);
        assert_eq!(totals.total_sales, 0.0);

        let totals = compute_daily_totals("15420", "18,6x0", "1.45");
        assert_eq!(totals.litres_sold, 0.0);
    }

    #[test]
    fn test_compute_daily_totals_bad_price_counts_as_zero() {
        let totals = compute_daily_totals("100", "200", "abc");
        assert_eq!(totals.litres_sold, 100.0);
        assert_eq!(totals.total_sales, 0.0);
    }

    #[test]
    fn test_compute_daily_totals_negative_preview() {
        let totals = compute_daily_totals("18650", "15420", "1.45");
        assert_eq!(totals.litres_sold, -3230.0);
        assert_eq!(totals.total_sales, -4683.5);
        assert!(!totals.meter_order_valid);
    }

    #[test]
    fn test_compute_daily_totals_huge_input_counts_as_missing() {
        let totals = compute_daily_totals("0", "100000000000000000000", "10000000000");
        assert_eq!(totals.litres_sold, 0.0);
        assert_eq!(totals.total_sales, 0.0);

        let totals = compute_daily_totals("0", "1e30", "1");
        assert_eq!(totals.litres_sold, 0.0);
        assert_eq!(totals.total_sales, 0.0);

        let totals = compute_daily_totals("0", "1000000", "1e30");
        assert_eq!(totals.litres_sold, 1000000.0);
        assert_eq!(totals.total_sales, 0.0);
    }

    #[test]
    fn test_calculate_totals_rounds_to_cents() {
        let totals = calculate_totals(0.0, 1.0, 0.125);
        assert_eq!(totals.total_sales, 0.13);
        let totals = calculate_totals(100.0, 100.0, 1.45);
        assert_eq!(totals.litres_sold, 0.0);
        assert_eq!(totals.total_sales, 0.0);
        assert!(totals.meter_order_valid);
    }

    #[test]
    fn test_new_draft_defaults() {
        let service = create_test_service();
        let draft = service.new_draft_on(date(2025, 10, 20), "  John Doe ");
        assert_eq!(draft.status, RecordStatus::Draft);
        assert_eq!(draft.unit_price, Some(1.45));
        assert_eq!(draft.operator_name, "John Doe");
        assert_eq!(draft.opening_meter, None);
        assert_eq!(draft.litres_sold, 0.0);
        assert!(draft.id.starts_with("daily::"));

        let today = service.new_draft("John Doe");
        assert_eq!(today.date, Local::now().date_naive());
    }

    #[test]
    fn test_update_draft_field_recomputes() {
        let service = create_test_service();
        let draft = filled_draft(&service, "15420", "18650");
        assert_eq!(draft.litres_sold, 3230.0);
        assert_eq!(draft.total_sales, 4683.5);

        let draft = service
            .update_draft_field(&draft, DailyRecordField::UnitPrice, "1.50")
            .unwrap();
        assert_eq!(draft.total_sales, 4845.0);

        let draft = service
            .update_draft_field(&draft, DailyRecordField::OpeningMeter, "")
            .unwrap();
        assert_eq!(draft.opening_meter, None);
        assert_eq!(draft.litres_sold, 0.0);
    }

    #[test]
    fn test_update_draft_field_text_fields() {
        let service = create_test_service();
        let draft = service.new_draft_on(date(2025, 10, 20), "John Doe");

        let draft = service
            .update_draft_field(&draft, DailyRecordField::Notes, " Normal operations ")
            .unwrap();
        assert_eq!(draft.notes.as_deref(), Some("Normal operations"));
        let draft = service.update_draft_field(&draft, DailyRecordField::Notes, "   ").unwrap();
        assert_eq!(draft.notes, None);

        let draft = service
            .update_draft_field(&draft, DailyRecordField::Date, "2025-10-19")
            .unwrap();
        assert_eq!(draft.date, date(2025, 10, 19));

        let error = service
            .update_draft_field(&draft, DailyRecordField::Date, "19/10/2025")
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ValidationFailed);
    }

    #[test]
    fn test_submit_daily_record_success() {
        let mut service = create_test_service();
        let draft = filled_draft(&service, "15420", "18650");

        let record = service.submit_daily_record(draft.clone()).unwrap();

        assert_eq!(record.status, RecordStatus::Submitted);
        assert_eq!(record.litres_sold, 3230.0);
        assert_eq!(record.total_sales, 4683.5);
        assert_eq!(service.records().len(), 1);
        assert!(service.get_record(&draft.id).unwrap().is_submitted());
    }

    #[test]
    fn test_submit_invalid_meter_order() {
        let mut service = create_test_service();
        let draft = filled_draft(&service, "18650", "15420");
        service.save_draft(draft.clone()).unwrap();

        let error = service.submit_daily_record(draft.clone()).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::InvalidMeterOrder);
        assert!(service.submitted_records().is_empty());
        assert_eq!(service.get_record(&draft.id).unwrap().status, RecordStatus::Draft);
    }

    #[test]
    fn test_submit_missing_fields() {
        let mut service = create_test_service();
        let draft = service.new_draft_on(date(2025, 10, 20), "John Doe");
        let error = service.submit_daily_record(draft.clone()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ValidationFailed);

        let filled = filled_draft(&service, "100", "200");
        let no_price = service
            .update_draft_field(&filled, DailyRecordField::UnitPrice, "")
            .unwrap();
        let error = service.submit_daily_record(no_price).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ValidationFailed);

        let no_operator = service
            .update_draft_field(&filled, DailyRecordField::OperatorName, " ")
            .unwrap();
        let error = service.submit_daily_record(no_operator).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ValidationFailed);

        let negative = filled_draft(&service, "-5", "200");
        let error = service.submit_daily_record(negative).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ValidationFailed);

        assert!(service.records().is_empty());
    }

    #[test]
    fn test_submit_rejects_out_of_range_and_fractional_meters() {
        let mut service = create_test_service();

        let mut huge = filled_draft(&service, "0", "100");
        huge.closing_meter = Some(1e30);
        let error = service.submit_daily_record(huge).unwrap_err();
        assert_eq!(error.user_message(), "Closing meter is too large");

        let mut huge_price = filled_draft(&service, "0", "100");
        huge_price.unit_price = Some(1e20);
        let error = service.submit_daily_record(huge_price).unwrap_err();
        assert_eq!(error.user_message(), "Unit price is too large");

        let fractional = filled_draft(&service, "100.5", "200");
        let error = service.submit_daily_record(fractional).unwrap_err();
        assert_eq!(error.user_message(), "Meter readings must be whole numbers");

        assert!(service.records().is_empty());
    }

    #[test]
    fn test_submitted_records_are_immutable() {
        let mut service = create_test_service();
        let draft = filled_draft(&service, "15420", "18650");
        let submitted = service.submit_daily_record(draft.clone()).unwrap();

        assert!(service.update_draft_field(&submitted, DailyRecordField::Notes, "x").is_err());
        assert!(service.submit_daily_record(draft.clone()).is_err());
        assert!(service.save_draft(draft.clone()).is_err());
        assert!(service.save_draft(submitted).is_err());

        let stored = service.get_record(&draft.id).unwrap();
        assert!(stored.is_submitted());
        assert_eq!(stored.total_sales, 4683.5);
    }

    #[test]
    fn test_save_draft_replaces_previous_version() {
        let mut service = create_test_service();
        let draft = filled_draft(&service, "100", "200");
        service.save_draft(draft.clone()).unwrap();

        let updated = service
            .update_draft_field(&draft, DailyRecordField::ClosingMeter, "300")
            .unwrap();
        service.save_draft(updated).unwrap();

        assert_eq!(service.records().len(), 1);
        assert_eq!(service.get_record(&draft.id).unwrap().litres_sold, 200.0);
    }

    #[test]
    fn test_records_newest_first() {
        let mut service = create_test_service();
        let older = service.new_draft_on(date(2025, 10, 18), "John Doe");
        let newer = service.new_draft_on(date(2025, 10, 20), "John Doe");
        let middle = service.new_draft_on(date(2025, 10, 19), "John Doe");
        service.save_draft(older).unwrap();
        service.save_draft(newer).unwrap();
        service.save_draft(middle).unwrap();

        let dates: Vec<NaiveDate> = service.records().iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(2025, 10, 20), date(2025, 10, 19), date(2025, 10, 18)]);
    }

    #[test]
    fn test_with_records_recomputes_derived_fields() {
        let mut record = create_test_service().new_draft_on(date(2025, 10, 20), "John Doe");
        record.opening_meter = Some(15420.0);
        record.closing_meter = Some(18650.0);
        record.litres_sold = 1.0;
        record.total_sales = 1.0;

        let service = DailyOperationsService::with_records(StationConfig::default(), vec![record]);

        assert_eq!(service.records()[0].litres_sold, 3230.0);
        assert_eq!(service.records()[0].total_sales, 4683.5);
    }
}

//! Append-only ledger of product price changes.
//!
//! Entries are kept newest first. For every product, each entry's `old_price`
//! is the `new_price` of that product's previous entry, so the current price is
//! always the head of the product's history. Differences and percentages are
//! derived when read, never stored.

use chrono::{Local, NaiveDate};
use log::{info, warn};
use shared::{PriceChange, PriceDelta, PriceDirection};

use crate::domain::commands::prices::RecordPriceChangeCommand;
use crate::domain::errors::{StationError, StationResult};
use crate::domain::money;

/// Change between an entry's old and new price
pub fn price_delta(change: &PriceChange) -> PriceDelta {
    let raw = money::difference(change.old_price, change.new_price);
    let difference = money::round_currency(raw);
    let direction = if difference > 0.0 {
        PriceDirection::Increase
    } else if difference < 0.0 {
        PriceDirection::Decrease
    } else {
        PriceDirection::Unchanged
    };
    PriceDelta {
        difference,
        percent_change: money::percentage(raw, change.old_price).map(money::round_percent),
        direction,
    }
}

fn same_price(a: f64, b: f64) -> bool {
    match (money::to_decimal(a), money::to_decimal(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

#[derive(Debug, Clone)]
pub struct PriceService {
    default_price: f64,
    entries: Vec<PriceChange>,
}

impl PriceService {
    pub fn new(default_price: f64) -> Self {
        Self {
            default_price,
            entries: Vec::new(),
        }
    }

    /// Load an existing ledger (newest first), rejecting one that is out of
    /// order or where a product's prices do not chain.
    pub fn from_history(entries: Vec<PriceChange>, default_price: f64) -> StationResult<Self> {
        for pair in entries.windows(2) {
            if pair[0].date < pair[1].date {
                return Err(StationError::validation(format!(
                    "Price history is not newest first: {} is listed before {}",
                    pair[0].date, pair[1].date
                )));
            }
        }

        for (index, entry) in entries.iter().enumerate() {
            if money::require_positive("New price", Some(entry.new_price)).is_err() {
                return Err(StationError::validation(format!(
                    "Price change {} has an invalid new price {}",
                    entry.id, entry.new_price
                )));
            }
            let previous = entries[index + 1..].iter().find(|e| e.product == entry.product);
            if let Some(previous) = previous {
                if !same_price(entry.old_price, previous.new_price) {
                    return Err(StationError::validation(format!(
                        "Price history for {} is broken: {} starts at {} but the prior price was {}",
                        entry.product, entry.id, entry.old_price, previous.new_price
                    )));
                }
            }
        }

        info!("Loaded {} price changes", entries.len());
        Ok(Self {
            default_price,
            entries,
        })
    }

    /// Price used for products that have no history yet
    pub fn set_default_price(&mut self, default_price: f64) {
        self.default_price = default_price;
    }

    /// All entries, newest first
    pub fn entries(&self) -> &[PriceChange] {
        &self.entries
    }

    /// Most recent entry across all products
    pub fn head(&self) -> Option<&PriceChange> {
        self.entries.first()
    }

    pub fn history_for(&self, product: &str) -> Vec<&PriceChange> {
        self.entries.iter().filter(|e| e.product == product).collect()
    }

    /// Current price of a product, or the configured default when it has no history
    pub fn current_price(&self, product: &str) -> f64 {
        self.entries
            .iter()
            .find(|e| e.product == product)
            .map(|e| e.new_price)
            .unwrap_or(self.default_price)
    }

    /// Products with history, most recently changed first
    pub fn products(&self) -> Vec<String> {
        let mut products: Vec<String> = Vec::new();
        for entry in &self.entries {
            if !products.contains(&entry.product) {
                products.push(entry.product.clone());
            }
        }
        products
    }

    pub fn record_price_change(&mut self, cmd: RecordPriceChangeCommand) -> StationResult<PriceChange> {
        self.record_price_change_on(cmd, Local::now().date_naive())
    }

    /// Record a new price effective on `date`; the prior price becomes `old_price`
    pub fn record_price_change_on(&mut self, cmd: RecordPriceChangeCommand, date: NaiveDate) -> StationResult<PriceChange> {
        let product = cmd.product.trim();
        if product.is_empty() {
            warn!("Rejected price change: no product");
            return Err(StationError::validation("Product is required"));
        }

        let new_price = money::require_positive("New price", cmd.new_price).inspect_err(|e| {
            warn!("Rejected price change for {}: {}", product, e);
        })?;

        let reason = cmd.reason.trim();
        if reason.is_empty() {
            warn!("Rejected price change for {}: no reason", product);
            return Err(StationError::validation("Reason for change is required"));
        }

        if let Some(head) = self.head() {
            if date < head.date {
                warn!(
                    "Rejected backdated price change for {} on {} (latest entry {})",
                    product, date, head.date
                );
                return Err(StationError::validation(format!(
                    "Price changes cannot be dated before the latest entry ({})",
                    head.date
                )));
            }
        }

        let change = PriceChange {
            id: PriceChange::generate_id(),
            date,
            product: product.to_string(),
            old_price: self.current_price(product),
            new_price,
            changed_by: cmd.changed_by.trim().to_string(),
            reason: reason.to_string(),
        };
        self.entries.insert(0, change.clone());

        info!(
            "Price of {} changed from {} to {} by {}: {}",
            change.product, change.old_price, change.new_price, change.changed_by, change.reason
        );
        Ok(change)
    }
}

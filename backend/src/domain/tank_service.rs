//! Tank monitoring domain logic.
//!
//! Tanks are long-lived and pre-provisioned. Readings are changed through an
//! edit mode that holds a working copy of exactly one tank; committing the edit
//! validates the working copy and stores it, starting an edit on another tank
//! throws the pending one away.

use log::{debug, info, warn};
use shared::{StationConfig, Tank, TankField, TankStatus, TankSummary};

use crate::domain::errors::{StationError, StationResult};
use crate::domain::money;

/// closing_reading + refill_volume
pub fn current_level(closing_reading: f64, refill_volume: f64) -> f64 {
    money::add(closing_reading, refill_volume)
}

/// Volume drawn during the period (opening - closing). Negative when a refill
/// outweighed consumption; this is a period delta, not a rate.
pub fn volume_used(tank: &Tank) -> f64 {
    money::difference(tank.closing_reading, tank.opening_reading)
}

/// Fill level in percent, clamped to [0, 100]
pub fn fill_percentage(tank: &Tank) -> f64 {
    if tank.capacity <= 0.0 {
        return 0.0;
    }
    money::percentage(tank.current_level, tank.capacity)
        .unwrap_or(0.0)
        .clamp(0.0, 100.0)
}

/// Band a fill percentage; each threshold belongs to the band above it
pub fn classify(fill_percentage: f64, good_threshold: f64, moderate_threshold: f64) -> TankStatus {
    if fill_percentage >= good_threshold {
        TankStatus::Good
    } else if fill_percentage >= moderate_threshold {
        TankStatus::Moderate
    } else {
        TankStatus::Low
    }
}

/// The single derived view used by both the overview cards and the editor
pub fn summarize(tank: &Tank, config: &StationConfig) -> TankSummary {
    let fill = fill_percentage(tank);
    TankSummary {
        id: tank.id.clone(),
        name: tank.name.clone(),
        capacity: tank.capacity,
        current_level: tank.current_level,
        volume_used: volume_used(tank),
        fill_percentage: fill,
        status: classify(fill, config.good_fill_threshold, config.moderate_fill_threshold),
    }
}

fn check_non_negative(field: TankField, value: f64) -> StationResult<()> {
    money::check_range(&field.name().replace('_', " "), value)?;
    if value < 0.0 {
        return Err(StationError::NegativeVolume {
            field: field.name(),
            value,
        });
    }
    Ok(())
}

/// Commit-time checks for a tank
pub fn validate_tank(tank: &Tank) -> StationResult<()> {
    let capacity = money::check_range("capacity", tank.capacity)?;
    if capacity <= 0.0 {
        return Err(StationError::validation(format!(
            "{} must have a capacity greater than 0",
            tank.name
        )));
    }
    check_non_negative(TankField::OpeningReading, tank.opening_reading)?;
    check_non_negative(TankField::ClosingReading, tank.closing_reading)?;
    check_non_negative(TankField::RefillVolume, tank.refill_volume)?;

    let level = current_level(tank.closing_reading, tank.refill_volume);
    if level > tank.capacity {
        return Err(StationError::CapacityExceeded {
            level,
            capacity: tank.capacity,
        });
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct TankEdit {
    tank_id: String,
    working: Tank,
}

/// Owner of the station's tanks and of the single open edit
#[derive(Debug, Clone)]
pub struct TankService {
    config: StationConfig,
    tanks: Vec<Tank>,
    edit: Option<TankEdit>,
}

impl TankService {
    pub fn new(config: StationConfig) -> Self {
        Self {
            config,
            tanks: Vec::new(),
            edit: None,
        }
    }

    /// Load provisioned tanks; each must pass the same checks as a commit
    pub fn with_tanks(config: StationConfig, tanks: Vec<Tank>) -> StationResult<Self> {
        let mut service = Self::new(config);
        for mut tank in tanks {
            if let Err(e) = validate_tank(&tank) {
                warn!("Rejected provisioned tank {}: {}", tank.id, e);
                return Err(e);
            }
            tank.current_level = current_level(tank.closing_reading, tank.refill_volume);
            service.tanks.push(tank);
        }
        Ok(service)
    }

    pub fn tanks(&self) -> &[Tank] {
        &self.tanks
    }

    pub fn get_tank(&self, tank_id: &str) -> Option<&Tank> {
        self.tanks.iter().find(|t| t.id == tank_id)
    }

    pub fn summaries(&self) -> Vec<TankSummary> {
        self.tanks.iter().map(|t| summarize(t, &self.config)).collect()
    }

    pub fn summary(&self, tank_id: &str) -> StationResult<TankSummary> {
        self.get_tank(tank_id)
            .map(|t| summarize(t, &self.config))
            .ok_or_else(|| StationError::not_found("Tank", tank_id))
    }

    pub fn editing_tank_id(&self) -> Option<&str> {
        self.edit.as_ref().map(|e| e.tank_id.as_str())
    }

    /// The in-progress copy of the tank being edited
    pub fn working_copy(&self) -> Option<&Tank> {
        self.edit.as_ref().map(|e| &e.working)
    }

    /// Enter edit mode for a tank, discarding any other tank's pending edits
    pub fn begin_edit(&mut self, tank_id: &str) -> StationResult<&Tank> {
        let tank = self
            .get_tank(tank_id)
            .cloned()
            .ok_or_else(|| StationError::not_found("Tank", tank_id))?;

        let keep_current = match self.edit.as_ref() {
            Some(previous) if previous.tank_id == tank_id => true,
            Some(previous) => {
                info!("Discarding uncommitted edits to tank {}", previous.tank_id);
                false
            }
            None => false,
        };

        if !keep_current {
            self.edit = Some(TankEdit {
                tank_id: tank_id.to_string(),
                working: tank,
            });
        }
        self.edit
            .as_ref()
            .map(|e| &e.working)
            .ok_or_else(|| StationError::not_found("Tank", tank_id))
    }

    /// Change one raw reading on the working copy.
    ///
    /// Closing reading and refill volume edits recompute the current level;
    /// opening reading edits only move the period's volume used.
    pub fn update_tank_reading(&mut self, tank_id: &str, field: TankField, value: f64) -> StationResult<Tank> {
        check_non_negative(field, value)?;
        self.begin_edit(tank_id)?;

        let edit = self
            .edit
            .as_mut()
            .ok_or_else(|| StationError::not_found("Tank", tank_id))?;
        let working = &mut edit.working;
        match field {
            TankField::OpeningReading => working.opening_reading = value,
            TankField::ClosingReading => working.closing_reading = value,
            TankField::RefillVolume => working.refill_volume = value,
        }
        if matches!(field, TankField::ClosingReading | TankField::RefillVolume) {
            working.current_level = current_level(working.closing_reading, working.refill_volume);
        }

        debug!(
            "Tank {} {} set to {}; current level {}",
            tank_id,
            field.name(),
            value,
            working.current_level
        );
        Ok(working.clone())
    }

    /// Validate and store the working copy, leaving edit mode.
    ///
    /// On failure the stored tank is untouched and the edit stays open so the
    /// reading can be corrected. Committing a tank that is not being edited is
    /// a no-op returning the stored tank.
    pub fn commit_tank_edit(&mut self, tank_id: &str) -> StationResult<Tank> {
        let index = self
            .tanks
            .iter()
            .position(|t| t.id == tank_id)
            .ok_or_else(|| StationError::not_found("Tank", tank_id))?;

        let working = match self.edit.as_ref() {
            Some(edit) if edit.tank_id == tank_id => edit.working.clone(),
            _ => return Ok(self.tanks[index].clone()),
        };

        if let Err(e) = validate_tank(&working) {
            warn!("Rejected tank {} readings: {}", tank_id, e);
            return Err(e);
        }

        let mut committed = working;
        committed.current_level = current_level(committed.closing_reading, committed.refill_volume);
        self.tanks[index] = committed.clone();
        self.edit = None;

        info!(
            "Committed tank {} readings: level {} of {} ({:.1}%)",
            committed.name,
            money::format_volume(committed.current_level),
            money::format_volume(committed.capacity),
            fill_percentage(&committed)
        );
        Ok(committed)
    }

    /// Leave edit mode without saving; returns the tank whose edits were dropped
    pub fn cancel_edit(&mut self) -> Option<String> {
        self.edit.take().map(|e| e.tank_id)
    }
}

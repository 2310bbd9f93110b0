//! User, station and settings administration.

use log::{info, warn};
use shared::{Station, StationSettings, User};

use crate::domain::commands::admin::{AddStationCommand, AddUserCommand};
use crate::domain::errors::{StationError, StationResult};
use crate::domain::money;

fn required<'a>(field: &str, value: &'a str) -> StationResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StationError::validation(format!("{} is required", field)));
    }
    Ok(trimmed)
}

fn validate_email(email: &str) -> StationResult<String> {
    let email = required("Email", email)?.to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if !valid || email.contains(char::is_whitespace) {
        return Err(StationError::validation(format!("'{}' is not a valid email address", email)));
    }
    Ok(email)
}

#[derive(Debug, Clone, Default)]
pub struct AdminService {
    users: Vec<User>,
    stations: Vec<Station>,
    settings: StationSettings,
}

impl AdminService {
    pub fn new(users: Vec<User>, stations: Vec<Station>, settings: StationSettings) -> Self {
        Self {
            users,
            stations,
            settings,
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn settings(&self) -> &StationSettings {
        &self.settings
    }

    pub fn add_user(&mut self, cmd: AddUserCommand) -> StationResult<User> {
        let name = required("Name", &cmd.name)?;
        let email = validate_email(&cmd.email)?;
        let station = required("Station", &cmd.station)?;

        if self.users.iter().any(|u| u.email.eq_ignore_ascii_case(&email)) {
            warn!("Rejected user {}: email {} already registered", name, email);
            return Err(StationError::validation(format!("A user with email {} already exists", email)));
        }

        let user = User {
            id: User::generate_id(),
            name: name.to_string(),
            email,
            role: cmd.role,
            station: station.to_string(),
            active: true,
        };
        self.users.push(user.clone());
        info!("Added {} {} ({})", user.role.label(), user.name, user.email);
        Ok(user)
    }

    pub fn toggle_user_active(&mut self, user_id: &str) -> StationResult<User> {
        let user = self
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| StationError::not_found("User", user_id))?;
        user.active = !user.active;
        info!("User {} is now {}", user.name, if user.active { "active" } else { "inactive" });
        Ok(user.clone())
    }

    pub fn remove_user(&mut self, user_id: &str) -> StationResult<User> {
        let index = self
            .users
            .iter()
            .position(|u| u.id == user_id)
            .ok_or_else(|| StationError::not_found("User", user_id))?;
        let removed = self.users.remove(index);
        info!("Removed user {}", removed.name);
        Ok(removed)
    }

    pub fn add_station(&mut self, cmd: AddStationCommand) -> StationResult<Station> {
        let name = required("Station name", &cmd.name)?;
        let location = required("Location", &cmd.location)?;
        let manager = required("Manager", &cmd.manager)?;

        if self.stations.iter().any(|s| s.name.eq_ignore_ascii_case(name)) {
            warn!("Rejected station {}: name already in use", name);
            return Err(StationError::validation(format!("A station named {} already exists", name)));
        }

        let station = Station {
            id: Station::generate_id(),
            name: name.to_string(),
            location: location.to_string(),
            manager: manager.to_string(),
            active: true,
        };
        self.stations.push(station.clone());
        info!("Added station {} at {}", station.name, station.location);
        Ok(station)
    }

    pub fn toggle_station_active(&mut self, station_id: &str) -> StationResult<Station> {
        let station = self
            .stations
            .iter_mut()
            .find(|s| s.id == station_id)
            .ok_or_else(|| StationError::not_found("Station", station_id))?;
        station.active = !station.active;
        info!(
            "Station {} is now {}",
            station.name,
            if station.active { "active" } else { "inactive" }
        );
        Ok(station.clone())
    }

    /// Store settings; `Backend::save_settings` also applies the default price
    pub fn save_settings(&mut self, settings: StationSettings) -> StationResult<StationSettings> {
        money::require_positive("Default price", Some(settings.default_price)).inspect_err(|e| {
            warn!("Rejected settings: {}", e);
        })?;
        self.settings = settings;
        info!("Saved station settings: {:?}", self.settings);
        Ok(self.settings.clone())
    }
}

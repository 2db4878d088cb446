//! Ordered set of tracked cities plus the headline ("active") selection.
//!
//! The active selection is an id looked up on demand, never a stored
//! reference, so removing a city can only ever leave it unresolved.

use crate::city::{default_cities, City};

/// Id of the device-local pseudo-city. It is never stored in the sequence.
pub const LOCAL_CITY_ID: &str = "@local";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivationResult {
    Added,
    AlreadyPresent,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActiveRef {
    Local,
    City(String),
}

#[derive(Clone, Debug, Default)]
pub struct CityBoard {
    cities: Vec<City>,
    local: Option<City>,
    active: Option<ActiveRef>,
}

impl CityBoard {
    /// Board seeded with the default zones, nothing active.
    pub fn with_defaults() -> Self {
        Self::from_cities(default_cities())
    }

    /// Seed from a list; later duplicates of an id are dropped.
    pub fn from_cities(cities: impl IntoIterator<Item = City>) -> Self {
        let mut board = Self::default();
        for city in cities {
            if board.position(&city.id).is_none() {
                board.cities.push(city);
            }
        }
        board
    }

    pub fn list(&self) -> &[City] {
        &self.cities
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&City> {
        self.cities.iter().find(|c| c.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.cities.iter().position(|c| c.id == id)
    }

    /// Append and activate, or activate the existing entry with the same id.
    pub fn add_or_activate(&mut self, city: City) -> ActivationResult {
        if self.position(&city.id).is_some() {
            self.active = Some(ActiveRef::City(city.id));
            return ActivationResult::AlreadyPresent;
        }
        self.active = Some(ActiveRef::City(city.id.clone()));
        self.cities.push(city);
        ActivationResult::Added
    }

    /// Drop a city. Removing the active city clears the selection.
    pub fn remove(&mut self, id: &str) -> Option<City> {
        let index = self.position(id)?;
        if self.active == Some(ActiveRef::City(id.to_string())) {
            self.active = None;
        }
        Some(self.cities.remove(index))
    }

    /// Select a board city, or the local pseudo-city via [`LOCAL_CITY_ID`].
    /// Unknown ids leave the selection untouched and return false.
    pub fn set_active(&mut self, id: &str) -> bool {
        if id == LOCAL_CITY_ID {
            if self.local.is_none() {
                return false;
            }
            self.active = Some(ActiveRef::Local);
            return true;
        }
        if self.position(id).is_none() {
            return false;
        }
        self.active = Some(ActiveRef::City(id.to_string()));
        true
    }

    pub fn active_ref(&self) -> Option<&ActiveRef> {
        self.active.as_ref()
    }

    /// Resolve the selection. `None` means "show the device-local city".
    pub fn active(&self) -> Option<&City> {
        match self.active.as_ref()? {
            ActiveRef::Local => self.local.as_ref(),
            ActiveRef::City(id) => self.get(id),
        }
    }

    pub fn active_index(&self) -> Option<usize> {
        match self.active.as_ref()? {
            ActiveRef::City(id) => self.position(id),
            ActiveRef::Local => None,
        }
    }

    /// Install or replace the device-local pseudo-city.
    pub fn set_local(&mut self, mut city: City) {
        city.id = LOCAL_CITY_ID.to_string();
        self.local = Some(city);
    }

    pub fn local(&self) -> Option<&City> {
        self.local.as_ref()
    }

    /// Back to the default seed. The local city survives, the selection
    /// survives only if it still resolves.
    pub fn reset(&mut self) {
        self.cities = default_cities();
        let stale = matches!(&self.active, Some(ActiveRef::City(id)) if self.position(id).is_none());
        if stale {
            self.active = None;
        }
    }

    /// Zone ids for the time request, in display order.
    pub fn timezones(&self) -> Vec<String> {
        self.cities.iter().map(|c| c.timezone_id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(id: &str) -> City {
        City {
            id: id.to_string(),
            label: id.to_string(),
            timezone_id: "UTC".to_string(),
            latitude: None,
            longitude: None,
            sunrise: None,
            sunset: None,
        }
    }

    #[test]
    fn add_appends_and_activates() {
        let mut board = CityBoard::default();
        assert_eq!(board.add_or_activate(city("A")), ActivationResult::Added);
        assert_eq!(board.add_or_activate(city("B")), ActivationResult::Added);
        assert_eq!(board.list().iter().map(|c| c.id.as_str()).collect::<Vec<_>>(), ["A", "B"]);
        assert_eq!(board.active().map(|c| c.id.as_str()), Some("B"));
    }

    #[test]
    fn duplicate_add_only_activates() {
        let mut board = CityBoard::from_cities([city("A"), city("B")]);
        assert_eq!(board.add_or_activate(city("A")), ActivationResult::AlreadyPresent);
        assert_eq!(board.len(), 2);
        assert_eq!(board.active_ref(), Some(&ActiveRef::City("A".to_string())));
        assert_eq!(board.add_or_activate(city("A")), ActivationResult::AlreadyPresent);
        assert_eq!(board.len(), 2);
        assert_eq!(board.active().map(|c| c.id.as_str()), Some("A"));
    }

    #[test]
    fn removing_active_city_clears_selection() {
        let mut board = CityBoard::default();
        board.add_or_activate(city("A"));
        board.cities.push(city("B"));
        assert_eq!(board.active().map(|c| c.id.as_str()), Some("A"));

        let removed = board.remove("A");
        assert_eq!(removed.map(|c| c.id), Some("A".to_string()));
        assert_eq!(board.list().len(), 1);
        assert_eq!(board.list()[0].id, "B");
        assert!(board.active_ref().is_none());
        assert!(board.active().is_none());
    }

    #[test]
    fn removing_other_city_keeps_selection() {
        let mut board = CityBoard::from_cities([city("A"), city("B")]);
        board.set_active("B");
        board.remove("A");
        assert_eq!(board.active().map(|c| c.id.as_str()), Some("B"));
        assert!(board.remove("missing").is_none());
    }

    #[test]
    fn set_active_rejects_unknown_ids() {
        let mut board = CityBoard::from_cities([city("A")]);
        assert!(board.set_active("A"));
        assert!(!board.set_active("Z"));
        assert_eq!(board.active().map(|c| c.id.as_str()), Some("A"));
        // No local city known yet
        assert!(!board.set_active(LOCAL_CITY_ID));
    }

    #[test]
    fn local_pseudo_city_is_not_listed() {
        let mut board = CityBoard::with_defaults();
        let mut local = city("Lisbon");
        local.timezone_id = "Europe/Lisbon".to_string();
        board.set_local(local);
        assert!(board.set_active(LOCAL_CITY_ID));
        assert_eq!(board.active().map(|c| c.label.as_str()), Some("Lisbon"));
        assert_eq!(board.active_index(), None);
        assert!(board.list().iter().all(|c| c.id != LOCAL_CITY_ID));
    }

    #[test]
    fn reset_restores_seed() {
        let mut board = CityBoard::with_defaults();
        board.add_or_activate(city("Somewhere"));
        board.remove("UTC");
        board.reset();
        assert_eq!(board.len(), 14);
        assert!(board.active_ref().is_none());
        assert_eq!(board.timezones()[0], "UTC");
    }

    #[test]
    fn reset_keeps_selection_that_still_exists() {
        let mut board = CityBoard::with_defaults();
        board.set_active("Asia/Tokyo");
        board.reset();
        assert_eq!(board.active_index(), Some(12));
    }

    #[test]
    fn seed_drops_duplicate_ids() {
        let board = CityBoard::from_cities([city("A"), city("A"), city("B")]);
        assert_eq!(board.len(), 2);
    }
}

/// User preferences
///
/// Small persisted settings such as the dashboard layout or how far the user
/// got through onboarding. Stores are passed in explicitly, there is no global.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use crate::storage::StorageError;

/// Key-value store for preferences
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store, mostly for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

pub const DASHBOARD_LAYOUT_KEY: &str = "dashboard_layout";
pub const ONBOARDING_STEP_KEY: &str = "onboarding_step";
pub const SHOW_HEATMAP_KEY: &str = "show_heatmap";

/// How the habit list is laid out on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DashboardLayout {
    #[default]
    List,
    Grid,
}

impl fmt::Display for DashboardLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardLayout::List => f.write_str("list"),
            DashboardLayout::Grid => f.write_str("grid"),
        }
    }
}

impl FromStr for DashboardLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(DashboardLayout::List),
            "grid" => Ok(DashboardLayout::Grid),
            other => Err(format!("unknown dashboard layout '{}'", other)),
        }
    }
}

/// Typed view over a [`PreferenceStore`]
///
/// Missing or unreadable values fall back to their defaults.
pub struct Preferences<'a, S: PreferenceStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: PreferenceStore + ?Sized> Preferences<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn dashboard_layout(&self) -> Result<DashboardLayout, StorageError> {
        Ok(self.parsed(DASHBOARD_LAYOUT_KEY)?.unwrap_or_default())
    }

    pub fn set_dashboard_layout(&self, layout: DashboardLayout) -> Result<(), StorageError> {
        self.store.set(DASHBOARD_LAYOUT_KEY, &layout.to_string())
    }

    /// Index of the last onboarding screen the user finished
    pub fn onboarding_step(&self) -> Result<u32, StorageError> {
        Ok(self.parsed(ONBOARDING_STEP_KEY)?.unwrap_or(0))
    }

    pub fn set_onboarding_step(&self, step: u32) -> Result<(), StorageError> {
        self.store.set(ONBOARDING_STEP_KEY, &step.to_string())
    }

    pub fn show_heatmap(&self) -> Result<bool, StorageError> {
        Ok(self.parsed(SHOW_HEATMAP_KEY)?.unwrap_or(true))
    }

    pub fn set_show_heatmap(&self, show: bool) -> Result<(), StorageError> {
        self.store.set(SHOW_HEATMAP_KEY, &show.to_string())
    }

    fn parsed<T: FromStr>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };

        match raw.parse() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                tracing::warn!("Ignoring unreadable preference {}='{}'", key, raw);
                Ok(None)
            }
        }
    }
}

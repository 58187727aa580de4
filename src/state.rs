use std::collections::BTreeMap;

use serde::Serialize;

use crate::fields::FieldCatalog;
use crate::message::RemoteState;

// Read models handed to the presentation layer. Plain serializable data,
// recomputed on every RemoteState change, no lifecycle of their own.

/// Numeric sensor readings. Absent fields read as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Telemetry {
    pub water_level: f64,
    pub water_pressure: f64,
    pub pressure_after_filter: f64,
}

/// Operator command flags keyed by field name. Absent flags read as `false`.
pub type CommandState = BTreeMap<String, bool>;

/// Controller status flags keyed by field name. Absent flags read as `false`.
pub type StatusState = BTreeMap<String, bool>;

/// Pure mapping from the merged remote state to the read models. Only fields
/// the catalog names are projected; everything else on the wire is ignored.
#[derive(Debug, Clone)]
pub struct StateProjector {
    catalog: FieldCatalog,
}

impl StateProjector {
    pub fn new(catalog: FieldCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    pub fn telemetry(&self, remote: &RemoteState) -> Telemetry {
        Telemetry {
            water_level: remote.number(&self.catalog.water_level).unwrap_or(0.0),
            water_pressure: remote.number(&self.catalog.water_pressure).unwrap_or(0.0),
            pressure_after_filter: remote
                .number(&self.catalog.pressure_after_filter)
                .unwrap_or(0.0),
        }
    }

    /// Every catalog command key is present in the output.
    pub fn commands(&self, remote: &RemoteState) -> CommandState {
        self.catalog
            .commands
            .iter()
            .map(|name| (name.clone(), remote.flag(name).unwrap_or(false)))
            .collect()
    }

    /// Every catalog status key is present in the output.
    pub fn statuses(&self, remote: &RemoteState) -> StatusState {
        self.catalog
            .statuses
            .iter()
            .map(|name| (name.clone(), remote.flag(name).unwrap_or(false)))
            .collect()
    }
}

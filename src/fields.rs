use serde::Deserialize;

// Field names spoken by the water-supply controller gateway. The sets are
// configuration rather than ambient constants: the projector and the CLI only
// ever iterate what the catalog names, and a site with different tag names
// overrides them in the config file.

/// Names of the fields this deployment tracks.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct FieldCatalog {
    /// Barrel water level, percent.
    pub water_level: String,
    /// Line pressure before the filters, bar.
    pub water_pressure: String,
    /// Line pressure after the filters, bar.
    pub pressure_after_filter: String,
    /// Boolean command flags an operator may toggle.
    pub commands: Vec<String>,
    /// Boolean status flags reported by the controller.
    pub statuses: Vec<String>,
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self {
            water_level: "WS_LE1_VAL".to_string(),
            water_pressure: "WS_PE1_VAL".to_string(),
            pressure_after_filter: "WS_PE2_VAL".to_string(),
            commands: [
                "alm_reset_cmd",
                "auto_alm_reset_cmd",
                "enable_P1_cmd",
                "enable_P2_cmd",
                "enable_shedule",
            ]
            .map(String::from)
            .to_vec(),
            statuses: [
                "WS_LE1_STS",
                "WS_PS1_STS",
                "WS_OL_ALARM",
                "WS_DRY_ALARM",
                "WS_GENERAL_ALARM",
                "WS_LS1_STS",
                "WS_LS2_STS",
                "WS_LS3_STS",
                "WS_P1_CMD",
                "WS_P2_CMD",
                "WS_Y1_CMD",
                "WS_Y2_CMD",
                "WS_Y5_CMD",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

impl FieldCatalog {
    pub fn is_command(&self, name: &str) -> bool {
        self.commands.iter().any(|c| c == name)
    }
}

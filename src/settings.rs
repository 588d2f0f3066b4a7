use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
#[cfg(not(target_arch = "wasm32"))]
use std::{fs, path::PathBuf};

const ENABLE_LOGS: bool = true;

use crate::log_warn;

pub const FIRST_BLOCK_WAIT_TIME: &str = "firstBlockWaitTime";
pub const FIRST_BLOCK_DURATION: &str = "firstBlockDuration";
pub const FOLLOWUP_BLOCK_WAIT_TIME: &str = "followupBlockWaitTime";
pub const FOLLOWUP_BLOCK_DURATION: &str = "followupBlockDuration";

/// How long to wait for inactivity and how long the following block lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPlan {
    pub wait_secs: u64,
    pub block_secs: u64,
}

impl BlockPlan {
    pub fn wait_ms(&self) -> u64 {
        self.wait_secs.saturating_mul(1000)
    }
}

/// The four user-tunable durations, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSettings {
    pub first_block_wait_time: u64,
    pub first_block_duration: u64,
    pub followup_block_wait_time: u64,
    pub followup_block_duration: u64,
}

impl Default for BlockSettings {
    fn default() -> Self {
        Self {
            first_block_wait_time: 10,
            first_block_duration: 5,
            followup_block_wait_time: 10,
            followup_block_duration: 5,
        }
    }
}

impl BlockSettings {
    pub fn first_plan(&self) -> BlockPlan {
        BlockPlan {
            wait_secs: self.first_block_wait_time,
            block_secs: self.first_block_duration,
        }
    }

    pub fn followup_plan(&self) -> BlockPlan {
        BlockPlan {
            wait_secs: self.followup_block_wait_time,
            block_secs: self.followup_block_duration,
        }
    }

    /// Merge a stored object over the defaults, field by field.
    ///
    /// A field that is missing or not a non-negative integer keeps its default,
    /// so a partially written or corrupted store never blocks startup.
    pub fn from_stored(value: &Value) -> Self {
        let defaults = Self::default();
        let Some(object) = value.as_object() else {
            if !value.is_null() {
                log_warn!("stored settings are not an object, using defaults: {value}");
            }
            return defaults;
        };

        Self {
            first_block_wait_time: stored_field(
                object,
                FIRST_BLOCK_WAIT_TIME,
                defaults.first_block_wait_time,
            ),
            first_block_duration: stored_field(
                object,
                FIRST_BLOCK_DURATION,
                defaults.first_block_duration,
            ),
            followup_block_wait_time: stored_field(
                object,
                FOLLOWUP_BLOCK_WAIT_TIME,
                defaults.followup_block_wait_time,
            ),
            followup_block_duration: stored_field(
                object,
                FOLLOWUP_BLOCK_DURATION,
                defaults.followup_block_duration,
            ),
        }
    }

    pub fn to_stored(&self) -> Value {
        // Plain struct of u64s; serialization cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn stored_field(object: &Map<String, Value>, key: &str, default: u64) -> u64 {
    match object.get(key) {
        None | Some(Value::Null) => default,
        Some(value) => match value.as_u64() {
            Some(secs) => secs,
            None => {
                log_warn!("ignoring invalid stored value for {key}: {value}");
                default
            }
        },
    }
}

/// Raw text of the options page inputs.
#[derive(Debug, Clone, Default)]
pub struct SettingsForm {
    pub first_block_wait_time: String,
    pub first_block_duration: String,
    pub followup_block_wait_time: String,
    pub followup_block_duration: String,
}

impl From<&BlockSettings> for SettingsForm {
    fn from(settings: &BlockSettings) -> Self {
        Self {
            first_block_wait_time: settings.first_block_wait_time.to_string(),
            first_block_duration: settings.first_block_duration.to_string(),
            followup_block_wait_time: settings.followup_block_wait_time.to_string(),
            followup_block_duration: settings.followup_block_duration.to_string(),
        }
    }
}

impl TryFrom<&SettingsForm> for BlockSettings {
    type Error = anyhow::Error;

    fn try_from(form: &SettingsForm) -> Result<Self> {
        Ok(Self {
            first_block_wait_time: parse_seconds(FIRST_BLOCK_WAIT_TIME, &form.first_block_wait_time)?,
            first_block_duration: parse_seconds(FIRST_BLOCK_DURATION, &form.first_block_duration)?,
            followup_block_wait_time: parse_seconds(
                FOLLOWUP_BLOCK_WAIT_TIME,
                &form.followup_block_wait_time,
            )?,
            followup_block_duration: parse_seconds(
                FOLLOWUP_BLOCK_DURATION,
                &form.followup_block_duration,
            )?,
        })
    }
}

fn parse_seconds(field: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .with_context(|| format!("{field} must be a non-negative whole number of seconds, got {raw:?}"))
}

/// Settings persisted as a JSON file, used outside the browser.
#[cfg(not(target_arch = "wasm32"))]
pub struct SettingsStore {
    path: PathBuf,
    data: BlockSettings,
}

#[cfg(not(target_arch = "wasm32"))]
impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            match serde_json::from_str::<Value>(&contents) {
                Ok(value) => BlockSettings::from_stored(&value),
                Err(err) => {
                    log_warn!("settings file {} is not valid JSON ({err}), using defaults", path.display());
                    BlockSettings::default()
                }
            }
        } else {
            BlockSettings::default()
        };

        Ok(Self { path, data })
    }

    pub fn settings(&self) -> BlockSettings {
        self.data
    }

    pub fn update(&mut self, settings: BlockSettings) -> Result<()> {
        self.persist(&settings)?;
        self.data = settings;
        Ok(())
    }

    fn persist(&self, data: &BlockSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_ten_and_five() {
        let settings = BlockSettings::default();
        assert_eq!(settings.first_plan(), BlockPlan { wait_secs: 10, block_secs: 5 });
        assert_eq!(settings.followup_plan(), BlockPlan { wait_secs: 10, block_secs: 5 });
    }

    #[test]
    fn stored_values_merge_over_defaults() {
        let settings = BlockSettings::from_stored(&json!({
            "firstBlockWaitTime": 30,
            "followupBlockDuration": 12
        }));
        assert_eq!(settings.first_block_wait_time, 30);
        assert_eq!(settings.first_block_duration, 5);
        assert_eq!(settings.followup_block_wait_time, 10);
        assert_eq!(settings.followup_block_duration, 12);
    }

    #[test]
    fn invalid_stored_fields_fall_back_per_field() {
        let settings = BlockSettings::from_stored(&json!({
            "firstBlockWaitTime": -4,
            "firstBlockDuration": "seven",
            "followupBlockWaitTime": 2.5,
            "followupBlockDuration": 0
        }));
        assert_eq!(settings.first_block_wait_time, 10);
        assert_eq!(settings.first_block_duration, 5);
        assert_eq!(settings.followup_block_wait_time, 10);
        assert_eq!(settings.followup_block_duration, 0);
    }

    #[test]
    fn non_object_store_uses_defaults() {
        assert_eq!(BlockSettings::from_stored(&Value::Null), BlockSettings::default());
        assert_eq!(BlockSettings::from_stored(&json!([1, 2])), BlockSettings::default());
    }

    #[test]
    fn stored_keys_are_camel_case() {
        let stored = BlockSettings::default().to_stored();
        assert_eq!(stored[FIRST_BLOCK_WAIT_TIME], 10);
        assert_eq!(stored[FOLLOWUP_BLOCK_DURATION], 5);
    }

    #[test]
    fn form_parses_trimmed_integers() {
        let form = SettingsForm {
            first_block_wait_time: " 20 ".into(),
            first_block_duration: "3".into(),
            followup_block_wait_time: "60".into(),
            followup_block_duration: "0".into(),
        };
        let settings = BlockSettings::try_from(&form).unwrap();
        assert_eq!(settings.first_plan(), BlockPlan { wait_secs: 20, block_secs: 3 });
        assert_eq!(settings.followup_plan(), BlockPlan { wait_secs: 60, block_secs: 0 });
    }

    #[test]
    fn form_error_names_the_field() {
        let mut form = SettingsForm::from(&BlockSettings::default());
        form.followup_block_wait_time = "-1".into();
        let err = BlockSettings::try_from(&form).unwrap_err();
        assert!(err.to_string().contains(FOLLOWUP_BLOCK_WAIT_TIME));
    }

    #[test]
    fn store_round_trips_through_file() {
        let path = std::env::temp_dir().join(format!("algoblock-settings-{}.json", uuid::Uuid::new_v4()));
        let mut store = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(store.settings(), BlockSettings::default());

        let updated = BlockSettings {
            first_block_wait_time: 45,
            ..BlockSettings::default()
        };
        store.update(updated).unwrap();

        let reopened = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(reopened.settings(), updated);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn unreadable_json_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("algoblock-settings-{}.json", uuid::Uuid::new_v4()));
        fs::write(&path, "{ not json").unwrap();
        let store = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(store.settings(), BlockSettings::default());
        let _ = fs::remove_file(path);
    }
}

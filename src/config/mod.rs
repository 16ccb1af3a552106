//! Service configuration.

mod settings;

pub use settings::{
    expand_env_vars, DatabaseSettings, ServerSettings, Settings, SettingsError,
    SummarizerSettings,
};

pub mod preferences;

pub use preferences::{
    DockPreferences, LoggingPreferences, Preferences, PreferencesError, PreferencesStore,
    TaskPreferences,
};

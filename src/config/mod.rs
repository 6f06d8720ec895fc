//! Configuration system
//!
//! Loads ~/.config/sixdegrees/config.yaml: operating mode, connection store
//! location, search bounds and Neynar API access. Every section falls back
//! to defaults when omitted.

mod settings;

pub use settings::{
    DatabaseSettings, NeynarSettings, OperatingMode, SearchSettings, SixDegreesConfig, MODE_ENV,
};

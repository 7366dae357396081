//! Test plans for the thdmeter THD harness.
//!
//! A test plan is a TOML file listing captures, the tone each one should
//! contain, and the distortion each one is allowed. Plan-level defaults
//! apply to every clip unless the clip overrides them.
//!
//! # Example
//!
//! ```rust,no_run
//! use thdmeter_config::{ClipConfig, TestPlan, paths};
//!
//! let plan = TestPlan::new("loopback")
//!     .with_threshold(0.5)
//!     .with_clip(ClipConfig::new("left.wav", 1000.0).with_channel(0))
//!     .with_clip(ClipConfig::new("right.wav", 1000.0).with_channel(1));
//! plan.validate().unwrap();
//!
//! let dir = paths::ensure_user_plans_dir().unwrap();
//! plan.save(dir.join("loopback.toml")).unwrap();
//! ```

mod error;
mod plan;

/// Platform-specific locations for test plans.
pub mod paths;

pub use error::ConfigError;
pub use paths::{find_plan, user_config_dir, user_plans_dir};
pub use plan::{ClipConfig, ClipFormat, ClipSettings, TestPlan};

//! # Pure Data Module - Data Transfer Objects Only
//!
//! Configuration DTOs mapped from TOML. This module contains data only:
//! no validation and no default value calculation. Missing values stay
//! empty (`None`, empty path, empty list) and are resolved at wiring time.

mod app_config;

pub use app_config::AppConfig;

pub mod config;
pub mod cooldown;
pub mod reload;

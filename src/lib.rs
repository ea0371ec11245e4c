pub mod config;
pub mod esi;
pub mod export;
pub mod telemetry;

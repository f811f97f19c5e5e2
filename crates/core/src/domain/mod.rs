pub mod deal;
pub mod intent;
pub mod metrics;

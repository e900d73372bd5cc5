pub mod ema;
pub mod levels;
pub mod schedule;

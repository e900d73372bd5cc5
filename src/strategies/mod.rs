pub mod ema_trend;
pub mod signals;

pub use ema_trend::{EmaTrendEvaluator, SignalParams};
pub use signals::TradeSignal;

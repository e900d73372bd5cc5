pub mod bar;
pub mod interval;
pub mod status;

pub use bar::{PriceBar, PriceSeries};
pub use interval::{Interval, Period};
pub use status::TradeStatus;

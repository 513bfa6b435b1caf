pub mod loader;
pub mod returns;
pub mod types;

pub use loader::{LoaderError, PriceLoader};
pub use returns::{build_returns, ReturnSeries};
pub use types::{DataError, PricePoint, PriceSeries, ReturnMode};

//! Provider adapters, one per external API.

mod alpha_vantage;
mod binance;
mod coingecko;
mod exchangerate;
mod polygon;
mod twelve_data;
mod yahoo;

pub use alpha_vantage::AlphaVantage;
pub use binance::Binance;
pub use coingecko::CoinGecko;
pub use exchangerate::ExchangerateApi;
pub use polygon::Polygon;
pub use twelve_data::TwelveData;
pub use yahoo::Yahoo;

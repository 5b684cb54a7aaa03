//! Asset type classification from the raw symbol string.
//!
//! This is a heuristic, not a registry lookup. Ambiguous tickers are
//! misclassified on purpose: a real-world 6-letter stock ticker matches the
//! forex rule, and a crypto ticker missing from the fixed allow-list falls
//! through to stock. Changing either would change observable classification
//! for existing inputs, so the heuristic stays as-is.

use super::candle::AssetType;

/// Fixed allow-list of crypto tickers recognized by the classifier.
pub const CRYPTO_TICKERS: [&str; 12] = [
    "BTC", "ETH", "XRP", "ADA", "SOL", "DOGE", "MATIC", "LINK", "USDT", "USDC", "BNB", "XLM",
];

/// Classify a symbol into an asset type.
///
/// Rules, checked in order:
/// 1. At most 5 characters, all uppercase ASCII letters, and in the fixed
///    crypto allow-list: crypto.
/// 2. Exactly 6 uppercase ASCII letters (two concatenated 3-letter currency
///    codes, e.g. `EURUSD`): forex.
/// 3. Everything else: stock.
pub fn classify(symbol: &str) -> AssetType {
    let all_upper = !symbol.is_empty() && symbol.bytes().all(|b| b.is_ascii_uppercase());

    if symbol.len() <= 5 && all_upper && CRYPTO_TICKERS.contains(&symbol) {
        AssetType::Crypto
    } else if symbol.len() == 6 && all_upper {
        AssetType::Forex
    } else {
        AssetType::Stock
    }
}

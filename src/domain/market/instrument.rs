use serde::{Deserialize, Serialize};
use std::fmt;

/// Quote-currency suffix the provider appends to crypto tickers
pub const PROVIDER_SUFFIX: &str = "-USD";

/// The built-in scan universe, in provider notation.
pub const DEFAULT_UNIVERSE: &[&str] = &[
    // Top cap
    "BTC-USD", "ETH-USD", "BNB-USD", "SOL-USD", "XRP-USD", "ADA-USD", "DOGE-USD",
    "AVAX-USD", "TRX-USD", "DOT-USD", "LINK-USD", "MATIC-USD", "SHIB-USD",
    "LTC-USD", "BCH-USD", "ATOM-USD", "UNI-USD", "ICP-USD", "NEAR-USD", "LEO-USD",
    // Layer 1 & infra
    "APT-USD", "SUI-USD", "SEI-USD", "INJ-USD", "TIA-USD", "KAS-USD", "ALGO-USD",
    "HBAR-USD", "EGLD-USD", "XLM-USD", "XTZ-USD", "EOS-USD", "FTM-USD", "FLOW-USD",
    "MINA-USD", "QNT-USD", "ASTR-USD", "NEO-USD", "IOTA-USD", "KLAY-USD", "CFX-USD",
    "ROSE-USD", "GLMR-USD", "ZIL-USD", "KAVA-USD", "ONE-USD", "CKB-USD", "CELO-USD",
    // Layer 2
    "ARB-USD", "OP-USD", "MNT-USD", "IMX-USD", "LRC-USD", "METIS-USD", "SKL-USD",
    "STRK-USD", "BLUR-USD", "ZK-USD", "MANTA-USD",
    // AI & data
    "FET-USD", "RNDR-USD", "GRT-USD", "TAO-USD", "AGIX-USD", "OCEAN-USD", "WLD-USD",
    "JASMY-USD", "AKT-USD", "GLM-USD", "RLC-USD", "NMR-USD",
    // DeFi
    "MKR-USD", "AAVE-USD", "LDO-USD", "SNX-USD", "RUNE-USD", "CRV-USD", "DYDX-USD",
    "GNO-USD", "PENDLE-USD", "1INCH-USD", "COMP-USD", "FXS-USD", "CAKE-USD", "CVX-USD",
    "JUP-USD", "PYTH-USD", "RAY-USD", "OSMO-USD", "LUNA-USD", "LUNC-USD", "RPL-USD",
    // Memes
    "PEPE-USD", "BONK-USD", "WIF-USD", "FLOKI-USD", "BOME-USD", "MEME-USD",
    "MOG-USD", "BRETT-USD", "POPCAT-USD",
    // Gaming / metaverse
    "GALA-USD", "SAND-USD", "MANA-USD", "AXS-USD", "BEAM-USD", "ENJ-USD", "APE-USD",
    "ILV-USD", "RON-USD", "GMT-USD", "PIXEL-USD", "PRIME-USD", "XAI-USD",
    // Legacy
    "ETC-USD", "XMR-USD", "ZEC-USD", "DASH-USD", "BSV-USD", "XEC-USD", "RVN-USD",
    "BTG-USD", "QTUM-USD", "OMG-USD", "BAT-USD", "ZRX-USD", "ANKR-USD", "CHZ-USD",
    "HOT-USD", "IOST-USD", "SC-USD", "LSK-USD", "WAVES-USD", "ICX-USD", "ONT-USD",
];

/// A tradable symbol in provider notation (e.g. `BTC-USD`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instrument(String);

impl Instrument {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self(ticker.into().trim().to_uppercase())
    }

    /// Provider form, used for every upstream request
    pub fn ticker(&self) -> &str {
        &self.0
    }

    /// Display form with the provider suffix stripped (`BTC-USD` -> `BTC`)
    pub fn display_symbol(&self) -> &str {
        self.0.strip_suffix(PROVIDER_SUFFIX).unwrap_or(&self.0)
    }

    pub fn default_universe() -> Vec<Instrument> {
        DEFAULT_UNIVERSE.iter().map(|t| Instrument::new(*t)).collect()
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Instrument {
    fn from(ticker: &str) -> Self {
        Instrument::new(ticker)
    }
}

use serde::{Deserialize, Serialize};

/// Supported exchanges. The engine only ever talks to the adapter
/// interface; this enum selects which adapter a component is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exchange {
    Alpaca,
    Binance,
    /// In-process simulator, used for tests and paper trading
    Sim,
}

impl Exchange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Alpaca => "ALPACA",
            Exchange::Binance => "BINANCE",
            Exchange::Sim => "SIM",
        }
    }
}

impl std::fmt::Display for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

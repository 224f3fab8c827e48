use serde::{Deserialize, Serialize};

use super::Exchange;

/// Stage of a strategy's existence, independent of any individual
/// order's state machine. The durable store persists this value but
/// imposes no rules on transitions between stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    Created,
    Initialized,
    Running,
    Paused,
    Stopped,
    Completed,
    Cancelled,
    Failed,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Created => "CREATED",
            LifecycleState::Initialized => "INITIALIZED",
            LifecycleState::Running => "RUNNING",
            LifecycleState::Paused => "PAUSED",
            LifecycleState::Stopped => "STOPPED",
            LifecycleState::Completed => "COMPLETED",
            LifecycleState::Cancelled => "CANCELLED",
            LifecycleState::Failed => "FAILED",
        }
    }
}

/// A typed strategy parameter value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamValue {
    Text(String),
    Int(i64),
}

/// A strategy definition as persisted by the durable store.
///
/// The symbol list is order-significant and duplicates are preserved;
/// parameters keep their insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyDefinition {
    /// Caller-assigned identifier
    pub id: String,
    pub name: String,
    /// Algorithm type, e.g. "market-maker" or "mean-reversion"
    pub algorithm: String,
    pub symbols: Vec<String>,
    pub exchange: Exchange,
    pub params: Vec<(String, ParamValue)>,
    pub lifecycle: LifecycleState,
}

impl StrategyDefinition {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        algorithm: impl Into<String>,
        exchange: Exchange,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            algorithm: algorithm.into(),
            symbols: Vec::new(),
            exchange,
            params: Vec::new(),
            lifecycle: LifecycleState::Created,
        }
    }

    pub fn with_symbols(mut self, symbols: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.symbols = symbols.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: ParamValue) -> Self {
        self.params.push((key.into(), value));
        self
    }

    pub fn with_lifecycle(mut self, lifecycle: LifecycleState) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Look up a parameter by name (first match wins)
    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

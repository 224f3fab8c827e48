mod exchange;
mod fill;
mod order;
mod order_status;
mod order_type;
mod position;
mod side;
mod strategy;
mod time_in_force;

pub use exchange::Exchange;
pub use fill::Fill;
pub use order::{Order, OrderId};
pub use order_status::OrderStatus;
pub use order_type::OrderType;
pub use position::{Position, PositionKey};
pub use side::Side;
pub use strategy::{LifecycleState, ParamValue, StrategyDefinition};
pub use time_in_force::TimeInForce;

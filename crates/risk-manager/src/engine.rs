//! Pure risk evaluation
//!
//! A function of (risk context, proposed order) with no state and no
//! side effects. Checks run in a fixed order and the first breach found
//! is the one reported, which keeps rejections deterministic even when
//! several limits would be breached at once.

use hermes_gateway::OrderRequest;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::context::RiskContext;

/// A named limit breach. Each variant carries the observed and
/// configured values so the rejection reason is self-explanatory.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskBreach {
    #[error("max orders per day breached: {submitted} submitted today, limit {limit}")]
    MaxOrdersPerDay { submitted: u32, limit: u32 },

    #[error(
        "max daily notional breached: {traded} traded + {proposed} proposed exceeds limit {limit}"
    )]
    MaxDailyNotional {
        traded: Decimal,
        proposed: Decimal,
        limit: Decimal,
    },

    #[error("max net exposure breached: projected {projected} exceeds limit {limit}")]
    MaxNetExposure { projected: Decimal, limit: Decimal },

    #[error("max gross exposure breached: projected {projected} exceeds limit {limit}")]
    MaxGrossExposure { projected: Decimal, limit: Decimal },

    #[error("max position size breached for {symbol}: projected {projected} exceeds limit {limit}")]
    MaxPositionSize {
        symbol: String,
        projected: Decimal,
        limit: Decimal,
    },
}

/// Stateless pre-trade risk checks
pub struct RiskEngine;

impl RiskEngine {
    /// Monetary size of the proposed order: limit price when present,
    /// else the symbol's last mark price, else zero (an unpriced market
    /// order on a never-marked symbol is bounded by the count and
    /// position-size checks only).
    pub fn proposed_notional(ctx: &RiskContext, request: &OrderRequest) -> Decimal {
        let price = request
            .price
            .or_else(|| ctx.mark_price(&request.symbol))
            .unwrap_or(Decimal::ZERO);
        request.quantity * price
    }

    /// Evaluate a proposed order against the context. `Ok(())` means all
    /// checks passed; otherwise exactly the first breach, in the fixed
    /// order: orders/day, daily notional, net exposure, gross exposure,
    /// position size.
    pub fn evaluate(ctx: &RiskContext, request: &OrderRequest) -> Result<(), RiskBreach> {
        let limits = &ctx.limits;
        let notional = Self::proposed_notional(ctx, request);

        // 1. Orders per day
        if ctx.orders_submitted_today >= limits.max_orders_per_day {
            return Err(RiskBreach::MaxOrdersPerDay {
                submitted: ctx.orders_submitted_today,
                limit: limits.max_orders_per_day,
            });
        }

        // 2. Daily notional
        if ctx.notional_traded_today + notional > limits.max_daily_notional {
            return Err(RiskBreach::MaxDailyNotional {
                traded: ctx.notional_traded_today,
                proposed: notional,
                limit: limits.max_daily_notional,
            });
        }

        // 3. Net exposure
        let projected_net = ctx.portfolio.net_exposure + request.side.sign() * notional;
        if projected_net.abs() > limits.max_net_exposure {
            return Err(RiskBreach::MaxNetExposure {
                projected: projected_net,
                limit: limits.max_net_exposure,
            });
        }

        // 4. Gross exposure
        let projected_gross = ctx.portfolio.gross_exposure + notional;
        if projected_gross > limits.max_gross_exposure {
            return Err(RiskBreach::MaxGrossExposure {
                projected: projected_gross,
                limit: limits.max_gross_exposure,
            });
        }

        // 5. Position size per symbol
        let projected_position =
            ctx.position_quantity(&request.symbol) + request.side.sign() * request.quantity;
        if projected_position.abs() > limits.max_position_size {
            return Err(RiskBreach::MaxPositionSize {
                symbol: request.symbol.clone(),
                projected: projected_position,
                limit: limits.max_position_size,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PortfolioView;
    use crate::limits::RiskLimits;
    use hermes_core::{Exchange, Side, TimeInForce};
    use rust_decimal_macros::dec;

    fn ctx(limits: RiskLimits) -> RiskContext {
        RiskContext {
            portfolio: PortfolioView::default(),
            orders_submitted_today: 0,
            notional_traded_today: Decimal::ZERO,
            limits,
        }
    }

    fn limit_buy(quantity: Decimal, price: Decimal) -> OrderRequest {
        OrderRequest::limit(
            "BTC-USD",
            Exchange::Sim,
            Side::Buy,
            quantity,
            price,
            TimeInForce::Gtc,
        )
    }

    #[test]
    fn passes_within_limits() {
        let ctx = ctx(RiskLimits::default());
        let req = limit_buy(dec!(1), dec!(100));
        assert!(RiskEngine::evaluate(&ctx, &req).is_ok());
    }

    #[test]
    fn order_count_limit() {
        let mut ctx = ctx(RiskLimits {
            max_orders_per_day: 2,
            ..Default::default()
        });
        ctx.orders_submitted_today = 2;

        let req = limit_buy(dec!(1), dec!(100));
        assert_eq!(
            RiskEngine::evaluate(&ctx, &req),
            Err(RiskBreach::MaxOrdersPerDay {
                submitted: 2,
                limit: 2
            })
        );
    }

    #[test]
    fn daily_notional_limit_counts_proposal() {
        let mut ctx = ctx(RiskLimits {
            max_daily_notional: dec!(1000),
            ..Default::default()
        });
        ctx.notional_traded_today = dec!(950);

        // 950 + 100 > 1000
        let req = limit_buy(dec!(1), dec!(100));
        assert!(matches!(
            RiskEngine::evaluate(&ctx, &req),
            Err(RiskBreach::MaxDailyNotional { .. })
        ));

        // 950 + 50 == 1000 is allowed (inclusive limit)
        let req = limit_buy(dec!(1), dec!(50));
        assert!(RiskEngine::evaluate(&ctx, &req).is_ok());
    }

    #[test]
    fn net_exposure_is_signed() {
        let mut ctx = ctx(RiskLimits {
            max_net_exposure: dec!(1000),
            ..Default::default()
        });
        ctx.portfolio.net_exposure = dec!(-900);

        // A buy reduces the short net exposure: fine
        let buy = limit_buy(dec!(2), dec!(100));
        assert!(RiskEngine::evaluate(&ctx, &buy).is_ok());

        // A sell pushes it further negative: breach
        let sell = OrderRequest::limit(
            "BTC-USD",
            Exchange::Sim,
            Side::Sell,
            dec!(2),
            dec!(100),
            TimeInForce::Gtc,
        );
        assert_eq!(
            RiskEngine::evaluate(&ctx, &sell),
            Err(RiskBreach::MaxNetExposure {
                projected: dec!(-1100),
                limit: dec!(1000)
            })
        );
    }

    #[test]
    fn gross_exposure_accumulates_regardless_of_side() {
        let mut ctx = ctx(RiskLimits {
            max_gross_exposure: dec!(1000),
            // Net stays permissive so the gross check is the one that fires
            max_net_exposure: dec!(100_000),
            ..Default::default()
        });
        ctx.portfolio.gross_exposure = dec!(950);
        ctx.portfolio.net_exposure = dec!(-950);

        // Even a net-reducing buy adds gross exposure
        let buy = limit_buy(dec!(1), dec!(100));
        assert!(matches!(
            RiskEngine::evaluate(&ctx, &buy),
            Err(RiskBreach::MaxGrossExposure { .. })
        ));
    }

    #[test]
    fn position_size_limit_is_per_symbol() {
        let mut ctx = ctx(RiskLimits {
            max_position_size: dec!(10),
            ..Default::default()
        });
        ctx.portfolio.positions.insert("BTC-USD".into(), dec!(8));

        let req = limit_buy(dec!(3), dec!(1));
        assert_eq!(
            RiskEngine::evaluate(&ctx, &req),
            Err(RiskBreach::MaxPositionSize {
                symbol: "BTC-USD".into(),
                projected: dec!(11),
                limit: dec!(10)
            })
        );

        // Another symbol is unconstrained by BTC's position
        let other = OrderRequest::limit(
            "ETH-USD",
            Exchange::Sim,
            Side::Buy,
            dec!(3),
            dec!(1),
            TimeInForce::Gtc,
        );
        assert!(RiskEngine::evaluate(&ctx, &other).is_ok());
    }

    #[test]
    fn first_breach_wins_when_several_are_hit() {
        // Both the daily notional and the net exposure limits would be
        // breached; the notional check comes first in the fixed order.
        let mut ctx = ctx(RiskLimits {
            max_daily_notional: dec!(100),
            max_net_exposure: dec!(100),
            ..Default::default()
        });
        ctx.notional_traded_today = dec!(90);
        ctx.portfolio.net_exposure = dec!(90);

        let req = limit_buy(dec!(1), dec!(50));
        assert!(matches!(
            RiskEngine::evaluate(&ctx, &req),
            Err(RiskBreach::MaxDailyNotional { .. })
        ));
    }

    #[test]
    fn market_order_uses_mark_price() {
        let mut ctx = ctx(RiskLimits {
            max_daily_notional: dec!(1000),
            ..Default::default()
        });
        ctx.portfolio.mark_prices.insert("BTC-USD".into(), dec!(600));

        let req = OrderRequest::market("BTC-USD", Exchange::Sim, Side::Buy, dec!(2));
        // 2 * 600 = 1200 > 1000
        assert!(matches!(
            RiskEngine::evaluate(&ctx, &req),
            Err(RiskBreach::MaxDailyNotional { .. })
        ));
    }
}

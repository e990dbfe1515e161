//! Profit/loss calculations for gold purchases.

use serde::Serialize;

/// Profit/loss of a single purchase against the current market price.
///
/// All monetary amounts are rounded to 2 decimal places for display.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Valuation {
    pub purchase_value: f64,
    pub current_value: f64,
    pub profit_loss: f64,
    pub profit_loss_percentage: f64,
    pub is_profit: bool,
}

/// Aggregate profit/loss over a set of purchases.
///
/// The percentage is computed over the summed values, not averaged over the
/// per-item percentages.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PortfolioValuation {
    pub total_investment: f64,
    pub total_current_value: f64,
    pub total_profit_loss: f64,
    pub total_profit_loss_percentage: f64,
    pub is_profit: bool,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Evaluates one purchase of `grams` bought at `purchase_price` per gram
/// against `current_price` per gram. Both prices are in the same currency.
///
/// A non-positive purchase value (possible only from malformed input) yields
/// a percentage of 0 rather than a division by zero. Break-even counts as
/// profit.
pub fn evaluate(purchase_price: f64, current_price: f64, grams: f64) -> Valuation {
    let purchase_value = purchase_price * grams;
    let current_value = current_price * grams;
    let profit_loss = current_value - purchase_value;
    let profit_loss_percentage = if purchase_value > 0.0 {
        profit_loss / purchase_value * 100.0
    } else {
        0.0
    };

    Valuation {
        purchase_value: round2(purchase_value),
        current_value: round2(current_value),
        profit_loss: round2(profit_loss),
        profit_loss_percentage: round2(profit_loss_percentage),
        is_profit: profit_loss >= 0.0,
    }
}

/// Sums purchase and current values across all items before deriving the
/// aggregate profit/loss and percentage.
pub fn aggregate(valuations: &[Valuation]) -> PortfolioValuation {
    let total_investment: f64 = valuations.iter().map(|v| v.purchase_value).sum();
    let total_current_value: f64 = valuations.iter().map(|v| v.current_value).sum();
    let total_profit_loss = total_current_value - total_investment;
    let total_profit_loss_percentage = if total_investment > 0.0 {
        total_profit_loss / total_investment * 100.0
    } else {
        0.0
    };

    PortfolioValuation {
        total_investment: round2(total_investment),
        total_current_value: round2(total_current_value),
        total_profit_loss: round2(total_profit_loss),
        total_profit_loss_percentage: round2(total_profit_loss_percentage),
        is_profit: total_profit_loss >= 0.0,
    }
}

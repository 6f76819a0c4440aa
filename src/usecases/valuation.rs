use crate::domain::models::{Holding, HoldingValuation, PerformerRef, PortfolioSummary};

/// Economics of a single position. Zero invested capital reads as 0%
/// gain, never NaN or infinity.
pub fn value_holding(holding: &Holding) -> HoldingValuation {
    let investment = holding.quantity * holding.purchase_price;
    let current_value = holding.quantity * holding.current_price;
    let gain_loss = current_value - investment;
    let gain_loss_percent = if investment > 0.0 {
        (gain_loss / investment) * 100.0
    } else {
        0.0
    };
    HoldingValuation {
        investment,
        current_value,
        gain_loss,
        gain_loss_percent,
    }
}

/// Aggregate a holding list in one left-to-right scan. Best/worst
/// performer ties go to the first holding encountered; an empty list
/// yields zero aggregates and no performers.
pub fn summarize_portfolio(holdings: &[Holding]) -> PortfolioSummary {
    let mut total_investment = 0.0;
    let mut current_value = 0.0;
    let mut best: Option<PerformerRef> = None;
    let mut worst: Option<PerformerRef> = None;

    for holding in holdings {
        let valued = value_holding(holding);
        total_investment += valued.investment;
        current_value += valued.current_value;

        let performer = PerformerRef {
            symbol: holding.symbol.clone(),
            name: holding.name.clone(),
            gain_loss_percent: valued.gain_loss_percent,
        };
        match &best {
            Some(b) if b.gain_loss_percent >= performer.gain_loss_percent => {}
            _ => best = Some(performer.clone()),
        }
        match &worst {
            Some(w) if w.gain_loss_percent <= performer.gain_loss_percent => {}
            _ => worst = Some(performer),
        }
    }

    let total_gain_loss = current_value - total_investment;
    let total_gain_loss_percent = if total_investment > 0.0 {
        (total_gain_loss / total_investment) * 100.0
    } else {
        0.0
    };

    PortfolioSummary {
        total_stocks: holdings.len(),
        total_investment,
        current_value,
        total_gain_loss,
        total_gain_loss_percent,
        best_performer: best,
        worst_performer: worst,
    }
}

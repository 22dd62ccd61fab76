// Turns aggregated numbers into an EXECUTE/WAIT/SKIP recommendation.
use crate::aggregation::numeric::round2;
use crate::models::route::RouteAction;

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDecision {
    pub action: RouteAction,
    pub confidence: f64,
    pub reason: String,
}

/// `adjustedProfit = netProfitPct - slippagePct`,
/// `premiumRisk = volatilityPct * sqrt(transferTimeMin / 60)`,
/// `score = adjustedProfit - premiumRisk`.
pub fn compute_action(
    net_profit_pct: f64,
    slippage_pct: f64,
    transfer_time_min: f64,
    volatility_pct: f64,
) -> ActionDecision {
    let adjusted_profit = net_profit_pct - slippage_pct;
    let premium_risk = volatility_pct * (transfer_time_min / 60.0).sqrt();
    let score = adjusted_profit - premium_risk;

    let (action, raw_confidence) = if score > 1.0 {
        (RouteAction::Execute, 0.80 + (score - 1.0) * 0.05)
    } else if score > 0.0 {
        (RouteAction::Wait, 0.5 + score * 0.3)
    } else {
        (RouteAction::Skip, 0.5 + score * 0.2)
    };

    let confidence = round2(raw_confidence.clamp(0.10, 0.95));
    let reason = format!(
        "adjustedProfit={:.2}% premiumRisk={:.2}%",
        round2(adjusted_profit),
        round2(premium_risk)
    );

    ActionDecision { action, confidence, reason }
}

/// Reduce a set of per-coin action decisions to a market-wide summary label.
pub fn market_condition(actions: &[RouteAction]) -> &'static str {
    if actions.is_empty() {
        return "neutral";
    }
    let execute = actions.iter().filter(|a| **a == RouteAction::Execute).count();
    let skip = actions.iter().filter(|a| **a == RouteAction::Skip).count();
    if execute * 2 > actions.len() {
        "favorable"
    } else if skip * 2 > actions.len() {
        "unfavorable"
    } else {
        "neutral"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_score_executes_with_clamped_confidence() {
        let decision = compute_action(5.0, 0.1, 10.0, 0.2);
        assert_eq!(decision.action, RouteAction::Execute);
        assert!(decision.confidence >= 0.10 && decision.confidence <= 0.95);
    }

    #[test]
    fn marginal_positive_score_waits() {
        let decision = compute_action(0.8, 0.1, 10.0, 0.1);
        assert_eq!(decision.action, RouteAction::Wait);
    }

    #[test]
    fn non_positive_score_skips() {
        let decision = compute_action(0.1, 0.5, 30.0, 1.0);
        assert_eq!(decision.action, RouteAction::Skip);
        assert!(decision.confidence >= 0.10);
    }

    #[test]
    fn confidence_never_leaves_the_documented_band() {
        for net in [-10.0, -1.0, 0.0, 1.0, 10.0, 50.0] {
            let decision = compute_action(net, 0.0, 0.0, 0.0);
            assert!(decision.confidence >= 0.10 && decision.confidence <= 0.95);
        }
    }

    #[test]
    fn scenario_c_matches_documented_fixture() {
        // BTC premiumPct=+1.5 -> netProfitPct ~1.15, slippage ~0.05,
        // volatility 0.1%, transferTime within 6h window.
        let decision = compute_action(1.15, 0.05, 5.0, 0.1);
        assert_eq!(decision.action, RouteAction::Execute);
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let a = compute_action(2.0, 0.3, 15.0, 0.4);
        let b = compute_action(2.0, 0.3, 15.0, 0.4);
        assert_eq!(a.action, b.action);
        assert_eq!(a.confidence, b.confidence);
    }
}

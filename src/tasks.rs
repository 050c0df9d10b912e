//! Task specifications
//!
//! Immutable descriptions of the work one wallet performs per cycle,
//! supplied once at startup and shared read-only across all wallet
//! iterations. The closed [`TaskSpec`] enum replaces ad-hoc parameter bags;
//! the scheduler dispatches over it exhaustively.

use crate::tokens::{addresses, units};
use alloy::primitives::{Address, U256};

/// Number of AquaFlux mint attempts per wallet
#[derive(Debug, Clone)]
pub struct MintTask {
    pub count: u32,
}

/// Number of four-leg swap cycles per wallet
#[derive(Debug, Clone)]
pub struct SwapTask {
    pub cycles: u32,
}

/// Number of DVM liquidity deposits per wallet
#[derive(Debug, Clone)]
pub struct LiquidityTask {
    pub count: u32,
}

/// Tip target and repeat count per wallet
#[derive(Debug, Clone)]
pub struct TipTask {
    /// X handle receiving the tips (same target for every wallet)
    pub recipient: String,
    pub count: u32,
}

/// One unit of scheduled work
#[derive(Debug, Clone)]
pub enum TaskSpec {
    Mint(MintTask),
    Swap(SwapTask),
    Liquidity(LiquidityTask),
    Tip(TipTask),
}

/// Raw operator-supplied inputs, before validation
#[derive(Debug, Clone, Default)]
pub struct PlanInputs {
    pub mint_count: String,
    pub swap_cycles: String,
    pub liquidity_count: String,
    pub tip_recipient: String,
    pub tip_count: String,
}

/// The fixed-order task list executed for every wallet
#[derive(Debug, Clone, Default)]
pub struct TaskPlan {
    tasks: Vec<TaskSpec>,
}

impl TaskPlan {
    /// Build the plan from raw inputs. Malformed or non-positive counts
    /// disable that task kind for every wallet rather than failing the run.
    /// Execution order is fixed: mints, swaps, liquidity, tips.
    pub fn from_inputs(inputs: &PlanInputs) -> Self {
        let mut tasks = Vec::new();

        if let Some(count) = parse_count(&inputs.mint_count) {
            tasks.push(TaskSpec::Mint(MintTask { count }));
        } else {
            tracing::warn!("invalid AquaFlux mint count, skipping mints");
        }
        if let Some(cycles) = parse_count(&inputs.swap_cycles) {
            tasks.push(TaskSpec::Swap(SwapTask { cycles }));
        } else {
            tracing::warn!("invalid swap cycle count, skipping swaps");
        }
        if let Some(count) = parse_count(&inputs.liquidity_count) {
            tasks.push(TaskSpec::Liquidity(LiquidityTask { count }));
        } else {
            tracing::warn!("invalid liquidity count, skipping add liquidity");
        }
        let recipient = inputs.tip_recipient.trim();
        match (recipient.is_empty(), parse_count(&inputs.tip_count)) {
            (false, Some(count)) => tasks.push(TaskSpec::Tip(TipTask {
                recipient: recipient.to_string(),
                count,
            })),
            _ => tracing::warn!("invalid username or tip count, skipping tips"),
        }

        Self { tasks }
    }

    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Parse a repeat count; anything malformed or zero disables the feature.
pub fn parse_count(raw: &str) -> Option<u32> {
    match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => Some(n),
        _ => None,
    }
}

/// One leg of the swap batch
#[derive(Debug, Clone)]
pub struct SwapLeg {
    pub from: Address,
    pub to: Address,
    pub from_symbol: &'static str,
    pub to_symbol: &'static str,
    pub amount: U256,
}

/// Expand swap cycles into the fixed leg order:
/// PHRS→USDT, USDT→PHRS, PHRS→USDC, USDC→PHRS.
pub fn swap_legs(cycles: u32) -> Vec<SwapLeg> {
    let phrs_leg_amount = U256::from(2_450_000_000_000_000u64); // 0.00245 PHRS
    let stable_leg_amount = units(1, 6); // 1 USDT / 1 USDC

    let pairs = [
        (addresses::PHRS, addresses::USDT, "PHRS", "USDT", phrs_leg_amount),
        (addresses::USDT, addresses::PHRS, "USDT", "PHRS", stable_leg_amount),
        (addresses::PHRS, addresses::USDC, "PHRS", "USDC", phrs_leg_amount),
        (addresses::USDC, addresses::PHRS, "USDC", "PHRS", stable_leg_amount),
    ];

    (0..cycles)
        .flat_map(|_| pairs.iter().cloned())
        .map(|(from, to, from_symbol, to_symbol, amount)| SwapLeg {
            from,
            to,
            from_symbol,
            to_symbol,
            amount,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("3"), Some(3));
        assert_eq!(parse_count(" 12 "), Some(12));
        assert_eq!(parse_count("0"), None);
        assert_eq!(parse_count("-1"), None);
        assert_eq!(parse_count("abc"), None);
        assert_eq!(parse_count(""), None);
    }

    #[test]
    fn test_plan_preserves_fixed_order() {
        let plan = TaskPlan::from_inputs(&PlanInputs {
            mint_count: "1".into(),
            swap_cycles: "2".into(),
            liquidity_count: "3".into(),
            tip_recipient: "someone".into(),
            tip_count: "4".into(),
        });
        let kinds: Vec<_> = plan
            .tasks()
            .iter()
            .map(|t| match t {
                TaskSpec::Mint(_) => "mint",
                TaskSpec::Swap(_) => "swap",
                TaskSpec::Liquidity(_) => "liquidity",
                TaskSpec::Tip(_) => "tip",
            })
            .collect();
        assert_eq!(kinds, vec!["mint", "swap", "liquidity", "tip"]);
    }

    #[test]
    fn test_malformed_counts_disable_kinds() {
        let plan = TaskPlan::from_inputs(&PlanInputs {
            mint_count: "nope".into(),
            swap_cycles: "1".into(),
            liquidity_count: "".into(),
            tip_recipient: "".into(),
            tip_count: "5".into(),
        });
        assert_eq!(plan.tasks().len(), 1);
        assert!(matches!(plan.tasks()[0], TaskSpec::Swap(_)));
    }

    #[test]
    fn test_all_malformed_inputs_yield_an_empty_plan() {
        // Disabled features, not an error; the run proceeds with an idle plan.
        let plan = TaskPlan::from_inputs(&PlanInputs::default());
        assert!(plan.is_empty());
        assert!(plan.tasks().is_empty());
    }

    #[test]
    fn test_one_cycle_is_four_legs_in_order() {
        let legs = swap_legs(1);
        assert_eq!(legs.len(), 4);
        let pairs: Vec<_> = legs
            .iter()
            .map(|l| (l.from_symbol, l.to_symbol))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("PHRS", "USDT"),
                ("USDT", "PHRS"),
                ("PHRS", "USDC"),
                ("USDC", "PHRS"),
            ]
        );
    }

    #[test]
    fn test_cycles_repeat_the_leg_table() {
        assert_eq!(swap_legs(3).len(), 12);
        assert!(swap_legs(0).is_empty());
    }
}

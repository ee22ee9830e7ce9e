//! Static rate-card cost models
//!
//! Prices a block of resources per month. Rates are list-price estimates,
//! not live cloud quotes.

mod cloud;
mod on_prem;

pub use cloud::{CloudCostModel, CloudProvider};
pub use on_prem::OnPremCostModel;

use crate::models::ResourceTotals;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hours in a month (for cost calculations)
pub const HOURS_PER_MONTH: f64 = 730.0;

/// Something that can price provisioned resources
pub trait CostModel: Send + Sync {
    /// Short identifier shown next to projected costs
    fn name(&self) -> &'static str;

    /// Monthly cost in USD of keeping `resources` provisioned
    fn monthly_cost(&self, resources: &ResourceTotals) -> f64;
}

/// Unit prices in USD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateCard {
    pub cpu_core_hourly: f64,
    pub ram_gb_hourly: f64,
    pub storage_gb_monthly: f64,
}

impl RateCard {
    pub const fn new(cpu_core_hourly: f64, ram_gb_hourly: f64, storage_gb_monthly: f64) -> Self {
        Self {
            cpu_core_hourly,
            ram_gb_hourly,
            storage_gb_monthly,
        }
    }

    /// Compute plus storage for one month, before any model-specific uplift
    pub fn price(&self, resources: &ResourceTotals) -> f64 {
        let cpu = resources.cpu_cores as f64 * self.cpu_core_hourly * HOURS_PER_MONTH;
        let ram = resources.ram_gb as f64 * self.ram_gb_hourly * HOURS_PER_MONTH;
        let storage = resources.storage_gb as f64 * self.storage_gb_monthly;
        cpu + ram + storage
    }
}

/// Cost model selectable from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostModelKind {
    #[default]
    OnPrem,
    Aws,
    Azure,
    Gcp,
}

impl CostModelKind {
    pub const ALL: [CostModelKind; 4] = [
        CostModelKind::OnPrem,
        CostModelKind::Aws,
        CostModelKind::Azure,
        CostModelKind::Gcp,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CostModelKind::OnPrem => "on_prem",
            CostModelKind::Aws => "aws",
            CostModelKind::Azure => "azure",
            CostModelKind::Gcp => "gcp",
        }
    }

    /// Build the list-price model for this kind
    pub fn build(&self) -> Box<dyn CostModel> {
        match self {
            CostModelKind::OnPrem => Box::new(OnPremCostModel::default()),
            CostModelKind::Aws => Box::new(CloudCostModel::new(CloudProvider::Aws)),
            CostModelKind::Azure => Box::new(CloudCostModel::new(CloudProvider::Azure)),
            CostModelKind::Gcp => Box::new(CloudCostModel::new(CloudProvider::Gcp)),
        }
    }
}

impl fmt::Display for CostModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CostModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        CostModelKind::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| format!("unknown cost model '{}'", s))
    }
}

/// Round cost to 2 decimal places.
pub fn round_cost(cost: f64) -> f64 {
    (cost * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_card_price() {
        let card = RateCard::new(0.01, 0.001, 0.1);
        let resources = ResourceTotals::new(10, 100, 1000);
        // 10 * 0.01 * 730 + 100 * 0.001 * 730 + 1000 * 0.1
        assert!((card.price(&resources) - 246.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_resources_cost_nothing() {
        for kind in CostModelKind::ALL {
            assert_eq!(kind.build().monthly_cost(&ResourceTotals::ZERO), 0.0, "{}", kind);
        }
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("AWS".parse::<CostModelKind>().unwrap(), CostModelKind::Aws);
        assert_eq!("on-prem".parse::<CostModelKind>().unwrap(), CostModelKind::OnPrem);
        assert!("oracle".parse::<CostModelKind>().is_err());
    }

    #[test]
    fn test_cost_grows_with_resources() {
        let small = ResourceTotals::new(16, 64, 200);
        let large = ResourceTotals::new(32, 128, 400);
        for kind in CostModelKind::ALL {
            let model = kind.build();
            assert!(model.monthly_cost(&large) > model.monthly_cost(&small));
        }
    }

    #[test]
    fn test_round_cost() {
        assert_eq!(round_cost(10.1234), 10.12);
        assert_eq!(round_cost(10.125), 10.13);
    }
}

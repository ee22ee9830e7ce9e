use super::{CostModel, RateCard};
use crate::models::ResourceTotals;
use serde::{Deserialize, Serialize};

/// Amortised hardware, per vCPU-hour and GB-hour, plus SAN storage per GB-month
const ON_PREM: RateCard = RateCard::new(0.0250, 0.0030, 0.05);

/// Owned hardware with a facility uplift for power, cooling and space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OnPremCostModel {
    pub rates: RateCard,
    pub facility_overhead_percent: f64,
}

impl Default for OnPremCostModel {
    fn default() -> Self {
        Self {
            rates: ON_PREM,
            facility_overhead_percent: 20.0,
        }
    }
}

impl CostModel for OnPremCostModel {
    fn name(&self) -> &'static str {
        "on_prem"
    }

    fn monthly_cost(&self, resources: &ResourceTotals) -> f64 {
        self.rates.price(resources) * (1.0 + self.facility_overhead_percent / 100.0)
    }
}

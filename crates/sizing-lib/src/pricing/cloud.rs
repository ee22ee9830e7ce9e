use super::{CostModel, RateCard};
use crate::models::ResourceTotals;
use serde::{Deserialize, Serialize};

// On-demand general purpose list prices, per vCPU-hour and GB-hour
const AWS: RateCard = RateCard::new(0.0416, 0.0052, 0.08); // m5, gp3
const AZURE: RateCard = RateCard::new(0.0400, 0.0050, 0.075); // D-series v5, Premium SSD v2
const GCP: RateCard = RateCard::new(0.0335, 0.0045, 0.085); // n2-standard, pd-balanced

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    Aws,
    Azure,
    Gcp,
}

impl CloudProvider {
    pub fn rate_card(&self) -> RateCard {
        match self {
            CloudProvider::Aws => AWS,
            CloudProvider::Azure => AZURE,
            CloudProvider::Gcp => GCP,
        }
    }
}

/// Public cloud on-demand list prices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloudCostModel {
    pub provider: CloudProvider,
    pub rates: RateCard,
}

impl CloudCostModel {
    pub fn new(provider: CloudProvider) -> Self {
        Self {
            provider,
            rates: provider.rate_card(),
        }
    }
}

impl CostModel for CloudCostModel {
    fn name(&self) -> &'static str {
        match self.provider {
            CloudProvider::Aws => "aws",
            CloudProvider::Azure => "azure",
            CloudProvider::Gcp => "gcp",
        }
    }

    fn monthly_cost(&self, resources: &ResourceTotals) -> f64 {
        self.rates.price(resources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::HOURS_PER_MONTH;

    #[test]
    fn test_list_price_per_dimension() {
        let aws = CloudCostModel::new(CloudProvider::Aws);
        let storage_only = aws.monthly_cost(&ResourceTotals::new(0, 0, 1000));
        assert!((storage_only - 80.0).abs() < 1e-9);

        let one_core = aws.monthly_cost(&ResourceTotals::new(1, 0, 0));
        assert!((one_core - 0.0416 * HOURS_PER_MONTH).abs() < 1e-9);
    }

    #[test]
    fn test_gcp_compute_is_cheapest_list_price() {
        let resources = ResourceTotals::new(64, 256, 0);
        let gcp = CloudCostModel::new(CloudProvider::Gcp).monthly_cost(&resources);
        let aws = CloudCostModel::new(CloudProvider::Aws).monthly_cost(&resources);
        assert!(gcp < aws);
    }
}

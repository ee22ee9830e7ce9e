//! Per-technology application footprints

use crate::models::{AppTier, Technology, TierSpecs};

/// Built-in footprint of one application instance.
///
/// Low-code runtimes (Mendix, OutSystems) carry a JVM/.NET host per app and
/// double the persistent storage of the general-purpose stacks.
pub fn builtin_tier_specs(technology: Technology, tier: AppTier) -> TierSpecs {
    use AppTier::*;
    use Technology::*;

    match (technology, tier) {
        (DotNet | NodeJs | Python, Small) => TierSpecs::new(0.25, 0.5, 5.0),
        (DotNet | NodeJs | Python, Medium) => TierSpecs::new(0.5, 1.0, 10.0),
        (DotNet | NodeJs | Python, Large) => TierSpecs::new(1.0, 2.0, 20.0),
        (DotNet | NodeJs | Python, XLarge) => TierSpecs::new(2.0, 4.0, 50.0),

        (Java, Small) => TierSpecs::new(0.5, 1.0, 5.0),
        (Java, Medium) => TierSpecs::new(1.0, 2.0, 10.0),
        (Java, Large) => TierSpecs::new(2.0, 4.0, 20.0),
        (Java, XLarge) => TierSpecs::new(4.0, 8.0, 50.0),

        (Go, Small) => TierSpecs::new(0.125, 0.25, 5.0),
        (Go, Medium) => TierSpecs::new(0.25, 0.5, 10.0),
        (Go, Large) => TierSpecs::new(0.5, 1.0, 20.0),
        (Go, XLarge) => TierSpecs::new(1.0, 2.0, 50.0),

        (Mendix, Small) => TierSpecs::new(0.5, 2.0, 10.0),
        (Mendix, Medium) => TierSpecs::new(1.0, 4.0, 20.0),
        (Mendix, Large) => TierSpecs::new(2.0, 8.0, 40.0),
        (Mendix, XLarge) => TierSpecs::new(4.0, 16.0, 100.0),

        (OutSystems, Small) => TierSpecs::new(1.0, 2.0, 10.0),
        (OutSystems, Medium) => TierSpecs::new(2.0, 4.0, 20.0),
        (OutSystems, Large) => TierSpecs::new(4.0, 8.0, 40.0),
        (OutSystems, XLarge) => TierSpecs::new(8.0, 16.0, 100.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_grow_monotonically() {
        for technology in Technology::ALL {
            let specs: Vec<TierSpecs> = AppTier::ALL
                .iter()
                .map(|tier| builtin_tier_specs(technology, *tier))
                .collect();
            for pair in specs.windows(2) {
                assert!(pair[1].cpu_cores > pair[0].cpu_cores, "{technology}");
                assert!(pair[1].ram_gb > pair[0].ram_gb, "{technology}");
            }
        }
    }

    #[test]
    fn test_low_code_is_heavier() {
        let dotnet = builtin_tier_specs(Technology::DotNet, AppTier::Medium);
        let mendix = builtin_tier_specs(Technology::Mendix, AppTier::Medium);
        assert!(mendix.ram_gb > dotnet.ram_gb);
        assert!(mendix.storage_gb > dotnet.storage_gb);
    }
}

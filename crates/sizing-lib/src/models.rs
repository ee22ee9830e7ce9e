//! Core data models shared by the sizing engines

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Application technology stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Technology {
    DotNet,
    Java,
    NodeJs,
    Python,
    Go,
    Mendix,
    OutSystems,
}

impl Technology {
    pub const ALL: [Technology; 7] = [
        Technology::DotNet,
        Technology::Java,
        Technology::NodeJs,
        Technology::Python,
        Technology::Go,
        Technology::Mendix,
        Technology::OutSystems,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Technology::DotNet => ".NET",
            Technology::Java => "Java",
            Technology::NodeJs => "Node.js",
            Technology::Python => "Python",
            Technology::Go => "Go",
            Technology::Mendix => "Mendix",
            Technology::OutSystems => "OutSystems",
        }
    }

    /// Low-code platforms ship a heavier runtime per application
    pub fn is_low_code(&self) -> bool {
        matches!(self, Technology::Mendix | Technology::OutSystems)
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Application size classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppTier {
    Small,
    Medium,
    Large,
    XLarge,
}

impl AppTier {
    pub const ALL: [AppTier; 4] = [AppTier::Small, AppTier::Medium, AppTier::Large, AppTier::XLarge];

    pub fn name(&self) -> &'static str {
        match self {
            AppTier::Small => "Small",
            AppTier::Medium => "Medium",
            AppTier::Large => "Large",
            AppTier::XLarge => "XLarge",
        }
    }
}

impl fmt::Display for AppTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentType {
    Dev,
    Test,
    Stage,
    Prod,
}

impl EnvironmentType {
    /// Canonical ordering used for result rows
    pub const ALL: [EnvironmentType; 4] = [
        EnvironmentType::Dev,
        EnvironmentType::Test,
        EnvironmentType::Stage,
        EnvironmentType::Prod,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EnvironmentType::Dev => "dev",
            EnvironmentType::Test => "test",
            EnvironmentType::Stage => "stage",
            EnvironmentType::Prod => "prod",
        }
    }

    /// Only the production environment draws on the prod app pool and settings
    pub fn is_production(&self) -> bool {
        matches!(self, EnvironmentType::Prod)
    }
}

impl fmt::Display for EnvironmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Number of applications per size tier for one pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub small: u32,
    pub medium: u32,
    pub large: u32,
    pub xlarge: u32,
}

impl AppConfig {
    pub fn new(small: u32, medium: u32, large: u32, xlarge: u32) -> Self {
        Self { small, medium, large, xlarge }
    }

    pub fn count(&self, tier: AppTier) -> u32 {
        match tier {
            AppTier::Small => self.small,
            AppTier::Medium => self.medium,
            AppTier::Large => self.large,
            AppTier::XLarge => self.xlarge,
        }
    }

    /// Apps across all tiers, saturating at `u32::MAX`
    pub fn total(&self) -> u32 {
        self.small
            .saturating_add(self.medium)
            .saturating_add(self.large)
            .saturating_add(self.xlarge)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Scale every tier by `factor`, rounding each tier to the nearest app
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |n: u32| (n as f64 * factor).round().max(0.0) as u32;
        Self {
            small: scale(self.small),
            medium: scale(self.medium),
            large: scale(self.large),
            xlarge: scale(self.xlarge),
        }
    }
}

impl Add for AppConfig {
    type Output = AppConfig;

    fn add(self, rhs: AppConfig) -> AppConfig {
        AppConfig {
            small: self.small.saturating_add(rhs.small),
            medium: self.medium.saturating_add(rhs.medium),
            large: self.large.saturating_add(rhs.large),
            xlarge: self.xlarge.saturating_add(rhs.xlarge),
        }
    }
}

/// Resources needed by one application instance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierSpecs {
    pub cpu_cores: f64,
    pub ram_gb: f64,
    pub storage_gb: f64,
}

impl TierSpecs {
    pub const fn new(cpu_cores: f64, ram_gb: f64, storage_gb: f64) -> Self {
        Self { cpu_cores, ram_gb, storage_gb }
    }
}

/// Capacity of a single cluster node or VM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpecs {
    pub cpu_cores: u32,
    pub ram_gb: u32,
    pub storage_gb: u32,
}

impl NodeSpecs {
    pub const fn new(cpu_cores: u32, ram_gb: u32, storage_gb: u32) -> Self {
        Self { cpu_cores, ram_gb, storage_gb }
    }

    /// Resources of `count` identical nodes
    pub fn times(&self, count: u32) -> ResourceTotals {
        ResourceTotals {
            cpu_cores: self.cpu_cores as u64 * count as u64,
            ram_gb: self.ram_gb as u64 * count as u64,
            storage_gb: self.storage_gb as u64 * count as u64,
        }
    }
}

/// Tolerance for float noise before rounding up (e.g. 100 * 1.1)
const CEIL_EPSILON: f64 = 1e-9;

/// Round a non-negative quantity up to whole units, ignoring float noise
pub fn ceil_whole(value: f64) -> u64 {
    if value <= 0.0 {
        return 0;
    }
    (value - CEIL_EPSILON).ceil() as u64
}

/// [`ceil_whole`] for node and VM counts, saturating at `u32::MAX`
pub fn ceil_count(value: f64) -> u32 {
    u32::try_from(ceil_whole(value)).unwrap_or(u32::MAX)
}

/// Whole-unit resource totals reported by the engines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTotals {
    pub cpu_cores: u64,
    pub ram_gb: u64,
    pub storage_gb: u64,
}

impl ResourceTotals {
    pub const ZERO: ResourceTotals = ResourceTotals { cpu_cores: 0, ram_gb: 0, storage_gb: 0 };

    pub fn new(cpu_cores: u64, ram_gb: u64, storage_gb: u64) -> Self {
        Self { cpu_cores, ram_gb, storage_gb }
    }

    /// Multiply every dimension by `factor`, rounding up to whole units
    pub fn scaled_ceil(&self, factor: f64) -> Self {
        let scale = |v: u64| ceil_whole(v as f64 * factor);
        Self {
            cpu_cores: scale(self.cpu_cores),
            ram_gb: scale(self.ram_gb),
            storage_gb: scale(self.storage_gb),
        }
    }
}

impl Add for ResourceTotals {
    type Output = ResourceTotals;

    fn add(self, rhs: ResourceTotals) -> ResourceTotals {
        ResourceTotals {
            cpu_cores: self.cpu_cores.saturating_add(rhs.cpu_cores),
            ram_gb: self.ram_gb.saturating_add(rhs.ram_gb),
            storage_gb: self.storage_gb.saturating_add(rhs.storage_gb),
        }
    }
}

impl Sum for ResourceTotals {
    fn sum<I: Iterator<Item = ResourceTotals>>(iter: I) -> Self {
        iter.fold(ResourceTotals::ZERO, Add::add)
    }
}

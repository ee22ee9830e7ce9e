//! Infrastructure sizing library
//!
//! This crate provides the core functionality for:
//! - Tier, distribution and role resource tables
//! - HA/DR cost multipliers
//! - Kubernetes and VM sizing
//! - Multi-year growth projection with static cost models
//! - Input validation and observability

pub mod catalog;
pub mod error;
pub mod growth;
pub mod hadr;
pub mod k8s;
pub mod models;
pub mod observability;
pub mod pricing;
pub mod validation;
pub mod vm;

pub use catalog::{CatalogOverrides, Distribution, LoadBalancerOption, ServerRole, SizingCatalog};
pub use error::{Result, SizingError};
pub use growth::{project_growth, GrowthBaseline, GrowthProjection, GrowthRequest, GrowthSettings};
pub use hadr::K8sHaDrConfig;
pub use k8s::{calculate_k8s, K8sSizingInput, K8sSizingResult};
pub use models::*;
pub use observability::{CalculationKind, SizingMetrics, StructuredLogger};
pub use pricing::{CostModel, CostModelKind};
pub use vm::{calculate_vm, VmSizingInput, VmSizingResult};

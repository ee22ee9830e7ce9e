//! Subcommand implementations
//!
//! Every command runs either against the in-process engines or against a
//! remote sizing service; both paths validate before calculating.

pub mod growth;
pub mod k8s;
pub mod preview;
pub mod vm;

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use sizing_lib::{
    calculate_k8s, calculate_vm, project_growth, validation, GrowthProjection,
    GrowthRequest, K8sSizingInput, K8sSizingResult, SizingCatalog, VmSizingInput, VmSizingResult,
};
use tracing::debug;

use crate::client::ApiClient;

/// Where calculations run
pub enum Backend {
    Local { catalog: SizingCatalog },
    Remote(ApiClient),
}

impl Backend {
    pub async fn k8s(&self, input: &K8sSizingInput) -> Result<K8sSizingResult> {
        match self {
            Backend::Local { catalog } => {
                validation::validate_k8s_input(catalog, input)?;
                Ok(calculate_k8s(catalog, input)?)
            }
            Backend::Remote(client) => client.post("api/v1/k8s/calculate", input).await,
        }
    }

    pub async fn vm(&self, input: &VmSizingInput) -> Result<VmSizingResult> {
        match self {
            Backend::Local { catalog } => {
                validation::validate_vm_input(input)?;
                Ok(calculate_vm(catalog, input)?)
            }
            Backend::Remote(client) => client.post("api/v1/vm/calculate", input).await,
        }
    }

    pub async fn growth(&self, request: &GrowthRequest) -> Result<GrowthProjection> {
        match self {
            Backend::Local { catalog } => {
                validation::validate_growth_request(catalog, request)?;
                let model = request.cost_model.unwrap_or_default().build();
                debug!(cost_model = model.name(), "Projecting growth locally");
                Ok(project_growth(
                    catalog,
                    &request.baseline,
                    &request.settings,
                    model.as_ref(),
                )?)
            }
            Backend::Remote(client) => client.post("api/v1/growth/project", request).await,
        }
    }
}

/// Parse a library enum from its wire name, for clap `value_parser`s
pub fn parse_enum<T: DeserializeOwned>(value: &str) -> Result<T, String> {
    let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
    serde_json::from_value(serde_json::Value::String(normalized))
        .map_err(|_| format!("unknown value '{}'", value))
}

/// Wire name of a library enum, for query strings
pub fn wire_name<T: Serialize>(value: &T) -> Result<String> {
    match serde_json::to_value(value)? {
        serde_json::Value::String(name) => Ok(name),
        other => anyhow::bail!("expected a string value, got {}", other),
    }
}

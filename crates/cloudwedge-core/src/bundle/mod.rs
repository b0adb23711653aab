//! Owner bundles.
//!
//! Alarms and dashboards deploy per owner: one bundle per distinct owner
//! value observed across all services in a run, so one team's redeploy
//! never touches another team's stack. Bundles are recomputed from scratch
//! every run; idempotency is the deployment collaborator's job (it upserts
//! by name).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::alarm::{self, AlarmSpec};
use crate::config::EngineConfig;
use crate::dashboard::{self, Widget};
use crate::resource::ResourcesByService;
use crate::service::ServiceRegistry;
use crate::tags::DEFAULT_OWNER;

/// Resources regrouped by owner, then by service.
pub type OwnerResources = BTreeMap<String, ResourcesByService>;

/// Everything synthesized for one owner in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerArtifactBundle {
    /// Lowercased owner grouping key.
    pub owner: String,

    /// Alarm definitions keyed by logical id.
    pub alarms: BTreeMap<String, AlarmSpec>,

    /// The owner's dashboard, in layout order.
    pub dashboard_widgets: Vec<Widget>,
}

impl OwnerArtifactBundle {
    /// Whether the bundle carries anything worth deploying.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty() && self.dashboard_widgets.is_empty()
    }
}

/// Regroup a discovery snapshot by owner.
///
/// Owner comparison is case-insensitive; the lowercased value becomes the
/// grouping key. Resources without a resolved owner land under the default
/// owner constant (discovery normally fills that in already).
#[must_use]
pub fn group_by_owner(resources: &ResourcesByService) -> OwnerResources {
    let mut owners: OwnerResources = BTreeMap::new();

    for (kind, service_resources) in resources {
        for resource in service_resources {
            let owner = if resource.owner.is_empty() {
                DEFAULT_OWNER.to_string()
            } else {
                resource.owner.to_lowercase()
            };

            owners
                .entry(owner)
                .or_default()
                .entry(*kind)
                .or_default()
                .push(resource.clone());
        }
    }

    owners
}

/// Compile one owner's bundle: every alarm for every resource of every
/// service the owner has, plus the owner dashboard.
///
/// A resource that fails to compile is dropped with a warning; it must not
/// take the rest of the owner's bundle with it. A duplicate logical id
/// across distinct resources would mean the identity hash broke; the first
/// compilation wins and the collision is reported loudly.
#[must_use]
pub fn compile_owner(
    config: &EngineConfig,
    owner: &str,
    services: &ResourcesByService,
) -> OwnerArtifactBundle {
    let mut alarms: BTreeMap<String, AlarmSpec> = BTreeMap::new();

    for (kind, resources) in services {
        let profile = ServiceRegistry::get(*kind);

        for resource in resources {
            let compiled = match alarm::compile_resource(config, profile, resource) {
                Ok(compiled) => compiled,
                Err(err) => {
                    warn!(
                        owner,
                        resource = %resource.unique_id,
                        %err,
                        "skipping resource, alarm compilation failed"
                    );
                    continue;
                },
            };

            for (logical_id, spec) in compiled {
                if alarms.contains_key(&logical_id) {
                    error!(
                        owner,
                        logical_id,
                        resource = %resource.unique_id,
                        "logical id collision across resources, keeping first"
                    );
                    continue;
                }
                alarms.insert(logical_id, spec);
            }
        }
    }

    OwnerArtifactBundle {
        owner: owner.to_string(),
        alarms,
        dashboard_widgets: dashboard::owner_widgets(config, owner, services),
    }
}

/// Compile the whole run: regroup by owner, one bundle per owner.
#[must_use]
pub fn compile_run(config: &EngineConfig, resources: &ResourcesByService) -> Vec<OwnerArtifactBundle> {
    group_by_owner(resources)
        .iter()
        .map(|(owner, services)| compile_owner(config, owner, services))
        .collect()
}

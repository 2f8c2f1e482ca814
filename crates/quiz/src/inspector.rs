//! Reads the live state of the quiz Deployment.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use kube::{Api, Client};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::LookupError;

/// Replica count Kubernetes assumes when the spec omits one.
const DEFAULT_REPLICAS: i32 = 1;

/// The fields of a Deployment the quiz checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeploymentSnapshot {
    pub replicas: i32,
    /// Raw CPU request quantity of the first container.
    pub cpu_request: Option<String>,
    /// Raw memory request quantity of the first container.
    pub memory_request: Option<String>,
    pub labels: BTreeMap<String, String>,
}

impl DeploymentSnapshot {
    /// Reduce a Deployment object to the checked fields.
    pub fn from_deployment(deployment: &Deployment) -> Self {
        let spec = deployment.spec.as_ref();
        let replicas = spec.and_then(|s| s.replicas).unwrap_or(DEFAULT_REPLICAS);

        let requests = spec
            .and_then(|s| s.template.spec.as_ref())
            .and_then(|pod| pod.containers.first())
            .and_then(|c| c.resources.as_ref())
            .and_then(|r| r.requests.as_ref());

        let request = |name: &str| requests.and_then(|r| r.get(name)).map(|q| q.0.clone());

        Self {
            replicas,
            cpu_request: request("cpu"),
            memory_request: request("memory"),
            labels: deployment.metadata.labels.clone().unwrap_or_default(),
        }
    }
}

/// Fetches a Deployment snapshot by name and namespace.
#[async_trait]
pub trait DeploymentInspector: Send + Sync {
    async fn snapshot(&self, name: &str, namespace: &str)
        -> Result<DeploymentSnapshot, LookupError>;
}

/// Inspector backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeInspector {
    client: Client,
    timeout: Duration,
}

impl KubeInspector {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

/// Classify a failed Deployment read.
pub(crate) fn map_lookup_error(err: kube::Error, name: &str, namespace: &str) -> LookupError {
    match err {
        kube::Error::Api(ae) if ae.code == 404 => LookupError::NotFound {
            name: name.to_string(),
            namespace: namespace.to_string(),
        },
        kube::Error::Api(ae) if ae.code == 403 => LookupError::Forbidden {
            name: name.to_string(),
            namespace: namespace.to_string(),
        },
        e => LookupError::Api(e.to_string()),
    }
}

#[async_trait]
impl DeploymentInspector for KubeInspector {
    async fn snapshot(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<DeploymentSnapshot, LookupError> {
        let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);

        let result = tokio::time::timeout(self.timeout, deployments.get(name))
            .await
            .map_err(|_| {
                warn!(deployment = %name, namespace = %namespace, "Deployment lookup timed out");
                LookupError::Timeout(self.timeout)
            })?;

        match result {
            Ok(deployment) => {
                let snapshot = DeploymentSnapshot::from_deployment(&deployment);
                debug!(
                    deployment = %name,
                    namespace = %namespace,
                    replicas = snapshot.replicas,
                    cpu_request = ?snapshot.cpu_request,
                    memory_request = ?snapshot.memory_request,
                    "Read deployment"
                );
                Ok(snapshot)
            }
            Err(e) => Err(map_lookup_error(e, name, namespace)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::apps::v1::DeploymentSpec;
    use k8s_openapi::api::core::v1::{Container, PodSpec, PodTemplateSpec, ResourceRequirements};
    use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use kube::core::ErrorResponse;

    fn api_error(code: u16, reason: &str) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: format!("deployments.apps \"k8s-deployment-quiz\" {reason}"),
            reason: reason.to_string(),
            code,
        })
    }

    fn deployment(replicas: Option<i32>, requests: &[(&str, &str)]) -> Deployment {
        let requests: BTreeMap<String, Quantity> = requests
            .iter()
            .map(|(k, v)| ((*k).to_string(), Quantity((*v).to_string())))
            .collect();

        Deployment {
            metadata: ObjectMeta {
                name: Some("k8s-deployment-quiz".to_string()),
                labels: Some(BTreeMap::from([("app".to_string(), "quiz".to_string())])),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                replicas,
                template: PodTemplateSpec {
                    spec: Some(PodSpec {
                        containers: vec![
                            Container {
                                name: "quiz".to_string(),
                                resources: Some(ResourceRequirements {
                                    requests: Some(requests),
                                    ..Default::default()
                                }),
                                ..Default::default()
                            },
                            Container {
                                name: "sidecar".to_string(),
                                ..Default::default()
                            },
                        ],
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_snapshot_reads_first_container() {
        let d = deployment(Some(2), &[("cpu", "250m"), ("memory", "512Mi")]);
        let snapshot = DeploymentSnapshot::from_deployment(&d);
        assert_eq!(snapshot.replicas, 2);
        assert_eq!(snapshot.cpu_request.as_deref(), Some("250m"));
        assert_eq!(snapshot.memory_request.as_deref(), Some("512Mi"));
        assert_eq!(snapshot.labels.get("app").map(String::as_str), Some("quiz"));
    }

    #[test]
    fn test_snapshot_keeps_raw_quantities() {
        let d = deployment(Some(1), &[("cpu", "0.25"), ("memory", "1Gi")]);
        let snapshot = DeploymentSnapshot::from_deployment(&d);
        assert_eq!(snapshot.cpu_request.as_deref(), Some("0.25"));
        assert_eq!(snapshot.memory_request.as_deref(), Some("1Gi"));
    }

    #[test]
    fn test_snapshot_defaults() {
        let d = deployment(None, &[]);
        let snapshot = DeploymentSnapshot::from_deployment(&d);
        assert_eq!(snapshot.replicas, DEFAULT_REPLICAS);
        assert!(snapshot.cpu_request.is_none());
        assert!(snapshot.memory_request.is_none());

        let empty = DeploymentSnapshot::from_deployment(&Deployment::default());
        assert_eq!(
            empty,
            DeploymentSnapshot {
                replicas: DEFAULT_REPLICAS,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_not_found_is_classified() {
        let err = map_lookup_error(api_error(404, "NotFound"), "k8s-deployment-quiz", "team-a");
        assert!(matches!(
            err,
            LookupError::NotFound { ref name, ref namespace }
                if name == "k8s-deployment-quiz" && namespace == "team-a"
        ));
    }

    #[test]
    fn test_forbidden_is_classified() {
        let err = map_lookup_error(api_error(403, "Forbidden"), "k8s-deployment-quiz", "team-a");
        assert!(matches!(err, LookupError::Forbidden { .. }));
    }

    #[test]
    fn test_other_api_errors_pass_through() {
        let err = map_lookup_error(
            api_error(500, "InternalError"),
            "k8s-deployment-quiz",
            "team-a",
        );
        assert!(matches!(err, LookupError::Api(ref msg) if msg.contains("InternalError")));
    }
}

use crate::constants::{
    AUTH_DELEGATOR_ROLE, AUTH_READER_ROLE, CUSTOM_METRICS_API_GROUP, EXTERNAL_METRICS_API_GROUP,
    HPA_SERVICE_ACCOUNT, KUBE_SYSTEM_NAMESPACE, METRICS_ADAPTER_NAME, METRICS_ADAPTER_NAMESPACE,
    RBAC_API_GROUP,
};
use crate::error::{self, Result};
use k8s_openapi::api::core::v1::{Namespace, ServiceAccount};
use k8s_openapi::api::rbac::v1::{
    ClusterRole, ClusterRoleBinding, PolicyRule, RoleBinding, RoleRef, Subject,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use maplit::btreemap;
use serde::Serialize;
use snafu::ResultExt;

/// A custom-metrics adapter that serves the `custom.metrics.k8s.io` and `external.metrics.k8s.io`
/// APIs (e.g. from CloudWatch) so that horizontal pod autoscalers can scale on queue depth.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MetricsAdapter {
    pub name: String,
    pub namespace: String,
}

impl Default for MetricsAdapter {
    fn default() -> Self {
        Self::new(METRICS_ADAPTER_NAME, METRICS_ADAPTER_NAMESPACE)
    }
}

/// Any of the objects declared for the metrics adapter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RbacObject {
    Namespace(Namespace),
    ServiceAccount(ServiceAccount),
    ClusterRole(ClusterRole),
    ClusterRoleBinding(ClusterRoleBinding),
    RoleBinding(RoleBinding),
}

impl MetricsAdapter {
    pub fn new<S1, S2>(name: S1, namespace: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    fn reader_role_name(&self) -> String {
        format!("{}:metrics-reader", self.name)
    }

    fn subject(&self) -> Subject {
        Subject {
            kind: "ServiceAccount".to_string(),
            name: self.name.clone(),
            namespace: Some(self.namespace.clone()),
            ..Default::default()
        }
    }

    /// Defines the namespace the adapter runs in.
    pub fn namespace(&self) -> Namespace {
        Namespace {
            metadata: ObjectMeta {
                name: Some(self.namespace.clone()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Defines the adapter's service account.
    pub fn service_account(&self) -> ServiceAccount {
        ServiceAccount {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(self.namespace.clone()),
                annotations: Some(btreemap! {
                    "kubernetes.io/service-account.name".to_string() => self.name.clone()
                }),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Defines the cluster role that can read custom and external metrics.
    pub fn metrics_reader_cluster_role(&self) -> ClusterRole {
        ClusterRole {
            metadata: ObjectMeta {
                name: Some(self.reader_role_name()),
                ..Default::default()
            },
            rules: Some(vec![PolicyRule {
                api_groups: Some(vec![
                    CUSTOM_METRICS_API_GROUP.to_string(),
                    EXTERNAL_METRICS_API_GROUP.to_string(),
                ]),
                resources: Some(vec!["*".to_string()]),
                verbs: vec!["get", "list", "watch"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                ..Default::default()
            }]),
            ..Default::default()
        }
    }

    /// Lets the horizontal pod autoscaler controller read the metrics the adapter serves.
    pub fn hpa_cluster_role_binding(&self) -> ClusterRoleBinding {
        ClusterRoleBinding {
            metadata: ObjectMeta {
                name: Some(format!("{}:hpa-metrics-reader", self.name)),
                ..Default::default()
            },
            role_ref: RoleRef {
                kind: "ClusterRole".to_string(),
                name: self.reader_role_name(),
                api_group: RBAC_API_GROUP.to_string(),
            },
            subjects: Some(vec![Subject {
                kind: "ServiceAccount".to_string(),
                name: HPA_SERVICE_ACCOUNT.to_string(),
                namespace: Some(KUBE_SYSTEM_NAMESPACE.to_string()),
                ..Default::default()
            }]),
        }
    }

    /// Lets the adapter delegate authentication and authorization decisions to the API server.
    pub fn auth_delegator_cluster_role_binding(&self) -> ClusterRoleBinding {
        ClusterRoleBinding {
            metadata: ObjectMeta {
                name: Some(format!("{}:{}", self.name, AUTH_DELEGATOR_ROLE)),
                ..Default::default()
            },
            role_ref: RoleRef {
                kind: "ClusterRole".to_string(),
                name: AUTH_DELEGATOR_ROLE.to_string(),
                api_group: RBAC_API_GROUP.to_string(),
            },
            subjects: Some(vec![self.subject()]),
        }
    }

    /// Lets the adapter read the extension API server authentication config map.
    pub fn auth_reader_role_binding(&self) -> RoleBinding {
        RoleBinding {
            metadata: ObjectMeta {
                name: Some(format!("{}-auth-reader", self.name)),
                namespace: Some(KUBE_SYSTEM_NAMESPACE.to_string()),
                ..Default::default()
            },
            role_ref: RoleRef {
                kind: "Role".to_string(),
                name: AUTH_READER_ROLE.to_string(),
                api_group: RBAC_API_GROUP.to_string(),
            },
            subjects: Some(vec![self.subject()]),
        }
    }

    /// All objects, in the order they should be applied.
    pub fn objects(&self) -> Vec<RbacObject> {
        vec![
            RbacObject::Namespace(self.namespace()),
            RbacObject::ServiceAccount(self.service_account()),
            RbacObject::ClusterRole(self.metrics_reader_cluster_role()),
            RbacObject::ClusterRoleBinding(self.hpa_cluster_role_binding()),
            RbacObject::ClusterRoleBinding(self.auth_delegator_cluster_role_binding()),
            RbacObject::RoleBinding(self.auth_reader_role_binding()),
        ]
    }

    /// All objects as a multi-document YAML stream.
    pub fn to_yaml(&self) -> Result<String> {
        let mut yaml = String::new();
        for object in self.objects() {
            let document = serde_yaml::to_string(&object).context(error::YamlSerializationSnafu {
                what: "metrics adapter RBAC",
            })?;
            if !document.starts_with("---") {
                yaml.push_str("---\n");
            }
            yaml.push_str(&document);
        }
        Ok(yaml)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bindings_reference_adapter_account() {
        let adapter = MetricsAdapter::default();
        let binding = adapter.auth_delegator_cluster_role_binding();
        assert_eq!(binding.role_ref.name, "system:auth-delegator");
        let subject = &binding.subjects.unwrap()[0];
        assert_eq!(subject.name, "k8s-cloudwatch-adapter");
        assert_eq!(subject.namespace.as_deref(), Some("custom-metrics"));

        let reader = adapter.auth_reader_role_binding();
        assert_eq!(reader.metadata.namespace.as_deref(), Some("kube-system"));
        assert_eq!(reader.role_ref.kind, "Role");
    }

    #[test]
    fn hpa_can_read_metrics() {
        let adapter = MetricsAdapter::new("adapter", "metrics");
        let role = adapter.metrics_reader_cluster_role();
        let binding = adapter.hpa_cluster_role_binding();
        assert_eq!(role.metadata.name, Some(binding.role_ref.name.clone()));
        let rule = &role.rules.unwrap()[0];
        assert!(rule
            .api_groups
            .as_ref()
            .unwrap()
            .contains(&"external.metrics.k8s.io".to_string()));
        assert_eq!(binding.subjects.unwrap()[0].name, "horizontal-pod-autoscaler");
    }

    #[test]
    fn yaml_stream() {
        let yaml = MetricsAdapter::default().to_yaml().unwrap();
        assert_eq!(yaml.matches("kind: ClusterRoleBinding").count(), 2);
        assert_eq!(yaml.matches("kind: RoleBinding").count(), 1);
        assert!(yaml.contains("apiVersion: rbac.authorization.k8s.io/v1"));
        assert!(yaml.contains("name: custom-metrics"));
    }
}

/// Helper macro to build the well-known Kubernetes tag keys that cluster-autoscaling and
/// ingress-controller components use to discover subnets. When given no parameters this returns
/// the base domain, when given a string literal it adds `/parameter` to the end.
macro_rules! k8s_io {
    () => {
        "kubernetes.io"
    };
    ($s:literal) => {
        concat!(k8s_io!(), "/", $s)
    };
}

// Subnet discovery tags
pub const CLUSTER_TAG_PREFIX: &str = k8s_io!("cluster/");
pub const CLUSTER_TAG_OWNED: &str = "owned";
pub const ROLE_ELB_TAG: &str = k8s_io!("role/elb");
pub const ROLE_INTERNAL_ELB_TAG: &str = k8s_io!("role/internal-elb");
pub const ROLE_TAG_VALUE: &str = "1";
pub const NAME_TAG: &str = "Name";

// Cidr constraints for a VPC and its subnets
pub const VPC_MIN_PREFIX_LEN: u8 = 16;
pub const VPC_MAX_PREFIX_LEN: u8 = 28;
pub const SUBNET_MAX_PREFIX_LEN: u8 = 28;

// Access rules
pub const HTTPS_PORT: u16 = 443;
pub const VPC_HTTPS_INGRESS_RULE: &str = "clusternet/vpc-https-ingress";

// Endpoint service names are `com.amazonaws.<region>.<service>`
pub const AWS_SERVICE_PREFIX: &str = "com.amazonaws";

// Metrics adapter RBAC
pub const METRICS_ADAPTER_NAME: &str = "k8s-cloudwatch-adapter";
pub const METRICS_ADAPTER_NAMESPACE: &str = "custom-metrics";
pub const KUBE_SYSTEM_NAMESPACE: &str = "kube-system";
pub const HPA_SERVICE_ACCOUNT: &str = "horizontal-pod-autoscaler";
pub const AUTH_DELEGATOR_ROLE: &str = "system:auth-delegator";
pub const AUTH_READER_ROLE: &str = "extension-apiserver-authentication-reader";
pub const CUSTOM_METRICS_API_GROUP: &str = "custom.metrics.k8s.io";
pub const EXTERNAL_METRICS_API_GROUP: &str = "external.metrics.k8s.io";
pub const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";

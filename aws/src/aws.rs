use crate::constants::{
    DEFAULT_ASSUME_ROLE_SESSION_DURATION, DEFAULT_REGION, MAX_ATTEMPTS, SESSION_NAME,
};
use aws_config::default_provider::credentials::default_provider;
use aws_config::sts::AssumeRoleProvider;
use aws_config::retry::RetryConfig;
use aws_smithy_types::retry::RetryMode;
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_types::region::Region;
use aws_types::SdkConfig;
use log::info;
use std::time::Duration;

/// Set up the config for aws calls in `region` (or `DEFAULT_REGION`), assuming `assume_role` with
/// `sts::assume_role` if a role arn is provided.
pub async fn aws_config(
    assume_role: &Option<String>,
    assume_role_session_duration: &Option<i32>,
    region: &Option<String>,
) -> SdkConfig {
    let region = region
        .as_ref()
        .unwrap_or(&DEFAULT_REGION.to_string())
        .to_string();
    info!(
        "Creating a custom region provider for '{}' to be used in the aws config.",
        region
    );

    let config_loader = aws_config::from_env().retry_config(
        RetryConfig::standard()
            .with_retry_mode(RetryMode::Adaptive)
            .with_max_attempts(MAX_ATTEMPTS),
    );
    let base_provider = SharedCredentialsProvider::new(default_provider().await);

    let config_loader = match assume_role {
        Some(role_arn) => {
            info!("Assuming role '{}' for aws calls.", role_arn);
            config_loader.credentials_provider(SharedCredentialsProvider::new(
                AssumeRoleProvider::builder(role_arn)
                    .region(Region::new(region.clone()))
                    .session_name(SESSION_NAME)
                    .session_length(Duration::from_secs(
                        assume_role_session_duration
                            .unwrap_or(DEFAULT_ASSUME_ROLE_SESSION_DURATION)
                            as u64,
                    ))
                    .build(base_provider.clone()),
            ))
        }
        None => config_loader.credentials_provider(base_provider),
    };

    config_loader.region(Region::new(region)).load().await
}

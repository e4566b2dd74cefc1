use async_trait::async_trait;
use reqwest::Response;
use shared::{
    domain::GroupingResult,
    protocol::{GroupingPhrasesInput, HealthStatus, GROUP_PHRASES_ROUTE, HEALTH_CHECK_ROUTE},
};

use crate::{error::ClientError, transport::Transport};

/// Posts `phrases` to the grouping route once. The reply is returned undecoded.
pub async fn request_group_phrases(
    transport: &Transport,
    phrases: &[String],
) -> Result<Response, ClientError> {
    transport
        .post_json(GROUP_PHRASES_ROUTE, &GroupingPhrasesInput::new(phrases))
        .await
}

pub async fn decode_grouping_result(response: Response) -> Result<GroupingResult, ClientError> {
    Ok(response.json::<GroupingResult>().await?)
}

pub async fn request_health_check(transport: &Transport) -> Result<HealthStatus, ClientError> {
    let response = transport.get(HEALTH_CHECK_ROUTE).await?;
    Ok(response.json::<HealthStatus>().await?)
}

/// Whatever can turn a list of phrases into groups; the store only sees this.
#[async_trait]
pub trait GroupingBackend: Send + Sync {
    async fn group_phrases(&self, phrases: &[String]) -> Result<GroupingResult, ClientError>;
}

#[async_trait]
impl GroupingBackend for Transport {
    async fn group_phrases(&self, phrases: &[String]) -> Result<GroupingResult, ClientError> {
        let response = request_group_phrases(self, phrases).await?;
        decode_grouping_result(response).await
    }
}

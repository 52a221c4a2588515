use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body for `POST /consumers/{group}`. The proxy expects its dotted Java
/// property names and stringly-typed booleans.
#[derive(Debug, Serialize)]
pub(crate) struct CreateConsumerRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    pub format: &'a str,
    #[serde(rename = "auto.offset.reset")]
    pub auto_offset_reset: &'a str,
    #[serde(rename = "auto.commit.enable")]
    pub auto_commit_enable: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct CreateConsumerResponse {
    pub instance_id: String,
    pub base_uri: String,
}

/// One record from `GET .../records` in the JSON embedded format.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsumerRecord {
    pub topic: String,
    #[serde(default)]
    pub key: Option<Value>,
    pub value: Value,
    pub partition: i32,
    pub offset: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProxyErrorBody {
    pub error_code: i32,
    pub message: String,
}

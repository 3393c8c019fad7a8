use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Subscriber {
    #[serde(rename = "userId")]
    pub user_id: String,
}

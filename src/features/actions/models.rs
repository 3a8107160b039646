use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateActionInput {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
}

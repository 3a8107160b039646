use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateResourceInput {
    pub name: String,
}

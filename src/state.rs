use crate::{cart::CartStore, db::DbPool, llm::LlmClient, uploads::UploadSigner};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub carts: CartStore,
    /// None when no model API key is configured; search then runs local-only.
    pub llm: Option<LlmClient>,
    pub uploads: UploadSigner,
}

//! Model Credential Command Handlers

use std::sync::Arc;

use crate::application::commands::SaveModel;
use crate::application::error::ApplicationError;
use crate::application::ports::{CredentialRepositoryPort, ModelCredential, ModelKind};

/// 保存结果，不回显 api_key
#[derive(Debug, Clone)]
pub struct SaveModelResponse {
    pub kind: ModelKind,
    pub base_url: String,
    pub model_name: String,
}

/// SaveModel Handler - 同一用户同一类型的凭据覆盖保存
pub struct SaveModelHandler {
    credential_repo: Arc<dyn CredentialRepositoryPort>,
}

impl SaveModelHandler {
    pub fn new(credential_repo: Arc<dyn CredentialRepositoryPort>) -> Self {
        Self { credential_repo }
    }

    pub async fn handle(&self, command: SaveModel) -> Result<SaveModelResponse, ApplicationError> {
        let base_url = command.base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApplicationError::validation(
                "base_url must start with http:// or https://",
            ));
        }
        if command.api_key.trim().is_empty() {
            return Err(ApplicationError::validation("api_key must not be empty"));
        }
        if command.model_name.trim().is_empty() {
            return Err(ApplicationError::validation("model_name must not be empty"));
        }

        let credential = ModelCredential::new(
            command.requester,
            command.kind,
            command.api_key.trim(),
            base_url,
            command.model_name.trim(),
        );
        self.credential_repo.save(&credential).await?;

        tracing::info!(
            owner_id = %credential.owner_id,
            kind = credential.kind.as_str(),
            model = %credential.model_name,
            "Model credential saved"
        );

        Ok(SaveModelResponse {
            kind: credential.kind,
            base_url: credential.base_url,
            model_name: credential.model_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::generation::testing::{Fixture, OWNER};

    fn command(base_url: &str, model_name: &str) -> SaveModel {
        SaveModel {
            requester: OWNER.to_string(),
            kind: ModelKind::Embedding,
            api_key: "sk-test".to_string(),
            base_url: base_url.to_string(),
            model_name: model_name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_overwrites_same_kind() {
        let fx = Fixture::new().await;
        let handler = SaveModelHandler::new(fx.credential_repo.clone());

        handler
            .handle(command("https://api.example.com/v1/", "embed-a"))
            .await
            .unwrap();
        let saved = handler
            .handle(command("https://api.example.com/v1", "embed-b"))
            .await
            .unwrap();
        assert_eq!(saved.base_url, "https://api.example.com/v1");

        let stored = fx
            .credential_repo
            .find(OWNER, ModelKind::Embedding)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.model_name, "embed-b");
    }

    #[tokio::test]
    async fn test_rejects_bad_base_url() {
        let fx = Fixture::new().await;
        let handler = SaveModelHandler::new(fx.credential_repo.clone());

        assert!(matches!(
            handler.handle(command("ftp://x", "m")).await,
            Err(ApplicationError::ValidationError(_))
        ));
        assert!(matches!(
            handler.handle(command("http://x", " ")).await,
            Err(ApplicationError::ValidationError(_))
        ));
    }
}

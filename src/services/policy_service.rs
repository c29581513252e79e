use std::sync::Arc;

use tracing::{info, warn};

use super::error::{ServiceError, ServiceResult};
use crate::database::models::Policy;
use crate::database::repository::PolicyRepository;
use crate::filter::PolicyFilter;
use crate::storage::{Document, DocumentStore, StorageError};
use crate::types::{PolicyId, TenantId};
use crate::validation::PolicyPayload;

/// A file sent along with a policy create or update
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct PolicyService {
    policies: Arc<dyn PolicyRepository>,
    documents: Arc<dyn DocumentStore>,
}

impl PolicyService {
    pub fn new(policies: Arc<dyn PolicyRepository>, documents: Arc<dyn DocumentStore>) -> Self {
        Self { policies, documents }
    }

    pub async fn list(&self, tenant: TenantId, filter: &PolicyFilter) -> ServiceResult<Vec<Policy>> {
        let policies = self.policies.list(tenant).await?;
        Ok(filter.apply(policies))
    }

    pub async fn get(&self, tenant: TenantId, id: PolicyId) -> ServiceResult<Policy> {
        self.policies
            .get(tenant, id)
            .await?
            .ok_or(ServiceError::NotFound("Policy"))
    }

    pub async fn create(
        &self,
        tenant: TenantId,
        payload: PolicyPayload,
        upload: Option<Upload>,
    ) -> ServiceResult<Policy> {
        let mut details = payload.into_details()?;
        let stored = self.store(upload).await?;
        details.document = stored.clone();

        match self.policies.insert(tenant, details).await {
            Ok(policy) => {
                info!("Created policy {} for tenant {}", policy.id, tenant);
                Ok(policy)
            }
            Err(e) => {
                self.discard(stored.as_deref()).await;
                Err(e.into())
            }
        }
    }

    /// Partial update; a new upload replaces the previous document
    pub async fn update(
        &self,
        tenant: TenantId,
        id: PolicyId,
        payload: PolicyPayload,
        upload: Option<Upload>,
    ) -> ServiceResult<Policy> {
        let current = self.get(tenant, id).await?;
        let previous_document = current.details.document.clone();
        let mut details = payload.apply_to(current.details)?;

        let stored = self.store(upload).await?;
        if stored.is_some() {
            details.document = stored.clone();
        }

        let updated = match self.policies.update(tenant, id, details).await {
            Ok(Some(policy)) => policy,
            Ok(None) => {
                self.discard(stored.as_deref()).await;
                return Err(ServiceError::NotFound("Policy"));
            }
            Err(e) => {
                self.discard(stored.as_deref()).await;
                return Err(e.into());
            }
        };

        if stored.is_some() {
            self.discard(previous_document.as_deref()).await;
        }
        Ok(updated)
    }

    /// Document clean-up failures never fail the delete
    pub async fn delete(&self, tenant: TenantId, id: PolicyId) -> ServiceResult<()> {
        let removed = self
            .policies
            .delete(tenant, id)
            .await?
            .ok_or(ServiceError::NotFound("Policy"))?;

        self.discard(removed.details.document.as_deref()).await;
        info!("Deleted policy {} for tenant {}", id, tenant);
        Ok(())
    }

    pub async fn document(&self, tenant: TenantId, id: PolicyId) -> ServiceResult<Document> {
        let policy = self.get(tenant, id).await?;
        let reference = policy
            .details
            .document
            .ok_or(ServiceError::NotFound("Document"))?;

        self.documents.get(&reference).await.map_err(|e| match e {
            StorageError::NotFound(_) => ServiceError::NotFound("Document"),
            other => other.into(),
        })
    }

    async fn store(&self, upload: Option<Upload>) -> ServiceResult<Option<String>> {
        let Some(upload) = upload else {
            return Ok(None);
        };
        let reference = self
            .documents
            .put(&upload.file_name, &upload.content_type, upload.bytes)
            .await?;
        Ok(Some(reference))
    }

    async fn discard(&self, reference: Option<&str>) {
        let Some(reference) = reference else {
            return;
        };
        if let Err(e) = self.documents.delete(reference).await {
            warn!("Failed to delete document {}: {}", reference, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MockDocumentStore;
    use crate::testing::memory::MemoryPolicies;
    use serde_json::json;

    fn payload() -> PolicyPayload {
        serde_json::from_value(json!({
            "provider": "Folksam",
            "policyName": "Home",
            "policyType": "Property",
            "country": "Sweden",
            "startDate": "2024-01-01",
        }))
        .unwrap()
    }

    fn upload(name: &str) -> Upload {
        Upload {
            file_name: name.to_string(),
            content_type: "application/pdf".to_string(),
            bytes: b"%PDF".to_vec(),
        }
    }

    #[tokio::test]
    async fn delete_succeeds_when_document_removal_fails() {
        let mut documents = MockDocumentStore::new();
        documents
            .expect_put()
            .returning(|_, _, _| Ok("policies/abc-scan.pdf".to_string()));
        documents
            .expect_delete()
            .times(1)
            .returning(|reference| Err(StorageError::NotFound(reference.to_string())));

        let service = PolicyService::new(Arc::new(MemoryPolicies::default()), Arc::new(documents));
        let tenant = TenantId::new();

        let policy = service.create(tenant, payload(), Some(upload("scan.pdf"))).await.unwrap();
        assert_eq!(policy.details.document.as_deref(), Some("policies/abc-scan.pdf"));

        service.delete(tenant, policy.id).await.unwrap();
        assert!(matches!(
            service.get(tenant, policy.id).await,
            Err(ServiceError::NotFound("Policy"))
        ));
    }

    #[tokio::test]
    async fn replacing_a_document_removes_the_old_one() {
        let mut documents = MockDocumentStore::new();
        let mut counter = 0;
        documents.expect_put().times(2).returning(move |name, _, _| {
            counter += 1;
            Ok(format!("policies/{counter}-{name}"))
        });
        documents
            .expect_delete()
            .withf(|reference: &str| reference == "policies/1-old.pdf")
            .times(1)
            .returning(|_| Ok(()));

        let service = PolicyService::new(Arc::new(MemoryPolicies::default()), Arc::new(documents));
        let tenant = TenantId::new();
        let policy = service.create(tenant, payload(), Some(upload("old.pdf"))).await.unwrap();

        let updated = service
            .update(tenant, policy.id, PolicyPayload::default(), Some(upload("new.pdf")))
            .await
            .unwrap();
        assert_eq!(updated.details.document.as_deref(), Some("policies/2-new.pdf"));
        assert_eq!(updated.details.policy_name, "Home");
    }

    #[tokio::test]
    async fn invalid_payload_never_touches_storage() {
        let documents = MockDocumentStore::new();
        let service = PolicyService::new(Arc::new(MemoryPolicies::default()), Arc::new(documents));
        let result = service
            .create(TenantId::new(), PolicyPayload::default(), Some(upload("scan.pdf")))
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn other_tenants_see_not_found() {
        let service = PolicyService::new(
            Arc::new(MemoryPolicies::default()),
            Arc::new(MockDocumentStore::new()),
        );
        let owner = TenantId::new();
        let stranger = TenantId::new();
        let policy = service.create(owner, payload(), None).await.unwrap();

        assert!(matches!(service.get(stranger, policy.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(
            service.update(stranger, policy.id, PolicyPayload::default(), None).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(service.delete(stranger, policy.id).await, Err(ServiceError::NotFound(_))));
        assert!(service.list(stranger, &PolicyFilter::default()).await.unwrap().is_empty());

        // still intact for the owner, and reads are stable
        let first = service.get(owner, policy.id).await.unwrap();
        let second = service.get(owner, policy.id).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, policy);
    }
}

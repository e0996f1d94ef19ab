//! Brand following (contacts).

use crate::services::counters::CounterService;
use chrono::Utc;
use sea_orm::Set;
use tracing::info;
use vitrine_common::{AppError, AppResult, IdGenerator};
use vitrine_db::{
    entities::contact,
    repositories::{BrandRepository, ContactRepository},
};

/// Manages user → brand contacts. Following a brand is always immediate.
#[derive(Clone)]
pub struct BrandFollowService {
    contact_repo: ContactRepository,
    brand_repo: BrandRepository,
    counters: CounterService,
    id_gen: IdGenerator,
}

impl BrandFollowService {
    /// Create a new brand follow service.
    #[must_use]
    pub const fn new(
        contact_repo: ContactRepository,
        brand_repo: BrandRepository,
        counters: CounterService,
    ) -> Self {
        Self {
            contact_repo,
            brand_repo,
            counters,
            id_gen: IdGenerator::new(),
        }
    }

    /// Start following a brand.
    pub async fn follow_brand(&self, user_id: &str, brand_id: &str) -> AppResult<contact::Model> {
        if self
            .contact_repo
            .find_by_pair(user_id, brand_id)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest("Already following this brand".to_string()));
        }

        self.brand_repo.get_active_by_id(brand_id).await?;

        let model = contact::ActiveModel {
            id: Set(self.id_gen.generate()),
            from_user_id: Set(user_id.to_string()),
            to_brand_id: Set(brand_id.to_string()),
            created_at: Set(Utc::now().into()),
        };
        let contact = self.contact_repo.create(model).await?;

        self.counters.on_contact_created(user_id, brand_id).await;

        info!(user_id = %user_id, brand_id = %brand_id, "Brand followed");
        Ok(contact)
    }

    /// Stop following a brand.
    pub async fn unfollow_brand(&self, user_id: &str, brand_id: &str) -> AppResult<()> {
        let contact = self
            .contact_repo
            .find_by_pair(user_id, brand_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Not following this brand".to_string()))?;

        self.contact_repo.delete(&contact.id).await?;

        self.counters.on_contact_deleted(user_id, brand_id).await;

        info!(user_id = %user_id, brand_id = %brand_id, "Brand unfollowed");
        Ok(())
    }

    /// IDs of the brands a user follows.
    pub async fn followed_brand_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        self.contact_repo.find_brand_ids(user_id).await
    }
}

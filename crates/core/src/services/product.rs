//! Product lifecycle.
//!
//! Creating a product, putting it on sale and deleting it emit or retire
//! brand feed actions. Feed bookkeeping never fails the product operation.
//! Deleting a product cascades to its like and rating edges, so the counters
//! of every affected user are recomputed afterwards.

use crate::services::{
    actions::{ActionFeedService, ActionTarget, ResolveMode},
    counters::CounterService,
};
use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;
use vitrine_common::{AppError, AppResult, IdGenerator};
use vitrine_db::{
    entities::{action::Verb, brand, product},
    repositories::{
        BrandRepository, ProductLikeRepository, ProductRatingRepository, ProductRepository,
    },
};

/// Input for creating a product.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductInput {
    #[validate(length(min = 3, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 200))]
    pub slug: String,
    /// Price in minor currency units.
    #[validate(range(min = 0))]
    pub price: i64,
    #[serde(default)]
    pub is_sale: bool,
}

/// Product service for business logic.
#[derive(Clone)]
pub struct ProductService {
    product_repo: ProductRepository,
    brand_repo: BrandRepository,
    like_repo: ProductLikeRepository,
    rating_repo: ProductRatingRepository,
    feed: ActionFeedService,
    counters: CounterService,
    id_gen: IdGenerator,
}

impl ProductService {
    /// Create a new product service.
    #[must_use]
    pub const fn new(
        product_repo: ProductRepository,
        brand_repo: BrandRepository,
        like_repo: ProductLikeRepository,
        rating_repo: ProductRatingRepository,
        feed: ActionFeedService,
        counters: CounterService,
    ) -> Self {
        Self {
            product_repo,
            brand_repo,
            like_repo,
            rating_repo,
            feed,
            counters,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get an active product.
    pub async fn get(&self, product_id: &str) -> AppResult<product::Model> {
        self.product_repo.get_active_by_id(product_id).await
    }

    /// Load several products at once.
    pub async fn get_many(&self, ids: &[String]) -> AppResult<Vec<product::Model>> {
        self.product_repo.find_by_ids(ids).await
    }

    /// Publish a new product under a brand owned by `actor_id`.
    pub async fn create_product(
        &self,
        actor_id: &str,
        brand_id: &str,
        input: CreateProductInput,
    ) -> AppResult<product::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let brand = self.brand_repo.get_active_by_id(brand_id).await?;
        ensure_owner(&brand, actor_id)?;

        let model = product::ActiveModel {
            id: Set(self.id_gen.generate()),
            brand_id: Set(brand.id.clone()),
            name: Set(input.name),
            slug: Set(input.slug),
            price: Set(input.price),
            is_sale: Set(input.is_sale),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        };
        let product = self.product_repo.create(model).await?;

        info!(product_id = %product.id, brand_id = %brand.id, "Product created");

        let target = ActionTarget::Product(product.id.clone());
        self.record(&brand.id, Verb::Product, &target).await;
        if product.is_sale {
            self.record(&brand.id, Verb::Sale, &target).await;
        }

        Ok(product)
    }

    /// Put a product on sale or take it off sale.
    pub async fn set_sale(
        &self,
        actor_id: &str,
        product_id: &str,
        is_sale: bool,
    ) -> AppResult<product::Model> {
        let (brand, product) = self.get_owned(actor_id, product_id).await?;

        if product.is_sale == is_sale {
            return Ok(product);
        }

        let mut active: product::ActiveModel = product.into();
        active.is_sale = Set(is_sale);
        let product = self.product_repo.update(active).await?;

        info!(product_id = %product.id, is_sale, "Product sale flag changed");

        let target = ActionTarget::Product(product.id.clone());
        if is_sale {
            self.record(&brand.id, Verb::Sale, &target).await;
        } else {
            self.resolve(&brand.id, Verb::Sale, &target, ResolveMode::MarkSeen)
                .await;
        }

        Ok(product)
    }

    /// Delete a product, dropping its unseen PRODUCT feed entry first.
    pub async fn delete_product(&self, actor_id: &str, product_id: &str) -> AppResult<()> {
        let (brand, product) = self.get_owned(actor_id, product_id).await?;

        let likers = self.like_repo.find_user_ids_by_product(&product.id).await?;
        let raters = self
            .rating_repo
            .find_user_ids_by_product(&product.id)
            .await?;

        let target = ActionTarget::Product(product.id.clone());
        self.resolve(&brand.id, Verb::Product, &target, ResolveMode::Delete)
            .await;

        self.product_repo.delete(&product.id).await?;

        self.counters
            .on_product_deleted(&product.id, &likers, &raters)
            .await;

        info!(product_id = %product.id, brand_id = %brand.id, "Product deleted");
        Ok(())
    }

    async fn get_owned(
        &self,
        actor_id: &str,
        product_id: &str,
    ) -> AppResult<(brand::Model, product::Model)> {
        let product = self.product_repo.get_active_by_id(product_id).await?;
        let brand = self.brand_repo.get_active_by_id(&product.brand_id).await?;
        ensure_owner(&brand, actor_id)?;
        Ok((brand, product))
    }

    async fn record(&self, brand_id: &str, verb: Verb, target: &ActionTarget) {
        if let Err(e) = self
            .feed
            .record_brand_action(brand_id, verb, Some(target))
            .await
        {
            warn!(brand_id = %brand_id, verb = ?verb, error = %e, "Failed to record brand action");
        }
    }

    async fn resolve(&self, brand_id: &str, verb: Verb, target: &ActionTarget, mode: ResolveMode) {
        if let Err(e) = self
            .feed
            .resolve_brand_action(brand_id, verb, Some(target), mode)
            .await
        {
            warn!(brand_id = %brand_id, verb = ?verb, error = %e, "Failed to resolve brand action");
        }
    }
}

fn ensure_owner(brand: &brand::Model, actor_id: &str) -> AppResult<()> {
    if brand.owner_id.as_deref() == Some(actor_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the brand owner can manage its products".to_string(),
        ))
    }
}

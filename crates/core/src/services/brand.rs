//! Brand service.

use vitrine_common::AppResult;
use vitrine_db::{entities::brand, repositories::BrandRepository};

/// Brand lookups used by brand and feed handlers.
#[derive(Clone)]
pub struct BrandService {
    brand_repo: BrandRepository,
}

impl BrandService {
    /// Create a new brand service.
    #[must_use]
    pub const fn new(brand_repo: BrandRepository) -> Self {
        Self { brand_repo }
    }

    /// Get an active brand.
    pub async fn get(&self, brand_id: &str) -> AppResult<brand::Model> {
        self.brand_repo.get_active_by_id(brand_id).await
    }

    /// Load several brands at once.
    pub async fn get_many(&self, ids: &[String]) -> AppResult<Vec<brand::Model>> {
        self.brand_repo.find_by_ids(ids).await
    }
}

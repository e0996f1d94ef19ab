//! Field-selective representation building.
//!
//! Callers pass an explicit allow-list of field names. Plain model fields are
//! copied through when listed; derived fields (counters and view counts) are
//! fetched from the store only when listed, one read per field.

use serde::Serialize;
use serde_json::{Map, Value};
use vitrine_common::{AppError, AppResult};

use super::counter_store::{CounterName, EntityKind};
use super::counters::CounterService;
use super::views::ViewTracker;

/// Where a derived field's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedField {
    Counter(CounterName),
    UniqueViews,
}

/// Output name of the unique-view count on user profiles.
pub const ACCOUNT_VIEWS: &str = "account_views";
/// Output name of the unique-view count on products.
pub const PRODUCT_VIEWS: &str = "product_views";

const USER_FIELDS: &[(&str, DerivedField)] = &[
    ("followers_count", DerivedField::Counter(CounterName::FollowersCount)),
    (
        "followings_count_user",
        DerivedField::Counter(CounterName::FollowingsCountUser),
    ),
    (
        "followings_count_brand",
        DerivedField::Counter(CounterName::FollowingsCountBrand),
    ),
    (ACCOUNT_VIEWS, DerivedField::UniqueViews),
];

const BRAND_FIELDS: &[(&str, DerivedField)] = &[(
    "followers_count",
    DerivedField::Counter(CounterName::FollowersCount),
)];

const PRODUCT_FIELDS: &[(&str, DerivedField)] = &[
    (PRODUCT_VIEWS, DerivedField::UniqueViews),
    ("like_count", DerivedField::Counter(CounterName::LikeCount)),
    ("rating_count", DerivedField::Counter(CounterName::RatingCount)),
];

/// Derived fields known for an entity kind.
#[must_use]
pub const fn derived_fields(kind: EntityKind) -> &'static [(&'static str, DerivedField)] {
    match kind {
        EntityKind::User => USER_FIELDS,
        EntityKind::Brand => BRAND_FIELDS,
        EntityKind::Product => PRODUCT_FIELDS,
    }
}

/// Builds outward representations containing only requested fields.
#[derive(Clone)]
pub struct AggregateReader {
    counters: CounterService,
    views: ViewTracker,
}

impl AggregateReader {
    /// Create a new aggregate reader.
    #[must_use]
    pub const fn new(counters: CounterService, views: ViewTracker) -> Self {
        Self { counters, views }
    }

    /// Insert every requested derived field of the entity into `out`.
    ///
    /// Unrequested fields cost no store access; store failures yield zero.
    pub async fn inject(
        &self,
        kind: EntityKind,
        id: &str,
        requested: &[&str],
        out: &mut Map<String, Value>,
    ) {
        for &(name, field) in derived_fields(kind) {
            if !requested.contains(&name) {
                continue;
            }

            let value = match field {
                DerivedField::Counter(counter) => {
                    self.counters.get_counter(kind, id, counter).await
                }
                DerivedField::UniqueViews => {
                    self.views.get_unique_view_count(kind, id).await as i64
                }
            };
            out.insert(name.to_string(), Value::from(value));
        }
    }

    /// Serialize `model`, keep the requested plain fields and add the
    /// requested derived ones.
    pub async fn represent<T: Serialize + Sync>(
        &self,
        kind: EntityKind,
        id: &str,
        model: &T,
        requested: &[&str],
    ) -> AppResult<Value> {
        let mut out = match serde_json::to_value(model)
            .map_err(|e| AppError::Internal(format!("Failed to serialize {kind}: {e}")))?
        {
            Value::Object(map) => map,
            _ => return Err(AppError::Internal(format!("{kind} is not a JSON object"))),
        };

        out.retain(|key, _| requested.contains(&key.as_str()));
        self.inject(kind, id, requested, &mut out).await;

        Ok(Value::Object(out))
    }
}

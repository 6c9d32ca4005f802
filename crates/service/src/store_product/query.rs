//! Composable query steps over `store_product`.
//!
//! Reads are built as `filter -> join -> filter -> shape`: each step takes a
//! `Select` and returns a narrower one, so optional conditions stay testable
//! on their own. Shaping (expansion, grouping) happens after the rows are
//! loaded.

use std::collections::HashMap;

use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{ColumnTrait, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select};
use uuid::Uuid;

use models::{product, store_product};

use super::domain::{ListFilter, ProductFilter, ProductSummary};

pub type StoreProductSelect = Select<store_product::Entity>;

pub fn all() -> StoreProductSelect {
    store_product::Entity::find()
}

/// Conditions on the store product itself: store, recommended, discount.
pub fn filter_own(mut select: StoreProductSelect, filter: &ListFilter) -> StoreProductSelect {
    if let Some(store_id) = filter.store_id {
        select = select.filter(store_product::Column::StoreId.eq(store_id));
    }
    if filter.recommended_only {
        select = select.filter(store_product::Column::Recommended.eq(true));
    }
    if filter.discount_only {
        select = select.filter(store_product::Column::Discount.eq(true));
    }
    select
}

pub fn available_only(select: StoreProductSelect) -> StoreProductSelect {
    select.filter(store_product::Column::IsAvailable.eq(true))
}

pub fn for_product(select: StoreProductSelect, product_id: Uuid) -> StoreProductSelect {
    select.filter(store_product::Column::ProductId.eq(product_id))
}

/// Inner join: rows whose product is gone drop out.
pub fn join_product(select: StoreProductSelect) -> StoreProductSelect {
    select.join(JoinType::InnerJoin, store_product::Relation::Product.def())
}

/// Inner join: rows whose store is gone drop out.
pub fn join_store(select: StoreProductSelect) -> StoreProductSelect {
    select.join(JoinType::InnerJoin, store_product::Relation::Store.def())
}

/// Conditions on the joined product. Requires [`join_product`].
pub fn filter_product(mut select: StoreProductSelect, filter: &ProductFilter) -> StoreProductSelect {
    if let Some(category) = &filter.category {
        select = select.filter(product::Column::Category.eq(category.clone()));
    }
    if let Some(term) = &filter.search {
        select = select.filter(name_contains(term));
    }
    select
}

/// Oldest first; id breaks ties so "first seen" is stable.
pub fn ordered(select: StoreProductSelect) -> StoreProductSelect {
    select
        .order_by_asc(store_product::Column::CreatedAt)
        .order_by_asc(store_product::Column::Id)
}

/// `LOWER(product.name) LIKE LOWER(pattern)`.
///
/// Both sides go through the backend's own `LOWER`, so case folding is the
/// same on each side: full Unicode on Postgres, ASCII only on SQLite.
fn name_contains(term: &str) -> SimpleExpr {
    Expr::cust_with_exprs(
        r"LOWER($1) LIKE LOWER($2) ESCAPE '\'",
        [
            SimpleExpr::from(Expr::col((product::Entity, product::Column::Name))),
            SimpleExpr::from(Expr::val(search_pattern(term))),
        ],
    )
}

/// `%term%` with LIKE wildcards in the term taken literally.
pub fn search_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Full list pipeline.
pub fn list(filter: &ListFilter) -> StoreProductSelect {
    let select = filter_own(all(), filter);
    let select = join_store(join_product(select));
    ordered(filter_product(select, &filter.product))
}

/// Every store carrying one product.
pub fn store_options(product_id: Uuid) -> StoreProductSelect {
    ordered(join_store(join_product(for_product(all(), product_id))))
}

/// Available rows feeding the product summary.
pub fn summary_rows(filter: &ProductFilter) -> StoreProductSelect {
    ordered(filter_product(join_product(available_only(all())), filter))
}

/// Group ordered rows by product: min/max price, first-seen product fields
/// and the first-seen store product as representative. Groups keep the order
/// in which their product first appeared.
pub fn summarize(rows: Vec<(store_product::Model, product::Model)>) -> Vec<ProductSummary> {
    let mut out: Vec<ProductSummary> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    for (sp, p) in rows {
        match index.get(&sp.product_id) {
            Some(&i) => {
                let s = &mut out[i];
                s.min_price = s.min_price.min(sp.price);
                s.max_price = s.max_price.max(sp.price);
            }
            None => {
                index.insert(sp.product_id, out.len());
                out.push(ProductSummary {
                    product_id: sp.product_id,
                    name: p.name,
                    description: p.description,
                    images: store_product::images_from_json(&p.images),
                    min_price: sp.price,
                    max_price: sp.price,
                    store_product_id: sp.id,
                });
            }
        }
    }
    out
}

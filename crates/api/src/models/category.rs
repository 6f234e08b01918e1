//! Category entity and the nested tree view.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::CategoryId;

/// A product category. Categories form a forest through `parent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub parent_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A category with its children, as returned by `GET /categories/tree`.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// Arrange a flat category list into a forest.
    ///
    /// Roots are categories without a parent. Categories whose parent no
    /// longer exists are left out together with their subtrees. Siblings are
    /// ordered by name.
    #[must_use]
    pub fn forest(categories: Vec<Category>) -> Vec<Self> {
        let mut by_parent: HashMap<Option<CategoryId>, Vec<Category>> = HashMap::new();
        for category in categories {
            by_parent
                .entry(category.parent_id.clone())
                .or_default()
                .push(category);
        }
        Self::children_of(None, &mut by_parent)
    }

    fn children_of(
        parent: Option<CategoryId>,
        by_parent: &mut HashMap<Option<CategoryId>, Vec<Category>>,
    ) -> Vec<Self> {
        let mut siblings = by_parent.remove(&parent).unwrap_or_default();
        siblings.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        siblings
            .into_iter()
            .map(|category| {
                let children = Self::children_of(Some(category.id.clone()), by_parent);
                Self { category, children }
            })
            .collect()
    }
}

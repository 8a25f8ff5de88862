use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::categories::models::{Category, ParentCategory};
use crate::shared::text::compare_names;
use crate::shared::validation::not_blank;

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub level: i32,
    pub preview_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            parent_id: c.parent_id,
            level: c.level,
            preview_image: c.preview_image,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParentCategoryDto {
    pub id: i64,
    pub name: String,
    pub preview_image: Option<String>,
    pub children_count: i64,
}

impl From<ParentCategory> for ParentCategoryDto {
    fn from(c: ParentCategory) -> Self {
        Self {
            id: c.id,
            name: c.name,
            preview_image: c.preview_image,
            children_count: c.children_count,
        }
    }
}

/// Dropdown entry; `name` is indented two spaces per level
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryOptionDto {
    pub id: i64,
    pub name: String,
    pub level: i32,
}

impl From<&Category> for CategoryOptionDto {
    fn from(c: &Category) -> Self {
        let indent = "  ".repeat(c.level.max(0) as usize);
        Self {
            id: c.id,
            name: format!("{}{}", indent, c.name),
            level: c.level,
        }
    }
}

/// Response DTO for category tree (hierarchical structure)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(no_recursion)]
pub struct CategoryTreeDto {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub level: i32,
    pub preview_image: Option<String>,
    pub children: Vec<CategoryTreeDto>,
}

impl CategoryTreeDto {
    /// Build a forest from a flat list of categories.
    ///
    /// Rows are grouped by parent in one pass, then attached top-down starting
    /// from the roots. Siblings are sorted by locale-aware name at every
    /// level. Rows that cannot be reached from a root (an unknown parent, or a
    /// parent chain that loops) are left out and logged.
    pub fn build_tree(categories: Vec<Category>) -> Vec<CategoryTreeDto> {
        let total = categories.len();
        let mut by_parent: HashMap<Option<i64>, Vec<Category>> = HashMap::new();
        for category in categories {
            by_parent.entry(category.parent_id).or_default().push(category);
        }

        let roots = Self::attach(None, &mut by_parent);

        if !by_parent.is_empty() {
            let mut dropped: Vec<i64> = by_parent.values().flatten().map(|c| c.id).collect();
            dropped.sort_unstable();
            tracing::warn!(
                "Dropped {} of {} categories unreachable from a root: {:?}",
                dropped.len(),
                total,
                dropped
            );
        }

        roots
    }

    // Each sibling group is removed from the map when consumed, so a group is
    // visited at most once even if the parent links form a loop.
    fn attach(
        parent_id: Option<i64>,
        by_parent: &mut HashMap<Option<i64>, Vec<Category>>,
    ) -> Vec<CategoryTreeDto> {
        let Some(mut siblings) = by_parent.remove(&parent_id) else {
            return Vec::new();
        };
        siblings.sort_by(|a, b| compare_names(&a.name, &b.name));

        siblings
            .into_iter()
            .map(|c| {
                let children = Self::attach(Some(c.id), by_parent);
                CategoryTreeDto {
                    id: c.id,
                    name: c.name,
                    parent_id: c.parent_id,
                    level: c.level,
                    preview_image: c.preview_image,
                    children,
                }
            })
            .collect()
    }

    /// Number of nodes in this subtree, including itself
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(CategoryTreeDto::size).sum::<usize>()
    }
}

/// Request DTO for creating a category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateCategoryDto {
    #[validate(
        length(max = 100, message = "must be at most 100 characters"),
        custom(function = "not_blank", message = "must not be blank")
    )]
    pub name: String,
    pub parent_id: Option<i64>,
    #[validate(url(message = "must be a valid URL"))]
    pub preview_image: Option<String>,
}

/// Request DTO for updating a category. All fields are replaced; a missing
/// `parent_id` turns the category into a root.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct UpdateCategoryDto {
    #[validate(
        length(max = 100, message = "must be at most 100 characters"),
        custom(function = "not_blank", message = "must not be blank")
    )]
    pub name: String,
    pub parent_id: Option<i64>,
    #[validate(url(message = "must be a valid URL"))]
    pub preview_image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn tree_ids(tree: &[CategoryTreeDto]) -> HashSet<i64> {
        let mut ids = HashSet::new();
        let mut stack: Vec<&CategoryTreeDto> = tree.iter().collect();
        while let Some(node) = stack.pop() {
            ids.insert(node.id);
            stack.extend(node.children.iter());
        }
        ids
    }

    fn category(id: i64, name: &str, parent_id: Option<i64>, level: i32) -> Category {
        Category {
            id,
            name: name.to_string(),
            parent_id,
            level,
            preview_image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn names(nodes: &[CategoryTreeDto]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    fn assert_children_point_to_parent(nodes: &[CategoryTreeDto]) {
        for node in nodes {
            for child in &node.children {
                assert_eq!(child.parent_id, Some(node.id));
            }
            assert_children_point_to_parent(&node.children);
        }
    }

    #[test]
    fn test_build_tree_forms_forest() {
        let rows = vec![
            category(1, "Nature", None, 0),
            category(2, "Business", None, 0),
            category(3, "Forest", Some(1), 1),
            category(4, "Ocean", Some(1), 1),
            category(5, "Pine", Some(3), 2),
            category(6, "Finance", Some(2), 1),
        ];

        let tree = CategoryTreeDto::build_tree(rows);

        assert_eq!(names(&tree), vec!["Business", "Nature"]);
        assert_eq!(tree.iter().map(CategoryTreeDto::size).sum::<usize>(), 6);
        assert!(tree.iter().all(|root| root.parent_id.is_none()));
        assert_children_point_to_parent(&tree);

        let nature = &tree[1];
        assert_eq!(names(&nature.children), vec!["Forest", "Ocean"]);
        assert_eq!(names(&nature.children[0].children), vec!["Pine"]);
    }

    #[test]
    fn test_siblings_sorted_locale_aware() {
        let rows = vec![
            category(1, "上海", None, 0),
            category(2, "Zoo", None, 0),
            category(3, "北京", None, 0),
            category(4, "art", None, 0),
            category(5, "Éclair", None, 0),
            category(6, "banana", Some(4), 1),
            category(7, "Apple", Some(4), 1),
        ];

        let tree = CategoryTreeDto::build_tree(rows);

        // 北京 = bei jing, 上海 = shang hai
        assert_eq!(names(&tree), vec!["art", "北京", "Éclair", "上海", "Zoo"]);
        assert_eq!(names(&tree[0].children), vec!["Apple", "banana"]);
    }

    #[test]
    fn test_orphans_are_dropped_with_their_subtree() {
        let rows = vec![
            category(1, "Root", None, 0),
            category(2, "Child", Some(1), 1),
            category(3, "Orphan", Some(99), 1),
            category(4, "Orphan child", Some(3), 2),
        ];

        let tree = CategoryTreeDto::build_tree(rows);

        assert_eq!(tree_ids(&tree), HashSet::from([1, 2]));
    }

    #[test]
    fn test_cycles_terminate() {
        let rows = vec![
            category(1, "Root", None, 0),
            category(2, "Loop A", Some(3), 1),
            category(3, "Loop B", Some(2), 1),
            category(4, "Self", Some(4), 1),
        ];

        let tree = CategoryTreeDto::build_tree(rows);

        assert_eq!(tree.len(), 1);
        assert!(tree[0].children.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(CategoryTreeDto::build_tree(Vec::new()).is_empty());
    }

    #[test]
    fn test_option_indentation() {
        let dto = CategoryOptionDto::from(&category(5, "Pine", Some(3), 2));
        assert_eq!(dto.name, "    Pine");
        let root = CategoryOptionDto::from(&category(1, "Nature", None, 0));
        assert_eq!(root.name, "Nature");
    }

    #[test]
    fn test_create_dto_validation() {
        let dto = CreateCategoryDto {
            name: "   ".to_string(),
            parent_id: None,
            preview_image: Some("not a url".to_string()),
        };
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("preview_image"));
    }
}

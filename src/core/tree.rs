//! Filter tree: flat dotted-path filters grouped by path structure
//!
//! ```text
//! where = { "status": .., "items.sku": .., "items.qty": .., "user.name": .. }
//!
//! (root)
//! ├── status          [filter]
//! ├── items  (list)
//! │   ├── sku         [filter]
//! │   └── qty         [filter]
//! └── user
//!     └── name        [filter]
//! ```
//!
//! Nodes are keyed by canonical segment names, so a wire alias and the
//! canonical name of the same field land on the same node. Grouping matters
//! for list-valued fields: every filter below one list node has to hold for
//! the same element.

use super::column_type::ColumnType;
use super::error::QueryError;
use super::filter::FilterExpression;
use super::path;
use super::shape::RecordShape;
use indexmap::IndexMap;

/// A filter expression bound to the type it is compiled against
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub column_type: ColumnType,
    pub expression: FilterExpression,
}

/// One path segment in the tree
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterNode {
    /// Canonical segment name; empty for the root
    pub name: String,
    /// The field holds a collection
    pub is_collection: bool,
    pub filters: Vec<ColumnFilter>,
    /// The global search applies to this field
    pub searchable: bool,
    pub children: IndexMap<String, FilterNode>,
}

impl FilterNode {
    fn new(name: &str, is_collection: bool) -> Self {
        Self {
            name: name.to_string(),
            is_collection,
            ..Default::default()
        }
    }

    /// A leaf directly carries at least one filter
    pub fn is_leaf(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Number of filters attached at or below this node
    pub fn filter_count(&self) -> usize {
        self.filters.len()
            + self
                .children
                .values()
                .map(FilterNode::filter_count)
                .sum::<usize>()
    }
}

/// Filters of one query, grouped by path
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterTree {
    root: FilterNode,
    global_search: Option<String>,
}

impl FilterTree {
    /// Group the `where` map by path
    ///
    /// Every path must resolve against `shape`. Expressions without any
    /// operator still have their path checked but attach nothing.
    pub fn build(
        shape: &RecordShape,
        filters: &IndexMap<String, FilterExpression>,
    ) -> Result<FilterTree, QueryError> {
        let mut tree = FilterTree::default();
        for (wire_path, expression) in filters {
            let resolved = path::resolve(shape, wire_path)?;
            let node = tree.node_for(&resolved);
            if expression.has_no_operator() {
                tracing::debug!(path = %wire_path, "filter without operators, nothing attached");
                continue;
            }
            let column_type = expression.column_type.unwrap_or(resolved.column_type);
            node.filters.push(ColumnFilter {
                column_type,
                expression: expression.clone(),
            });
        }
        Ok(tree)
    }

    /// Seed the global search against the given searchable wire paths
    ///
    /// A blank search value leaves the tree untouched.
    pub fn attach_search(
        &mut self,
        shape: &RecordShape,
        value: &str,
        searchable: &[String],
    ) -> Result<(), QueryError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(());
        }
        for wire_path in searchable {
            let resolved = path::resolve(shape, wire_path)?;
            self.node_for(&resolved).searchable = true;
        }
        self.global_search = Some(value.to_string());
        Ok(())
    }

    pub fn root(&self) -> &FilterNode {
        &self.root
    }

    pub fn global_search(&self) -> Option<&str> {
        self.global_search.as_deref()
    }

    fn node_for(&mut self, resolved: &path::ResolvedField) -> &mut FilterNode {
        let mut node = &mut self.root;
        for segment in &resolved.segments {
            node = node
                .children
                .entry(segment.name.clone())
                .or_insert_with(|| FilterNode::new(&segment.name, segment.is_list));
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shape::{FieldDef, NativeType};
    use serde_json::json;

    fn order_shape() -> RecordShape {
        let item = RecordShape::new("item")
            .field(FieldDef::scalar("sku", NativeType::String))
            .field(FieldDef::scalar("qty", NativeType::U32).with_alias("quantity"));
        let user = RecordShape::new("user")
            .field(FieldDef::scalar("name", NativeType::String))
            .field(FieldDef::scalar("email", NativeType::String));
        RecordShape::new("order")
            .field(FieldDef::scalar("status", NativeType::String))
            .field(FieldDef::list_of("items", item))
            .field(FieldDef::record("user", user))
    }

    fn eq(value: serde_json::Value) -> FilterExpression {
        FilterExpression {
            eq: Some(value),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_groups_by_segment() {
        let mut filters = IndexMap::new();
        filters.insert("status".to_string(), eq(json!("paid")));
        filters.insert("items.sku".to_string(), eq(json!("A-1")));
        filters.insert("items.quantity".to_string(), eq(json!(2)));
        filters.insert("user.name".to_string(), eq(json!("Ann")));

        let tree = FilterTree::build(&order_shape(), &filters).unwrap();
        let root = tree.root();
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.filter_count(), 4);

        let items = &root.children["items"];
        assert!(items.is_collection);
        assert!(!items.is_leaf());
        assert_eq!(items.children.keys().collect::<Vec<_>>(), vec!["sku", "qty"]);
        assert_eq!(items.children["qty"].filters[0].column_type, ColumnType::Integer);

        assert!(root.children["status"].is_leaf());
        assert!(!root.children["user"].is_collection);
    }

    #[test]
    fn test_alias_and_name_share_a_node() {
        let mut filters = IndexMap::new();
        filters.insert("items.qty".to_string(), eq(json!(1)));
        filters.insert("items.quantity".to_string(), eq(json!(2)));
        let tree = FilterTree::build(&order_shape(), &filters).unwrap();
        assert_eq!(tree.root().children["items"].children["qty"].filters.len(), 2);
    }

    #[test]
    fn test_declared_type_overrides_inferred() {
        let mut filters = IndexMap::new();
        filters.insert(
            "status".to_string(),
            FilterExpression {
                column_type: Some(ColumnType::Integer),
                eq: Some(json!("3")),
                ..Default::default()
            },
        );
        let tree = FilterTree::build(&order_shape(), &filters).unwrap();
        assert_eq!(
            tree.root().children["status"].filters[0].column_type,
            ColumnType::Integer
        );
    }

    #[test]
    fn test_unknown_path_fails() {
        let mut filters = IndexMap::new();
        filters.insert("items.colour".to_string(), eq(json!("red")));
        let err = FilterTree::build(&order_shape(), &filters).unwrap_err();
        assert!(matches!(err, QueryError::FieldNotFound { .. }));
    }

    #[test]
    fn test_empty_expression_attaches_nothing() {
        let mut filters = IndexMap::new();
        filters.insert("status".to_string(), FilterExpression::default());
        let tree = FilterTree::build(&order_shape(), &filters).unwrap();
        assert_eq!(tree.root().filter_count(), 0);
    }

    #[test]
    fn test_attach_search_marks_searchable_nodes() {
        let mut tree = FilterTree::default();
        let searchable = vec!["status".to_string(), "user.name".to_string()];
        tree.attach_search(&order_shape(), "  ann ", &searchable).unwrap();

        assert_eq!(tree.global_search(), Some("ann"));
        assert!(tree.root().children["status"].searchable);
        assert!(tree.root().children["user"].children["name"].searchable);
        assert!(!tree.root().children["user"].searchable);
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let mut tree = FilterTree::default();
        tree.attach_search(&order_shape(), "   ", &["status".to_string()])
            .unwrap();
        assert_eq!(tree.global_search(), None);
        assert!(tree.root().children.is_empty());
    }
}

//! Query assembler: description in, store-ready query out
//!
//! Column predicates are ANDed. Global search predicates (one per searchable
//! field) are ORed together and the disjunction is ANDed with the column
//! predicates. Below a collection node the walk opens a new scope: all
//! column predicates of that scope are wrapped in one
//! [`Predicate::Nested`], so they must hold for the same element.

use super::compiler;
use super::error::QueryError;
use super::path::{self, FieldPath};
use super::predicate::Predicate;
use super::query::{PageRequest, QueryDescription, SortOrder};
use super::shape::CollectionSchema;
use super::tree::{FilterNode, FilterTree};

/// Everything a store needs to run one listing query
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledQuery {
    pub predicate: Predicate,
    pub page: PageRequest,
    pub sort: Vec<SortOrder>,
    pub draw: Option<u64>,
}

/// Compile a description against a collection
///
/// Fails on unknown filter, sort or searchable paths and on an invalid limit.
pub fn assemble(
    schema: &CollectionSchema,
    description: &QueryDescription,
    max_page_size: u64,
) -> Result<AssembledQuery, QueryError> {
    let page = description.page(max_page_size)?;

    let mut tree = FilterTree::build(&schema.shape, &description.filters)?;
    if let Some(search) = &description.search {
        tree.attach_search(&schema.shape, search, &schema.searchable)?;
    }
    let predicate = tree_predicate(&tree);

    let sort = description
        .order_by
        .iter()
        .map(|(wire_path, direction)| {
            let resolved = path::resolve(&schema.shape, wire_path)?;
            Ok(SortOrder {
                field: resolved.canonical_path(),
                direction: *direction,
            })
        })
        .collect::<Result<Vec<_>, QueryError>>()?;

    tracing::debug!(
        collection = %schema.name,
        predicate = %predicate,
        offset = page.offset,
        limit = page.limit,
        sort_keys = sort.len(),
        "assembled query"
    );

    Ok(AssembledQuery {
        predicate,
        page,
        sort,
        draw: description.draw,
    })
}

/// Combined predicate of a filter tree
pub fn tree_predicate(tree: &FilterTree) -> Predicate {
    let mut columns = Vec::new();
    let mut globals = Vec::new();
    walk(
        tree.root(),
        &FieldPath::default(),
        tree.global_search(),
        &mut columns,
        &mut globals,
    );

    let mut parts = vec![Predicate::and(columns)];
    if tree.global_search().is_some() {
        if globals.is_empty() {
            tracing::debug!("global search without searchable fields, ignored");
        } else {
            parts.push(Predicate::or(globals));
        }
    }
    Predicate::and(parts)
}

fn walk(
    node: &FilterNode,
    prefix: &FieldPath,
    search: Option<&str>,
    columns: &mut Vec<Predicate>,
    globals: &mut Vec<Predicate>,
) {
    for child in node.children.values() {
        let field = prefix.child(&child.name);

        let compile = if child.is_collection {
            compiler::compile_collection
        } else {
            compiler::compile
        };
        columns.extend(
            child
                .filters
                .iter()
                .map(|f| compile(&field, f.column_type, &f.expression)),
        );
        if let (true, Some(needle)) = (child.searchable, search) {
            globals.push(Predicate::Contains {
                field: field.clone(),
                needle: needle.to_string(),
            });
        }

        if child.is_collection && !child.children.is_empty() {
            let mut scoped_columns = Vec::new();
            let mut scoped_globals = Vec::new();
            walk(
                child,
                &FieldPath::default(),
                search,
                &mut scoped_columns,
                &mut scoped_globals,
            );
            columns.push(Predicate::nested(field.clone(), Predicate::and(scoped_columns)));
            globals.extend(
                scoped_globals
                    .into_iter()
                    .map(|g| Predicate::nested(field.clone(), g)),
            );
        } else {
            walk(child, &field, search, columns, globals);
        }
    }
}

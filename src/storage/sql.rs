//! SQL rendering of compiled predicates
//!
//! Produces parameterized statements; literal values never end up in the SQL
//! text. Executing them is left to the caller's driver.
//!
//! Nested paths are rendered against join aliases: `user.address.city`
//! becomes `"user_address"."city"`, and every alias a statement needs is
//! listed in [`SqlStatement::joins`], so the caller's `FROM` clause can
//! provide it. A [`Predicate::Nested`] scope is rendered against the join of
//! its collection, which makes all of its tests apply to the same joined row.

use crate::core::field::FieldValue;
use crate::core::path::FieldPath;
use crate::core::predicate::Predicate;
use crate::core::query::{Direction, PageRequest, SortOrder};

/// Target SQL dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// `$1` placeholders, `~` regex, double-quoted identifiers
    #[default]
    Postgres,
    /// `?` placeholders, `REGEXP`, backtick-quoted identifiers
    MySql,
}

/// A rendered statement and its bound parameters, in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<FieldValue>,
    /// Join aliases referenced by the statement, in first-use order
    pub joins: Vec<FieldPath>,
}

/// Renders predicates, sort keys and pages for one table
#[derive(Debug, Clone)]
pub struct SqlRenderer {
    table: String,
    from: Option<String>,
    dialect: Dialect,
}

impl SqlRenderer {
    pub fn new(table: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            table: table.into(),
            from: None,
            dialect,
        }
    }

    /// Replace the default `FROM <table>` with a custom clause (joins)
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// `SELECT *` for one sorted page
    pub fn select(&self, predicate: &Predicate, page: &PageRequest, sort: &[SortOrder]) -> SqlStatement {
        let mut writer = Writer::new(self.dialect);
        let condition = writer.predicate(predicate, &FieldPath::default());
        let mut sql = format!("SELECT * FROM {} WHERE {}", self.from_clause(), condition);

        if !sort.is_empty() {
            let keys: Vec<String> = sort
                .iter()
                .map(|order| {
                    let direction = match order.direction {
                        Direction::Asc => "ASC",
                        Direction::Desc => "DESC",
                    };
                    format!("{} {}", writer.column(&order.field), direction)
                })
                .collect();
            sql.push_str(&format!(" ORDER BY {}", keys.join(", ")));
        }
        sql.push_str(&format!(" LIMIT {} OFFSET {}", page.limit, page.offset));

        writer.finish(sql)
    }

    /// `SELECT COUNT(*)`, unfiltered when `predicate` is `None`
    pub fn count(&self, predicate: Option<&Predicate>) -> SqlStatement {
        let mut writer = Writer::new(self.dialect);
        let mut sql = format!("SELECT COUNT(*) FROM {}", self.from_clause());
        if let Some(predicate) = predicate {
            let condition = writer.predicate(predicate, &FieldPath::default());
            sql.push_str(&format!(" WHERE {}", condition));
        }
        writer.finish(sql)
    }

    /// Only the boolean condition
    pub fn condition(&self, predicate: &Predicate) -> SqlStatement {
        let mut writer = Writer::new(self.dialect);
        let condition = writer.predicate(predicate, &FieldPath::default());
        writer.finish(condition)
    }

    fn from_clause(&self) -> String {
        match &self.from {
            Some(from) => from.clone(),
            None => quote_ident(self.dialect, &self.table),
        }
    }
}

struct Writer {
    dialect: Dialect,
    params: Vec<FieldValue>,
    joins: Vec<FieldPath>,
}

impl Writer {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            params: Vec::new(),
            joins: Vec::new(),
        }
    }

    fn finish(self, sql: String) -> SqlStatement {
        SqlStatement {
            sql,
            params: self.params,
            joins: self.joins,
        }
    }

    fn bind(&mut self, value: FieldValue) -> String {
        self.params.push(value);
        match self.dialect {
            Dialect::Postgres => format!("${}", self.params.len()),
            Dialect::MySql => "?".to_string(),
        }
    }

    /// Qualified column for a path, registering its join alias
    fn column(&mut self, path: &FieldPath) -> String {
        let segments = path.segments();
        let Some((last, prefix)) = segments.split_last() else {
            return String::new();
        };
        if prefix.is_empty() {
            return quote_ident(self.dialect, last);
        }
        let alias = FieldPath::from_segments(prefix.iter().cloned());
        let alias_name = prefix.join("_");
        if !self.joins.contains(&alias) {
            self.joins.push(alias);
        }
        format!(
            "{}.{}",
            quote_ident(self.dialect, &alias_name),
            quote_ident(self.dialect, last)
        )
    }

    fn text(&self, column: &str) -> String {
        match self.dialect {
            Dialect::Postgres => format!("LOWER(CAST({column} AS TEXT))"),
            Dialect::MySql => format!("LOWER(CAST({column} AS CHAR))"),
        }
    }

    fn predicate(&mut self, predicate: &Predicate, scope: &FieldPath) -> String {
        match predicate {
            Predicate::True => "1 = 1".to_string(),
            Predicate::False => "1 = 0".to_string(),
            Predicate::Compare { field, op, value } => {
                let column = self.column(&scope.join(field));
                let placeholder = self.bind(value.clone());
                format!("{} {} {}", column, op.symbol(), placeholder)
            }
            Predicate::In { field, values } => {
                let column = self.column(&scope.join(field));
                format!("{} IN ({})", column, self.bind_all(values))
            }
            Predicate::NotIn { field, values } => {
                let column = self.column(&scope.join(field));
                format!("{} NOT IN ({})", column, self.bind_all(values))
            }
            Predicate::Like { field, pattern } => {
                let column = self.column(&scope.join(field));
                let placeholder = self.bind(FieldValue::String(escape_like(pattern).to_lowercase()));
                format!("LOWER({}) LIKE {} ESCAPE '\\'", column, placeholder)
            }
            Predicate::Regex { field, pattern } => {
                let column = self.column(&scope.join(field));
                let placeholder = self.bind(FieldValue::String(pattern.clone()));
                let op = match self.dialect {
                    Dialect::Postgres => "~",
                    Dialect::MySql => "REGEXP",
                };
                format!("{} {} {}", column, op, placeholder)
            }
            Predicate::Contains { field, needle } => {
                let column = self.column(&scope.join(field));
                let escaped = escape_like(needle).replace('%', "\\%").to_lowercase();
                let placeholder = self.bind(FieldValue::String(format!("%{escaped}%")));
                format!("{} LIKE {} ESCAPE '\\'", self.text(&column), placeholder)
            }
            Predicate::Exists { field, exists } => {
                let column = self.column(&scope.join(field));
                if *exists {
                    format!("{} IS NOT NULL", column)
                } else {
                    format!("{} IS NULL", column)
                }
            }
            Predicate::IsNull { field } => format!("{} IS NULL", self.column(&scope.join(field))),
            Predicate::IsEmpty { field } => format!("{} = ''", self.column(&scope.join(field))),
            Predicate::Nested { field, predicate } => self.predicate(predicate, &scope.join(field)),
            Predicate::Not(inner) => format!("NOT ({})", self.predicate(inner, scope)),
            Predicate::And(parts) => parts
                .iter()
                .map(|part| {
                    let rendered = self.predicate(part, scope);
                    if matches!(part, Predicate::Or(_)) {
                        format!("({rendered})")
                    } else {
                        rendered
                    }
                })
                .collect::<Vec<_>>()
                .join(" AND "),
            Predicate::Or(parts) => parts
                .iter()
                .map(|part| format!("({})", self.predicate(part, scope)))
                .collect::<Vec<_>>()
                .join(" OR "),
        }
    }

    fn bind_all(&mut self, values: &[FieldValue]) -> String {
        values
            .iter()
            .map(|v| self.bind(v.clone()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn quote_ident(dialect: Dialect, ident: &str) -> String {
    match dialect {
        Dialect::Postgres => format!("\"{}\"", ident.replace('"', "\"\"")),
        Dialect::MySql => format!("`{}`", ident.replace('`', "``")),
    }
}

/// Escape `\` and `_`, which LIKE would otherwise interpret
fn escape_like(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if c == '_' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

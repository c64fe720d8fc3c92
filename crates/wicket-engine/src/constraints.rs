//! Constraint resolver: primary key, insertable fields and enum domains.

use crate::schema::{ColumnDescriptor, TableSchema};
use wicket_core::AutoIncrementException;

/// The primary key column, if the table has one.
///
/// For a composite key this is the first key column in ordinal order.
pub fn resolve_primary_key(schema: &TableSchema) -> Option<&ColumnDescriptor> {
    schema.columns.iter().find(|c| c.is_primary())
}

/// Whether `(table, column)` is the configured auto-increment exception.
pub fn is_whitelisted(
    exception: Option<&AutoIncrementException>,
    table: &str,
    column: &str,
) -> bool {
    exception.is_some_and(|e| e.matches(table, column))
}

/// Columns a caller supplies values for on insert.
///
/// Field order here is the order of the positional placeholders in the
/// synthesized statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertableFieldSet {
    fields: Vec<ColumnDescriptor>,
}

impl InsertableFieldSet {
    pub fn fields(&self) -> &[ColumnDescriptor] {
        &self.fields
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.iter().any(|f| f.name == column)
    }
}

/// Filter a schema down to the columns a caller may supply on insert.
///
/// A column is excluded iff it is auto-increment and is not the configured
/// `(table, column)` exception. Manually assigned primary keys stay in.
pub fn build_insertable_fields(
    schema: &TableSchema,
    exception: Option<&AutoIncrementException>,
) -> InsertableFieldSet {
    let fields = schema
        .columns
        .iter()
        .filter(|c| !c.is_auto_increment || is_whitelisted(exception, &schema.table, &c.name))
        .cloned()
        .collect();
    InsertableFieldSet { fields }
}

/// Extract the allowed values of an `enum(...)` type expression.
///
/// Returns `None` for any other type. Literals come back in declaration
/// order; a doubled quote inside a literal stands for one quote.
pub fn parse_enum_domain(declared_type: &str) -> Option<Vec<String>> {
    let trimmed = declared_type.trim_start();
    let marker = trimmed.get(..5)?;
    if !marker.eq_ignore_ascii_case("enum(") {
        return None;
    }

    let mut values = Vec::new();
    let mut chars = trimmed[5..].chars().peekable();
    let mut current: Option<String> = None;

    while let Some(c) = chars.next() {
        match current.as_mut() {
            None => match c {
                '\'' => current = Some(String::new()),
                ')' => break,
                _ => {}
            },
            Some(literal) => {
                if c != '\'' {
                    literal.push(c);
                } else if chars.peek() == Some(&'\'') {
                    chars.next();
                    literal.push('\'');
                } else {
                    values.extend(current.take());
                }
            }
        }
    }

    Some(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches_schema() -> TableSchema {
        TableSchema::new(
            "MATCHES",
            vec![
                ColumnDescriptor::new("match_id", "int").primary().auto_increment(),
                ColumnDescriptor::new("home_team_id", "int"),
                ColumnDescriptor::new("status", "enum('Scheduled','Completed')"),
            ],
        )
    }

    fn teams_schema() -> TableSchema {
        TableSchema::new(
            "TEAMS",
            vec![
                ColumnDescriptor::new("team_id", "int").primary().auto_increment(),
                ColumnDescriptor::new("team_name", "varchar(50)"),
                ColumnDescriptor::new("row_seq", "int").auto_increment(),
            ],
        )
    }

    #[test]
    fn test_resolve_primary_key() {
        let schema = teams_schema();
        assert_eq!(resolve_primary_key(&schema).unwrap().name, "team_id");
    }

    #[test]
    fn test_resolve_primary_key_none() {
        let schema = TableSchema::new(
            "LOG",
            vec![ColumnDescriptor::new("message", "text")],
        );
        assert!(resolve_primary_key(&schema).is_none());
    }

    #[test]
    fn test_resolve_primary_key_first_of_composite() {
        let schema = TableSchema::new(
            "PLAYERS_CONTACTS",
            vec![
                ColumnDescriptor::new("note", "text"),
                ColumnDescriptor::new("player_id", "int").primary(),
                ColumnDescriptor::new("contact_no", "varchar(15)").primary(),
            ],
        );
        assert_eq!(resolve_primary_key(&schema).unwrap().name, "player_id");
    }

    #[test]
    fn test_insertable_excludes_auto_increment() {
        let fields = build_insertable_fields(&teams_schema(), None);
        assert_eq!(fields.names(), vec!["team_name"]);
    }

    #[test]
    fn test_insertable_keeps_whitelisted_pair() {
        let exception = AutoIncrementException::new("MATCHES", "match_id");
        let fields = build_insertable_fields(&matches_schema(), Some(&exception));
        assert_eq!(fields.names(), vec!["match_id", "home_team_id", "status"]);
    }

    #[test]
    fn test_whitelist_ignores_table_name_case() {
        let exception = AutoIncrementException::new("matches", "match_id");
        let fields = build_insertable_fields(&matches_schema(), Some(&exception));
        assert!(fields.contains("match_id"));
    }

    #[test]
    fn test_whitelist_only_applies_to_its_table() {
        // same column name on another table is still generated
        let exception = AutoIncrementException::new("MATCHES", "team_id");
        let fields = build_insertable_fields(&teams_schema(), Some(&exception));
        assert!(!fields.contains("team_id"));

        // another auto-increment column on the whitelisted table is excluded
        let exception = AutoIncrementException::new("TEAMS", "team_id");
        let fields = build_insertable_fields(&teams_schema(), Some(&exception));
        assert_eq!(fields.names(), vec!["team_id", "team_name"]);
        assert!(!fields.contains("row_seq"));
    }

    #[test]
    fn test_manual_primary_key_is_insertable() {
        let schema = TableSchema::new(
            "VENUES",
            vec![
                ColumnDescriptor::new("venue_id", "int").primary(),
                ColumnDescriptor::new("venue_name", "varchar(100)"),
            ],
        );
        let fields = build_insertable_fields(&schema, None);
        assert_eq!(fields.names(), vec!["venue_id", "venue_name"]);
    }

    #[test]
    fn test_no_auto_increment_column_unless_whitelisted() {
        let exception = AutoIncrementException::new("MATCHES", "match_id");
        for schema in [matches_schema(), teams_schema()] {
            let fields = build_insertable_fields(&schema, Some(&exception));
            for field in fields.fields() {
                assert!(
                    !field.is_auto_increment || exception.matches(&schema.table, &field.name),
                    "{}.{} should have been excluded",
                    schema.table,
                    field.name
                );
            }
        }
    }

    #[test]
    fn test_parse_enum_domain() {
        assert_eq!(
            parse_enum_domain("enum('A','B','C')"),
            Some(vec!["A".to_string(), "B".to_string(), "C".to_string()])
        );
        assert_eq!(parse_enum_domain("varchar(20)"), None);
        assert_eq!(parse_enum_domain("int"), None);
        assert_eq!(parse_enum_domain(""), None);
    }

    #[test]
    fn test_parse_enum_domain_case_and_spacing() {
        assert_eq!(
            parse_enum_domain("ENUM('Right-hand bat', 'Left-hand bat')"),
            Some(vec![
                "Right-hand bat".to_string(),
                "Left-hand bat".to_string()
            ])
        );
    }

    #[test]
    fn test_parse_enum_domain_escaped_quote_and_comma() {
        assert_eq!(
            parse_enum_domain("enum('it''s','a,b','')"),
            Some(vec!["it's".to_string(), "a,b".to_string(), String::new()])
        );
    }

    #[test]
    fn test_set_type_is_not_enum() {
        assert_eq!(parse_enum_domain("set('a','b')"), None);
    }
}

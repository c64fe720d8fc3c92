//! `wicket describe` - show a table as the engine sees it.

use anyhow::{Context, Result};
use wicket_adapter_mysql::MySqlDatabase;
use wicket_core::{AutoIncrementException, WicketConfig};
use wicket_engine::{TableSchema, build_insertable_fields, schema};

use crate::Credentials;

pub async fn run(config: &WicketConfig, credentials: &Credentials, table: &str) -> Result<()> {
    let mut db = MySqlDatabase::connect(&config.upstream, &credentials.user, &credentials.password)
        .await
        .context("failed to connect to upstream database")?;
    let schema = schema::describe(&mut db, table).await?;
    db.close().await?;

    for line in render(&schema, config.engine.auto_increment_exception.as_ref()) {
        println!("{line}");
    }
    Ok(())
}

fn render(schema: &TableSchema, exception: Option<&AutoIncrementException>) -> Vec<String> {
    let insertable = build_insertable_fields(schema, exception);
    let mut lines = vec![format!("Table {}", schema.table)];

    if schema.primary_key_columns().next().is_none() {
        lines.push("  (no primary key: rows cannot be updated or deleted)".to_string());
    } else if schema.has_composite_key() {
        lines.push("  (composite primary key: rows cannot be updated or deleted)".to_string());
    }

    for column in &schema.columns {
        let mut flags = Vec::new();
        if column.is_primary() {
            flags.push("primary".to_string());
        }
        if column.is_auto_increment {
            flags.push("auto_increment".to_string());
        }
        if !column.nullable {
            flags.push("not null".to_string());
        }
        if !insertable.contains(&column.name) {
            flags.push("skipped on insert".to_string());
        }
        if let Some(values) = column.enum_values() {
            flags.push(format!("one of {}", values.join("|")));
        }
        lines.push(format!(
            "  {:<24} {:<32} {}",
            column.name,
            column.declared_type,
            flags.join(", ")
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use wicket_engine::ColumnDescriptor;

    fn matches() -> TableSchema {
        TableSchema::new(
            "MATCHES",
            vec![
                ColumnDescriptor::new("match_id", "int")
                    .primary()
                    .auto_increment(),
                ColumnDescriptor::new("status", "enum('Scheduled','Completed')"),
            ],
        )
    }

    #[test]
    fn test_render_marks_skipped_auto_increment() {
        let lines = render(&matches(), None);
        assert!(lines[1].contains("skipped on insert"));
        assert!(lines[2].contains("one of Scheduled|Completed"));
    }

    #[test]
    fn test_render_honours_exception() {
        let exception = AutoIncrementException::new("MATCHES", "match_id");
        let lines = render(&matches(), Some(&exception));
        assert!(!lines[1].contains("skipped on insert"));
    }
}

use serde_json::{Value, json};
use sqlx::mysql::{MySqlConnection, MySqlRow};
use sqlx::Row;
use wicket_engine::RawColumn;

/// Describe `table` in the connection's current database.
///
/// Reads `information_schema.COLUMNS` rather than `DESCRIBE` so the table
/// name is a bound parameter. A table that does not exist yields no rows.
pub async fn describe_table(
    conn: &mut MySqlConnection,
    table: &str,
) -> Result<Vec<RawColumn>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        select
          cast(column_name as char) as name,
          cast(column_type as char) as column_type,
          cast(is_nullable as char) as is_nullable,
          cast(column_key as char) as column_key,
          cast(column_default as char) as column_default,
          cast(extra as char) as extra
        from information_schema.columns
        where table_schema = database() and table_name = ?
        order by ordinal_position
        "#,
    )
    .bind(table)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(raw_column).collect()
}

fn raw_column(row: &MySqlRow) -> Result<RawColumn, sqlx::Error> {
    let is_nullable: String = row.try_get("is_nullable")?;
    Ok(RawColumn {
        name: row.try_get("name")?,
        column_type: row.try_get("column_type")?,
        nullable: is_nullable.eq_ignore_ascii_case("YES"),
        key: row.try_get::<Option<String>, _>("column_key")?.unwrap_or_default(),
        default: row.try_get("column_default")?,
        extra: row.try_get::<Option<String>, _>("extra")?.unwrap_or_default(),
    })
}

/// Base tables in the connection's current database, by name.
pub async fn list_tables(conn: &mut MySqlConnection) -> Result<Vec<String>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        select cast(table_name as char) as name
        from information_schema.tables
        where table_schema = database() and table_type = 'BASE TABLE'
        order by table_name
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(|r| r.try_get("name")).collect()
}

/// Snapshot every table's columns as JSON.
pub async fn introspect_schema_json(conn: &mut MySqlConnection) -> Result<Value, sqlx::Error> {
    let (database, version): (Option<String>, String) =
        sqlx::query_as("select cast(database() as char), cast(version() as char)")
            .fetch_one(&mut *conn)
            .await?;

    let mut tables = Vec::new();
    for table in list_tables(conn).await? {
        let columns: Vec<Value> = describe_table(conn, &table)
            .await?
            .into_iter()
            .map(|c| {
                json!({
                    "name": c.name,
                    "type": c.column_type,
                    "nullable": c.nullable,
                    "key": c.key,
                    "default": c.default,
                    "extra": c.extra,
                })
            })
            .collect();
        tables.push(json!({ "name": table, "columns": columns }));
    }

    Ok(json!({
        "captured_at": chrono::Utc::now().to_rfc3339(),
        "database": {
            "kind": "mysql",
            "name": database,
            "version": version
        },
        "tables": tables
    }))
}

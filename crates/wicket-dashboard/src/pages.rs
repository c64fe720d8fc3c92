//! Page renderers.
//!
//! Each function takes engine output and returns a full HTML page.

use crate::templates::{self, escape};
use wicket_engine::{
    DeleteForm, FormField, InsertForm, MutationOutcome, ResultSet, UpdateForm,
};

/// Form field carrying the selected primary key value.
pub const KEY_FIELD: &str = "__key";
/// Form field set on the second phase of a delete.
pub const CONFIRM_FIELD: &str = "__confirm";

type NavUser<'a> = Option<(&'a str, &'a str)>;

fn enc(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

fn outcome_html(outcome: Option<&MutationOutcome>) -> String {
    outcome
        .map(|o| templates::alert(&o.message, o.success))
        .unwrap_or_default()
}

/// Table list with per-table links.
pub fn dashboard_page(user: NavUser<'_>, project: &str, tables: &[String], can_write: bool) -> String {
    let rows: String = tables
        .iter()
        .map(|table| {
            let actions = if can_write {
                templates::link_button("Actions", &format!("/actions/{}", enc(table)), "primary")
            } else {
                String::new()
            };
            format!(
                r##"<li class="flex items-center justify-between py-3">
                    <span class="font-mono text-gray-900">{name}</span>
                    <span class="flex gap-2">{view}{actions}</span>
                </li>"##,
                name = escape(table),
                view = templates::link_button("View", &format!("/viewdb/{}", enc(table)), "secondary"),
            )
        })
        .collect();

    let body = if tables.is_empty() {
        templates::empty_state("database", "No tables", "This account cannot see any tables.")
    } else {
        format!(r#"<ul class="divide-y divide-gray-200">{rows}</ul>"#)
    };

    templates::layout(
        "Tables",
        user,
        &templates::card(&format!("{} tables", project), &body),
    )
}

/// Table picker for the view page.
pub fn view_database_page(user: NavUser<'_>, tables: &[String]) -> String {
    let links: String = tables
        .iter()
        .map(|t| {
            format!(
                r#"<a href="/viewdb/{href}" class="block px-4 py-2 rounded-lg hover:bg-emerald-50 font-mono">{name}</a>"#,
                href = enc(t),
                name = escape(t)
            )
        })
        .collect();
    templates::layout(
        "View Database",
        user,
        &templates::card("Choose a table", &links),
    )
}

/// One table's rows, through its curated view when there is one.
pub fn view_table_page(user: NavUser<'_>, table: &str, rows: &ResultSet, curated: bool) -> String {
    let subtitle = if curated {
        templates::badge("curated view", "emerald")
    } else {
        String::new()
    };
    let content = format!(
        r##"<div class="flex items-center gap-3">{subtitle}<span class="text-sm text-gray-500">{count} rows</span></div>
        {table_html}
        <div>{back}</div>"##,
        count = rows.len(),
        table_html = templates::result_table(rows),
        back = templates::link_button("All tables", "/viewdb", "secondary"),
    );
    templates::layout(table, user, &templates::card(table, &content))
}

/// Links to the write paths for a table.
pub fn actions_page(user: NavUser<'_>, table: &str) -> String {
    let t = enc(table);
    let content = format!(
        r##"<div class="flex gap-3">{insert}{update}{delete}{view}</div>"##,
        insert = templates::link_button("Insert", &format!("/insert/{t}"), "primary"),
        update = templates::link_button("Update", &format!("/update/{t}"), "primary"),
        delete = templates::link_button("Delete", &format!("/delete/{t}"), "danger"),
        view = templates::link_button("View", &format!("/viewdb/{t}"), "secondary"),
    );
    templates::layout(
        table,
        user,
        &templates::card(&format!("Actions for {}", table), &content),
    )
}

/// Input for one column: enum columns become selects.
fn field_input(field: &FormField) -> String {
    let value = field.value.as_deref();
    let mut label = field.name.clone();
    if !field.nullable {
        label.push_str(" *");
    }
    match &field.enum_values {
        Some(values) => templates::select(&field.name, &label, values, value),
        None => templates::input(
            &field.name,
            &label,
            value.unwrap_or_default(),
            &field.declared_type,
        ),
    }
}

pub fn insert_page(user: NavUser<'_>, form: &InsertForm, outcome: Option<&MutationOutcome>) -> String {
    let inputs: String = form.fields.iter().map(field_input).collect();
    let note = if form.aggregate {
        r#"<p class="text-sm text-gray-500">Rows with an existing key are merged into the current totals.</p>"#
    } else {
        ""
    };
    let existing = if form.aggregate && !form.existing.is_empty() {
        templates::card("Current totals", &templates::result_table(&form.existing))
    } else {
        String::new()
    };

    let content = format!(
        r##"{message}{note}
        <form method="POST" action="/insert/{table}" class="space-y-4">
            {inputs}
            {submit}
        </form>"##,
        message = outcome_html(outcome),
        table = enc(&form.table),
        submit = templates::submit_button("Insert", "primary"),
    );

    templates::layout(
        &format!("Insert into {}", form.table),
        user,
        &format!(
            "{}{}",
            templates::card(&format!("Insert into {}", form.table), &content),
            existing
        ),
    )
}

/// Rows with a per-row action keyed on the primary key.
fn row_picker(rows: &ResultSet, primary_key: &str, action: impl Fn(&str) -> String) -> String {
    if rows.is_empty() {
        return templates::empty_state("table", "No rows", "There is nothing to pick from.");
    }
    let headers: String = std::iter::once("")
        .chain(rows.columns.iter().map(String::as_str))
        .map(|h| {
            format!(
                r#"<th class="px-4 py-2 text-left text-xs text-gray-500 uppercase">{}</th>"#,
                escape(h)
            )
        })
        .collect();
    let body: String = (0..rows.len())
        .map(|i| {
            let key = rows
                .value(i, primary_key)
                .map(templates::cell_display)
                .unwrap_or_default();
            let cells: String = rows.rows[i]
                .iter()
                .map(|v| {
                    format!(
                        r#"<td class="px-4 py-2 text-sm">{}</td>"#,
                        escape(&templates::cell_display(v))
                    )
                })
                .collect();
            format!(
                r#"<tr class="hover:bg-gray-50"><td class="px-4 py-2">{}</td>{cells}</tr>"#,
                action(&key)
            )
        })
        .collect();
    format!(
        r#"<div class="overflow-x-auto"><table class="min-w-full divide-y divide-gray-200"><thead class="bg-gray-50"><tr>{headers}</tr></thead><tbody class="divide-y divide-gray-200">{body}</tbody></table></div>"#
    )
}

pub fn update_page(user: NavUser<'_>, form: &UpdateForm, outcome: Option<&MutationOutcome>) -> String {
    let table = enc(&form.table);
    let picker = row_picker(&form.rows, &form.primary_key, |key| {
        templates::link_button("Edit", &format!("/update/{table}?key={}", enc(key)), "secondary")
    });

    let editor = match &form.selected_key {
        Some(key) => {
            let inputs: String = form.fields.iter().map(field_input).collect();
            templates::card(
                &format!("Edit {} = {}", form.primary_key, key),
                &format!(
                    r##"<form method="POST" action="/update/{table}" class="space-y-4">
                        {hidden}{inputs}{submit}
                    </form>"##,
                    hidden = templates::hidden(KEY_FIELD, key),
                    submit = templates::submit_button("Save", "primary"),
                ),
            )
        }
        None => String::new(),
    };

    templates::layout(
        &format!("Update {}", form.table),
        user,
        &format!(
            "{}{}{}",
            outcome_html(outcome),
            editor,
            templates::card(&format!("Rows in {}", form.table), &picker)
        ),
    )
}

pub fn delete_page(user: NavUser<'_>, form: &DeleteForm, outcome: Option<&MutationOutcome>) -> String {
    let table = enc(&form.table);
    let picker = row_picker(&form.rows, &form.primary_key, |key| {
        format!(
            r##"<form method="POST" action="/delete/{table}">{hidden}{submit}</form>"##,
            hidden = templates::hidden(KEY_FIELD, key),
            submit = templates::submit_button("Delete", "danger"),
        )
    });
    templates::layout(
        &format!("Delete from {}", form.table),
        user,
        &format!(
            "{}{}",
            outcome_html(outcome),
            templates::card(&format!("Rows in {}", form.table), &picker)
        ),
    )
}

/// Second phase of a delete: show the row and ask for confirmation.
pub fn delete_confirm_page(user: NavUser<'_>, table: &str, key: &str, row: &ResultSet) -> String {
    let content = format!(
        r##"<p class="text-gray-700">This row will be deleted permanently.</p>
        {row_html}
        <form method="POST" action="/delete/{action}" class="flex gap-3">
            {key_input}{confirm_input}{submit}
            {cancel}
        </form>"##,
        row_html = templates::result_table(row),
        action = enc(table),
        key_input = templates::hidden(KEY_FIELD, key),
        confirm_input = templates::hidden(CONFIRM_FIELD, "yes"),
        submit = templates::submit_button("Confirm delete", "danger"),
        cancel = templates::link_button("Cancel", &format!("/delete/{}", enc(table)), "secondary"),
    );
    templates::layout(
        &format!("Delete from {}", table),
        user,
        &templates::card("Confirm delete", &content),
    )
}

/// Query console.
pub fn query_page(
    user: NavUser<'_>,
    sql: &str,
    rows: Option<&ResultSet>,
    outcome: Option<&MutationOutcome>,
) -> String {
    let result = rows.map(templates::result_table).unwrap_or_default();
    let content = format!(
        r##"{message}
        <form method="POST" action="/query" class="space-y-4">
            <textarea name="sql" rows="6" class="w-full px-4 py-2 border border-gray-300 rounded-lg font-mono">{sql}</textarea>
            {submit}
        </form>
        {result}"##,
        message = outcome_html(outcome),
        sql = escape(sql),
        submit = templates::submit_button("Run", "primary"),
    );
    templates::layout("Query", user, &templates::card("Run a query", &content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(name: &str, enum_values: Option<Vec<&str>>) -> FormField {
        FormField {
            name: name.to_string(),
            declared_type: "varchar(20)".to_string(),
            nullable: true,
            is_primary: false,
            enum_values: enum_values.map(|v| v.into_iter().map(String::from).collect()),
            value: None,
        }
    }

    #[test]
    fn test_insert_page_renders_enum_as_select() {
        let form = InsertForm {
            table: "MATCHES".to_string(),
            fields: vec![
                field("venue_id", None),
                field("status", Some(vec!["Scheduled", "Completed"])),
            ],
            aggregate: false,
            existing: ResultSet::default(),
        };
        let html = insert_page(None, &form, None);
        assert!(html.contains(r#"<select name="status""#));
        assert!(html.contains(r#"<input type="text" name="venue_id""#));
        assert!(html.contains(r#"action="/insert/MATCHES""#));
    }

    #[test]
    fn test_delete_confirm_carries_key_and_flag() {
        let row = ResultSet::new(vec!["team_id".to_string()], vec![vec![json!(5)]]);
        let html = delete_confirm_page(None, "TEAMS", "5", &row);
        assert!(html.contains(r#"name="__key" value="5""#));
        assert!(html.contains(r#"name="__confirm" value="yes""#));
    }

    #[test]
    fn test_dashboard_hides_actions_from_viewers() {
        let tables = vec!["TEAMS".to_string()];
        let html = dashboard_page(Some(("viewer1", "viewer")), "league", &tables, false);
        assert!(!html.contains("/actions/TEAMS"));
        let html = dashboard_page(Some(("admin", "manager")), "league", &tables, true);
        assert!(html.contains("/actions/TEAMS"));
    }

    #[test]
    fn test_update_picker_links_to_row() {
        let form = UpdateForm {
            table: "TEAMS".to_string(),
            primary_key: "team_id".to_string(),
            rows: ResultSet::new(
                vec!["team_id".to_string(), "team_name".to_string()],
                vec![vec![json!(3), json!("Lions")]],
            ),
            selected_key: None,
            fields: Vec::new(),
        };
        let html = update_page(None, &form, None);
        assert!(html.contains("/update/TEAMS?key=3"));
    }
}

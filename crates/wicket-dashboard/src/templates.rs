//! HTML templates for the dashboard.
//!
//! Plain `format!` templates styled with Tailwind from the CDN. Every value
//! that comes from the database or the user goes through [`escape`].

use serde_json::Value;
use wicket_engine::ResultSet;

/// Base HTML layout wrapper.
///
/// `user` is shown in the nav bar; `None` renders the logged-out variant.
pub fn layout(title: &str, user: Option<(&str, &str)>, content: &str) -> String {
    let nav = nav_template(user);
    let title = escape(title);
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Wicket</title>
    <script src="https://cdn.tailwindcss.com"></script>
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css">
</head>
<body class="bg-gray-50 min-h-screen">
    {nav}
    <main class="p-6 lg:p-8">
        <div class="max-w-7xl mx-auto space-y-6">
            {content}
        </div>
    </main>
</body>
</html>"##
    )
}

fn nav_template(user: Option<(&str, &str)>) -> String {
    let right = match user {
        Some((name, role)) => format!(
            r##"<div class="flex items-center gap-4 text-sm">
                <a href="/dashboard" class="hover:underline">Tables</a>
                <a href="/viewdb" class="hover:underline">View Database</a>
                <a href="/query" class="hover:underline">Query</a>
                <span class="flex items-center gap-2"><i class="fas fa-user"></i>{name} {role}</span>
                <a href="/logout" class="bg-emerald-800 hover:bg-emerald-900 px-3 py-1 rounded-lg">Logout</a>
            </div>"##,
            name = escape(name),
            role = badge(role, if role == "viewer" { "gray" } else { "amber" }),
        ),
        None => String::new(),
    };
    format!(
        r##"<nav class="bg-emerald-700 text-white px-4 py-3 shadow-lg">
        <div class="flex items-center justify-between max-w-7xl mx-auto">
            <a href="/dashboard" class="flex items-center gap-2 font-semibold">
                <i class="fas fa-baseball-bat-ball"></i> Wicket
            </a>
            {right}
        </div>
    </nav>"##
    )
}

/// Card component.
pub fn card(title: &str, content: &str) -> String {
    format!(
        r##"<div class="bg-white rounded-xl shadow-sm border border-gray-200 overflow-hidden">
            <div class="px-6 py-4 border-b border-gray-200">
                <h3 class="text-lg font-semibold text-gray-900">{title}</h3>
            </div>
            <div class="p-6">
                {content}
            </div>
        </div>"##,
        title = escape(title),
    )
}

/// Status message above a form.
pub fn alert(message: &str, success: bool) -> String {
    let (color, icon) = if success {
        ("green", "check-circle")
    } else {
        ("red", "exclamation-circle")
    };
    format!(
        r##"<div class="p-4 bg-{color}-50 border border-{color}-200 rounded-lg text-{color}-700 flex items-center gap-3">
            <i class="fas fa-{icon}"></i><span>{message}</span>
        </div>"##,
        message = escape(message),
    )
}

pub fn badge(text: &str, color: &str) -> String {
    format!(
        r##"<span class="inline-flex items-center px-2.5 py-0.5 rounded-full text-xs font-medium bg-{color}-100 text-{color}-800">{text}</span>"##,
        text = escape(text),
    )
}

/// Link styled as a button.
pub fn link_button(text: &str, href: &str, variant: &str) -> String {
    let classes = button_classes(variant);
    format!(r##"<a href="{href}" class="{classes} px-4 py-2 rounded-lg font-medium inline-block">{text}</a>"##)
}

pub fn submit_button(text: &str, variant: &str) -> String {
    let classes = button_classes(variant);
    format!(r##"<button type="submit" class="{classes} px-4 py-2 rounded-lg font-medium">{text}</button>"##)
}

fn button_classes(variant: &str) -> &'static str {
    match variant {
        "primary" => "bg-emerald-600 hover:bg-emerald-700 text-white",
        "danger" => "bg-red-600 hover:bg-red-700 text-white",
        _ => "bg-gray-200 hover:bg-gray-300 text-gray-700",
    }
}

/// Text input.
pub fn input(name: &str, label: &str, value: &str, placeholder: &str) -> String {
    format!(
        r##"<div class="space-y-1">
            <label for="{name}" class="block text-sm font-medium text-gray-700">{label}</label>
            <input type="text" name="{name}" id="{name}" value="{value}" placeholder="{placeholder}"
                   class="w-full px-4 py-2 border border-gray-300 rounded-lg focus:ring-2 focus:ring-emerald-500">
        </div>"##,
        name = escape(name),
        label = escape(label),
        value = escape(value),
        placeholder = escape(placeholder),
    )
}

/// Select with an empty first option, so NULL stays reachable.
pub fn select(name: &str, label: &str, options: &[String], selected: Option<&str>) -> String {
    let options_html: String = options
        .iter()
        .map(|option| {
            let marker = if selected == Some(option.as_str()) { " selected" } else { "" };
            format!(
                r#"<option value="{value}"{marker}>{value}</option>"#,
                value = escape(option)
            )
        })
        .collect();

    format!(
        r##"<div class="space-y-1">
            <label for="{name}" class="block text-sm font-medium text-gray-700">{label}</label>
            <select name="{name}" id="{name}" class="w-full px-4 py-2 border border-gray-300 rounded-lg">
                <option value=""></option>
                {options_html}
            </select>
        </div>"##,
        name = escape(name),
        label = escape(label),
    )
}

pub fn hidden(name: &str, value: &str) -> String {
    format!(
        r#"<input type="hidden" name="{}" value="{}">"#,
        escape(name),
        escape(value)
    )
}

/// Render a result set. Cells are escaped.
pub fn result_table(rows: &ResultSet) -> String {
    if rows.columns.is_empty() {
        return empty_state("table", "No rows", "The query returned no rows.");
    }

    let headers_html: String = rows
        .columns
        .iter()
        .map(|h| {
            format!(
                r#"<th class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">{}</th>"#,
                escape(h)
            )
        })
        .collect();

    let rows_html: String = rows
        .rows
        .iter()
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|cell| {
                    format!(
                        r#"<td class="px-6 py-4 whitespace-nowrap text-sm text-gray-900">{}</td>"#,
                        escape(&cell_display(cell))
                    )
                })
                .collect();
            format!(r#"<tr class="hover:bg-gray-50">{cells}</tr>"#)
        })
        .collect();

    format!(
        r##"<div class="overflow-x-auto">
            <table class="min-w-full divide-y divide-gray-200">
                <thead class="bg-gray-50"><tr>{headers_html}</tr></thead>
                <tbody class="bg-white divide-y divide-gray-200">{rows_html}</tbody>
            </table>
        </div>"##
    )
}

/// Empty state component.
pub fn empty_state(icon: &str, title: &str, description: &str) -> String {
    format!(
        r##"<div class="text-center py-12">
            <i class="fas fa-{icon} text-4xl text-gray-400 mb-4"></i>
            <h3 class="text-lg font-medium text-gray-900">{title}</h3>
            <p class="mt-1 text-gray-500">{description}</p>
        </div>"##,
        title = escape(title),
        description = escape(description),
    )
}

/// Display text of a cell; NULL shows as an empty cell.
pub fn cell_display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// HTML-escape text for element content and quoted attributes.
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

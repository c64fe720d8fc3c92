//! `wicket views` - list the curated read views.

use wicket_engine::CuratedViews;

pub fn run(show_sql: bool) {
    let views = CuratedViews::standard();
    for table in views.tables() {
        println!("{table}");
        if show_sql && let Some(sql) = views.get(table) {
            for line in sql.lines() {
                println!("    {}", line.trim_end());
            }
            println!();
        }
    }
}

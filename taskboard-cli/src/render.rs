//! Plain-text rendering of the task list and form errors.

use taskboard_core::{FieldErrors, SortDirection, SortKey, Task, TaskStore, ViewState};

const TITLE_WIDTH: usize = 28;
const DESCRIPTION_WIDTH: usize = 36;

fn clip(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('~');
    out
}

fn sort_marker(view: &ViewState) -> &'static str {
    match view.sort.direction_of(SortKey::Date) {
        None => "-",
        Some(SortDirection::Ascending) => "^",
        Some(SortDirection::Descending) => "v",
    }
}

fn row(task: &Task) -> String {
    format!(
        "{:<8}  {:<tw$}  {:<dw$}  {:<10}  {}",
        clip(&task.id, 8),
        clip(&task.title, TITLE_WIDTH),
        clip(task.description.as_deref().unwrap_or(""), DESCRIPTION_WIDTH),
        clip(&task.date, 10),
        task.status,
        tw = TITLE_WIDTH,
        dw = DESCRIPTION_WIDTH,
    )
}

/// The list view: loading and error states replace the table.
pub fn render_list(store: &TaskStore, view: &ViewState) -> String {
    if store.is_loading() {
        return "Loading...".to_string();
    }
    if let Some(err) = store.error() {
        return format!("An error occurred: {err}");
    }

    let rows = view.project(store.tasks());
    let mut out = String::new();
    out.push_str(&format!(
        "Tasks ({} of {}, filter: {})\n",
        rows.len(),
        store.len(),
        view.filter
    ));
    out.push_str(&format!(
        "{:<8}  {:<tw$}  {:<dw$}  {:<10}  {}\n",
        "ID",
        "Title",
        "Description",
        format!("Created {}", sort_marker(view)),
        "Status",
        tw = TITLE_WIDTH,
        dw = DESCRIPTION_WIDTH,
    ));
    if rows.is_empty() {
        out.push_str("(no tasks)\n");
    }
    for t in rows {
        out.push_str(&row(t));
        out.push('\n');
    }
    out
}

pub fn render_status_counts(store: &TaskStore) -> String {
    store
        .counts_by_status()
        .iter()
        .map(|(status, n)| format!("{status}: {n}"))
        .collect::<Vec<_>>()
        .join(" | ")
}

pub fn render_field_errors(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("  {field}: {message}"))
        .collect::<Vec<_>>()
        .join("\n")
}

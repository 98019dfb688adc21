//! Pure state-to-markup functions. Nothing here reads from the DOM.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use taskio_gui_shared::{TaskDto, TaskStatus};

use crate::board::BoardColumns;
use crate::notify::Toast;
use crate::route::RouteName;

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

pub fn load_error(route: RouteName) -> String {
    format!(
        r#"<p class="view-error" role="alert">Error loading the view "{}"</p>"#,
        escape_html(route.as_str())
    )
}

pub fn format_due(due: Option<DateTime<Utc>>, tz: Tz) -> String {
    due.map(|value| value.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "No due date".to_string())
}

pub fn task_card(task: &TaskDto, tz: Tz) -> String {
    let id = escape_html(task.id.as_str());
    let detail = task.detail.as_deref().unwrap_or_default();
    format!(
        r#"<article class="card" draggable="true" data-task-id="{id}" data-status="{status}">
  <h3>{title}</h3>
  <p>{detail}</p>
  <small>{due} · {label}</small>
  <div class="card-actions">
    <button type="button" class="btn-edit" data-action="edit" data-task-id="{id}">Edit</button>
    <button type="button" class="btn-delete" data-action="delete" data-task-id="{id}">Delete</button>
  </div>
</article>"#,
        status = task.status.as_str(),
        title = escape_html(&task.title),
        detail = escape_html(detail),
        due = escape_html(&format_due(task.due_date, tz)),
        label = task.status.label(),
    )
}

/// Rendered body of one board column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMarkup {
    pub status: TaskStatus,
    pub count: usize,
    pub highlighted: bool,
    pub body: String,
}

pub fn board_columns(
    columns: &BoardColumns,
    highlight: Option<TaskStatus>,
    tz: Tz,
) -> Vec<ColumnMarkup> {
    TaskStatus::ALL
        .into_iter()
        .map(|status| {
            let tasks = columns.get(status);
            let body = if tasks.is_empty() {
                r#"<p class="column-empty">No tasks</p>"#.to_string()
            } else {
                tasks
                    .iter()
                    .map(|task| task_card(task, tz))
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            ColumnMarkup {
                status,
                count: tasks.len(),
                highlighted: highlight == Some(status),
                body,
            }
        })
        .collect()
}

pub fn delete_confirm(task: &TaskDto) -> String {
    format!(
        r#"<div class="confirm-delete">
  <h2>Delete task</h2>
  <p>Delete "{title}"? This cannot be undone.</p>
  <div class="modal-actions">
    <button type="button" class="btn-cancel" data-action="cancel-delete">Cancel</button>
    <button type="button" class="btn-danger" data-action="confirm-delete">Delete</button>
  </div>
</div>"#,
        title = escape_html(&task.title)
    )
}

pub fn modal_frame(inner: &str) -> String {
    format!(
        r#"<div class="modal-backdrop" data-modal="backdrop"></div>
<div class="modal-dialog" role="dialog" aria-modal="true" data-modal="dialog">
{inner}
</div>"#
    )
}

pub fn toast(toast: &Toast) -> String {
    format!(
        r#"<div class="toast toast-{kind}" role="status">{message}</div>"#,
        kind = toast.kind.as_str(),
        message = escape_html(&toast.message)
    )
}

#[cfg(test)]
mod tests {
    use taskio_gui_shared::TaskId;

    use super::*;

    fn task(id: &str, title: &str) -> TaskDto {
        TaskDto {
            id: TaskId::from(id),
            title: title.to_string(),
            detail: None,
            status: TaskStatus::Todo,
            due_date: None,
        }
    }

    #[test]
    fn escapes_markup_in_user_fields() {
        let card = task_card(&task("1", "<script>x</script>"), chrono_tz::UTC);
        assert!(card.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!card.contains("<script>"));
    }

    #[test]
    fn card_carries_identifier_for_drag_and_actions() {
        let card = task_card(&task("abc", "Write docs"), chrono_tz::UTC);
        assert!(card.contains(r#"draggable="true""#));
        assert_eq!(card.matches(r#"data-task-id="abc""#).count(), 3);
    }

    #[test]
    fn load_error_names_route() {
        assert!(load_error(RouteName::TaskList).contains(r#""taskList""#));
    }
}

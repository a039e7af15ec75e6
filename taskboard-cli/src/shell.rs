use anyhow::Result;
use std::io::{self, Write};
use taskboard_core::{SortKey, StatusFilter, Task, TaskDraft, ViewState};
use taskboard_sync::{SubmitError, SyncController, TaskApi};

use crate::render::{render_field_errors, render_list, render_status_counts};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Refresh,
    ToggleSort,
    Filter(StatusFilter),
    Add,
    Edit(String),
    Delete(String),
    Counts,
    Help,
    Quit,
}

const CLEAR_FIELD: &str = "-";

const HELP: &str = "\
r            refresh from server
s            toggle sort by created date
f <status>   filter: all | to do | in progress | completed
a            add a task
e <id>       edit a task
d <id>       delete a task
c            counts by status
q            quit";

/// Blank input parses to `None`.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim()),
        None => (line, ""),
    };

    let needs_id = |cmd: fn(String) -> ShellCommand| {
        if rest.is_empty() {
            Err(format!("usage: {head} <id>"))
        } else {
            Ok(Some(cmd(rest.to_string())))
        }
    };

    match head.to_lowercase().as_str() {
        "r" | "refresh" => Ok(Some(ShellCommand::Refresh)),
        "s" | "sort" => Ok(Some(ShellCommand::ToggleSort)),
        "f" | "filter" => {
            let arg = if rest.is_empty() { "all" } else { rest };
            arg.parse::<StatusFilter>()
                .map(|f| Some(ShellCommand::Filter(f)))
                .map_err(|e| e.to_string())
        }
        "a" | "add" => Ok(Some(ShellCommand::Add)),
        "e" | "edit" => needs_id(ShellCommand::Edit),
        "d" | "delete" => needs_id(ShellCommand::Delete),
        "c" | "counts" => Ok(Some(ShellCommand::Counts)),
        "h" | "help" | "?" => Ok(Some(ShellCommand::Help)),
        "q" | "quit" | "exit" => Ok(Some(ShellCommand::Quit)),
        other => Err(format!("unknown command {other:?} (h for help)")),
    }
}

fn prompt(label: &str) -> Result<Option<String>> {
    print!("{label}: ");
    io::stdout().flush().ok();
    let mut s = String::new();
    if io::stdin().read_line(&mut s)? == 0 {
        return Ok(None);
    }
    Ok(Some(s.trim_end_matches(['\r', '\n']).to_string()))
}

/// Form prompts. With `initial`, a blank answer keeps the current value.
/// Blank keeps the current description, `-` clears it.
fn apply_description(draft: &mut TaskDraft, answer: String) {
    match answer.as_str() {
        "" => {}
        CLEAR_FIELD => draft.description = None,
        _ => draft.description = Some(answer),
    }
}

fn prompt_draft(initial: Option<&Task>) -> Result<Option<TaskDraft>> {
    let mut draft = initial.map(TaskDraft::from_task).unwrap_or_else(|| TaskDraft::new(""));
    let keep = |current: &str| {
        if initial.is_some() { format!(" [{current}]") } else { String::new() }
    };

    let Some(title) = prompt(&format!("Task name{}", keep(&draft.title)))? else {
        return Ok(None);
    };
    if !title.is_empty() || initial.is_none() {
        draft.title = title;
    }

    let current_desc = draft.description.clone().unwrap_or_default();
    let hint = if initial.is_some() { " ('-' clears)" } else { "" };
    let Some(desc) = prompt(&format!("Description{hint}{}", keep(&current_desc)))? else {
        return Ok(None);
    };
    apply_description(&mut draft, desc);

    let Some(status) = prompt(&format!("Status (To Do / In Progress / Completed) [{}]", draft.status))?
    else {
        return Ok(None);
    };
    if !status.is_empty() {
        draft.status = status;
    }

    Ok(Some(draft))
}

fn report(err: &SubmitError) {
    match err.field_errors() {
        Some(fields) => println!("Fix the following:\n{}", render_field_errors(fields)),
        None => println!("Error: {err}"),
    }
}

pub async fn run_shell<A: TaskApi>(ctl: &SyncController<A>, mut view: ViewState) -> Result<()> {
    println!("taskboard shell (h for help)");
    ctl.fetch_tasks().await;
    println!("{}", ctl.store().read(|s| render_list(s, &view)));

    loop {
        let Some(line) = prompt(">")? else { break };
        let cmd = match parse_command(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(msg) => {
                println!("{msg}");
                continue;
            }
        };

        match cmd {
            ShellCommand::Quit => break,
            ShellCommand::Help => {
                println!("{HELP}");
                continue;
            }
            ShellCommand::Counts => {
                println!("{}", ctl.store().read(render_status_counts));
                continue;
            }
            ShellCommand::Refresh => {
                ctl.fetch_tasks().await;
            }
            ShellCommand::ToggleSort => view.sort.request_sort(SortKey::Date),
            ShellCommand::Filter(f) => view.filter = f,
            ShellCommand::Add => {
                if let Some(draft) = prompt_draft(None)? {
                    if let Err(e) = ctl.create_task(&draft, |t| println!("Added {}", t.id)).await {
                        report(&e);
                    }
                }
            }
            ShellCommand::Edit(id) => {
                let Some(current) = ctl.store().read(|s| s.get(&id).cloned()) else {
                    println!("No task with id '{id}'");
                    continue;
                };
                if let Some(draft) = prompt_draft(Some(&current))? {
                    if let Err(e) = ctl.edit_task(&id, &draft, |t| println!("Saved {}", t.id)).await {
                        report(&e);
                    }
                }
            }
            ShellCommand::Delete(id) => {
                if let Err(e) = ctl.delete_task(&id, |t| println!("Deleted {}", t.id)).await {
                    report(&e);
                }
            }
        }

        println!("{}", ctl.store().read(|s| render_list(s, &view)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_core::TaskStatus;

    #[test]
    fn description_answer_keeps_sets_or_clears() {
        let mut draft = TaskDraft::new("Write notes").with_description("draft one");

        apply_description(&mut draft, String::new());
        assert_eq!(draft.description.as_deref(), Some("draft one"));

        apply_description(&mut draft, "draft two".into());
        assert_eq!(draft.description.as_deref(), Some("draft two"));

        apply_description(&mut draft, "-".into());
        assert_eq!(draft.description, None);
    }

    #[test]
    fn parses_simple_commands() {
        assert_eq!(parse_command("r"), Ok(Some(ShellCommand::Refresh)));
        assert_eq!(parse_command("  SORT "), Ok(Some(ShellCommand::ToggleSort)));
        assert_eq!(parse_command(""), Ok(None));
        assert_eq!(parse_command("q"), Ok(Some(ShellCommand::Quit)));
    }

    #[test]
    fn parses_filter_arguments() {
        assert_eq!(
            parse_command("f in progress"),
            Ok(Some(ShellCommand::Filter(StatusFilter::Only(TaskStatus::InProgress))))
        );
        assert_eq!(parse_command("f"), Ok(Some(ShellCommand::Filter(StatusFilter::All))));
        assert!(parse_command("f someday").is_err());
    }

    #[test]
    fn id_commands_require_an_id() {
        assert_eq!(parse_command("e a1b2"), Ok(Some(ShellCommand::Edit("a1b2".into()))));
        assert_eq!(parse_command("delete x"), Ok(Some(ShellCommand::Delete("x".into()))));
        assert!(parse_command("d").is_err());
    }

    #[test]
    fn unknown_command_is_an_error() {
        assert!(parse_command("launch").is_err());
    }
}

use report_core::Msg;
use thiserror::Error;

use crate::platform::app::ShellEvent;

pub const HELP: &str = "\
Commands:
  start | cancel | delete | download | refresh
  first | prev | next | last
  types <a,b,...>    block types to export (empty clears)
  root <block id>    root block to export from
  users <list>       usernames, forwarded as typed
  match <text>       answer text to match
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("unknown command `{0}`; type `help` for the list")]
    Unknown(String),
}

/// Parses one console line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ShellEvent>, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let msg = match command.to_ascii_lowercase().as_str() {
        "help" | "?" => return Ok(Some(ShellEvent::Help)),
        "quit" | "exit" | "q" => return Ok(Some(ShellEvent::Quit)),
        "start" => Msg::StartClicked,
        "cancel" => Msg::CancelClicked,
        "delete" => Msg::DeleteClicked,
        "download" => Msg::DownloadClicked,
        "refresh" => Msg::RefreshClicked,
        "first" => Msg::FirstPageClicked,
        "prev" | "previous" => Msg::PreviousPageClicked,
        "next" => Msg::NextPageClicked,
        "last" => Msg::LastPageClicked,
        "types" => Msg::BlockTypesSelected(split_list(rest)),
        "root" => Msg::RootBlockChanged(rest.to_string()),
        "users" => Msg::UsernamesChanged(rest.to_string()),
        "match" => Msg::MatchStringChanged(rest.to_string()),
        other => return Err(InputError::Unknown(other.to_string())),
    };
    Ok(Some(ShellEvent::Msg(msg)))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

//! Purpose: Line-oriented shell over `AppShell` for `doclib shell`.
//! Exports: `run_shell`, `StdioPrompt`.
//! Role: Map typed commands onto controller calls, then print the active view.
//! Invariants: A failing command never ends the session; only `quit` or EOF do.
//! Invariants: The active view is re-synced before every render.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::str::FromStr;

use doclib::api::{DocumentApi, Error, ErrorKind};
use doclib::app::{AppEvent, AppShell, EditField, FileSource, Prompt, View};

use super::load_upload_file;

const HELP: &str = "\
commands:
  view <search|upload|manage>   switch tabs
  search <query>                run a search (switches to the search tab)
  clear                         clear the search box
  title|authors|tags <text>     fill the upload form
  file <path>                   select a file to upload
  drop <path>                   drop a file onto the upload form
  unfile                        remove the selected file
  submit                        upload the selected file
  filter <tags>                 filter the manage grid by tags
  refresh                       reload the manage grid
  edit <id>                     start editing a document
  set <title|authors|tags|content> <text>
                                change a field of the open edit
  save | cancel                 finish the open edit
  delete <id>                   delete a document (asks first)
  show                          print the active view
  help                          print this help
  quit                          leave the shell";

/// Asks on stderr and reads the answer from stdin.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct StdioPrompt;

impl Prompt for StdioPrompt {
    fn confirm(&mut self, message: &str) -> bool {
        eprint!("{message} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }

    fn alert(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

#[derive(Clone, Debug, PartialEq)]
enum ShellCommand {
    View(View),
    Search(String),
    Clear,
    Title(String),
    Authors(String),
    Tags(String),
    File(PathBuf),
    Drop(PathBuf),
    Unfile,
    Submit,
    Filter(String),
    Refresh,
    Edit(String),
    Set(EditField, String),
    Save,
    Cancel,
    Delete(String),
    Show,
    Help,
    Quit,
}

/// Returns `Ok(None)` for blank lines.
fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let required = |what: &str| {
        if rest.is_empty() {
            Err(format!("`{verb}` needs {what}"))
        } else {
            Ok(rest.to_string())
        }
    };
    let command = match verb {
        "view" => ShellCommand::View(View::from_str(&required("a view name")?)?),
        "search" => ShellCommand::Search(rest.to_string()),
        "clear" => ShellCommand::Clear,
        "title" => ShellCommand::Title(rest.to_string()),
        "authors" => ShellCommand::Authors(rest.to_string()),
        "tags" => ShellCommand::Tags(rest.to_string()),
        "file" => ShellCommand::File(PathBuf::from(required("a path")?)),
        "drop" => ShellCommand::Drop(PathBuf::from(required("a path")?)),
        "unfile" => ShellCommand::Unfile,
        "submit" => ShellCommand::Submit,
        "filter" => ShellCommand::Filter(rest.to_string()),
        "refresh" => ShellCommand::Refresh,
        "edit" => ShellCommand::Edit(required("a document id")?),
        "set" => {
            let rest = required("a field and a value")?;
            let (field, value) = match rest.split_once(char::is_whitespace) {
                Some((field, value)) => (field, value.trim()),
                None => (rest.as_str(), ""),
            };
            ShellCommand::Set(EditField::from_str(field)?, value.to_string())
        }
        "save" => ShellCommand::Save,
        "cancel" => ShellCommand::Cancel,
        "delete" => ShellCommand::Delete(required("a document id")?),
        "show" => ShellCommand::Show,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("unknown command `{other}` (try `help`)")),
    };
    Ok(Some(command))
}

pub(crate) async fn run_shell<A: DocumentApi>(api: &A) -> Result<(), Error> {
    let interactive = io::stdin().is_terminal();
    let mut shell = AppShell::new();
    let mut prompt = StdioPrompt;
    if interactive {
        println!("{}\n\nType `help` for commands.", shell.render());
    }

    loop {
        if interactive {
            print!("doclib> ");
            let _ = io::stdout().flush();
        }
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read shell input")
                .with_source(err)
        })?;
        if read == 0 {
            break;
        }

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };
        match command {
            ShellCommand::Quit => break,
            ShellCommand::Help => {
                println!("{HELP}");
                continue;
            }
            command => {
                if let Err(err) = apply(&mut shell, command, api, &mut prompt).await {
                    eprintln!("error: {}", err.detail());
                }
            }
        }
        shell.sync(api).await;
        println!("{}", shell.render());
    }
    Ok(())
}

async fn apply<A: DocumentApi, P: Prompt>(
    shell: &mut AppShell,
    command: ShellCommand,
    api: &A,
    prompt: &mut P,
) -> Result<(), Error> {
    match command {
        ShellCommand::View(view) => shell.handle(AppEvent::Navigate(view)),
        ShellCommand::Search(query) => {
            shell.switch_to(View::Search);
            shell.search_bar.set_input(query);
            shell.run_search(api).await;
        }
        ShellCommand::Clear => shell.search_bar.clear(),
        ShellCommand::Title(text) => shell.upload.set_title(text),
        ShellCommand::Authors(text) => shell.upload.set_authors(text),
        ShellCommand::Tags(text) => shell.upload.set_tags(text),
        ShellCommand::File(path) => {
            shell.switch_to(View::Upload);
            let file = load_upload_file(&path, None).await?;
            shell.upload.select_file(file, FileSource::Browse);
        }
        ShellCommand::Drop(path) => {
            shell.switch_to(View::Upload);
            shell.upload.drag_enter();
            match load_upload_file(&path, None).await {
                Ok(file) => {
                    shell.upload.select_file(file, FileSource::Drop);
                }
                Err(err) => {
                    shell.upload.drag_leave();
                    return Err(err);
                }
            }
        }
        ShellCommand::Unfile => shell.upload.remove_file(),
        ShellCommand::Submit => {
            shell.switch_to(View::Upload);
            shell.submit_upload(api).await;
        }
        ShellCommand::Filter(text) => {
            shell.management.set_filter(text);
            if shell.active() == View::Manage {
                shell.management.apply_filter(api).await;
            } else {
                // Entering Manage remounts; the next sync loads with the filter.
                shell.switch_to(View::Manage);
            }
        }
        ShellCommand::Refresh => {
            shell.switch_to(View::Manage);
            shell.management.refresh(api).await;
        }
        ShellCommand::Edit(id) => {
            shell.switch_to(View::Manage);
            shell.sync(api).await;
            if !shell.management.start_edit(&id) {
                return Err(Error::new(ErrorKind::NotFound)
                    .with_message(format!("no loaded document with id {id}")));
            }
        }
        ShellCommand::Set(field, value) => match shell.management.draft_mut() {
            Some(draft) => draft.set(field, value),
            None => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("no document is being edited (use `edit <id>`)"));
            }
        },
        ShellCommand::Save => {
            shell.management.save_edit(api, prompt).await;
        }
        ShellCommand::Cancel => shell.management.cancel_edit(),
        ShellCommand::Delete(id) => {
            shell.switch_to(View::Manage);
            shell.sync(api).await;
            shell.management.delete(&id, api, prompt).await;
        }
        ShellCommand::Show | ShellCommand::Help | ShellCommand::Quit => {}
    }
    Ok(())
}

//! Purpose: Hold top-level CLI command dispatch for `doclib`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: `search` and `upload` run through the same controllers the shell uses;
//!             the other commands call `DocumentClient` directly.
//! Invariants: `--json` prints records exactly as the API returned them.

use super::*;

use doclib::api::{DocumentApi, DocumentClient, DocumentUpdate, NewDocument};
use doclib::app::{
    AppEvent, DocumentUpload, FileSource, Prompt, ResultList, SearchBar,
    confirm_delete_message, render_document,
};
use doclib::core::format::plural;
use doclib::core::validate::split_list;

pub(super) async fn dispatch_command(
    command: Command,
    config: ClientConfig,
    output: Output,
) -> Result<RunOutcome, Error> {
    if let Command::Completion { shell } = command {
        let mut cmd = Cli::command();
        clap_complete::aot::generate(shell, &mut cmd, "doclib", &mut io::stdout());
        return Ok(RunOutcome::ok());
    }

    let client = DocumentClient::from_config(&config)?;
    match command {
        Command::Search { query, limit } => {
            let mut bar = SearchBar::new();
            bar.set_input(query.join(" "));
            let Some(query) = bar.submit() else {
                return Err(Error::validation("Please enter a search query")
                    .with_hint("Pass one or more words, e.g. `doclib search neural networks`."));
            };
            let results = client.search(&query, limit).await?;
            match output {
                Output::Json => emit_record(&results)?,
                Output::Human => println!("{}", ResultList::new().render(&results)),
            }
            Ok(RunOutcome::ok())
        }
        Command::List { skip, limit, tags } => {
            let tags = tags.as_deref().map(str::trim).filter(|tags| !tags.is_empty());
            let documents = client.list_documents(skip, limit, tags).await?;
            match output {
                Output::Json => emit_record(&documents)?,
                Output::Human => {
                    for document in &documents {
                        println!("{}\n", render_document(document));
                    }
                    println!("Total: {}", plural(documents.len(), "document"));
                }
            }
            Ok(RunOutcome::ok())
        }
        Command::Get { id } => {
            let document = client.get_document(&id).await?;
            emit_document(&document, output)?;
            Ok(RunOutcome::ok())
        }
        Command::Create {
            title,
            content,
            content_file,
            authors,
            tags,
        } => {
            if title.trim().is_empty() {
                return Err(Error::validation("Please enter a title"));
            }
            let content = match (content, content_file) {
                (Some(content), _) => content,
                (None, Some(path)) => tokio::fs::read_to_string(&path).await.map_err(|err| {
                    Error::new(ErrorKind::Io)
                        .with_message(format!("failed to read {}", path.display()))
                        .with_source(err)
                })?,
                (None, None) => {
                    return Err(Error::new(ErrorKind::Usage)
                        .with_message("create requires --content or --content-file")
                        .with_hint("Use `--content <TEXT>` or `--content-file <PATH>`."));
                }
            };
            let document = NewDocument {
                title: title.trim().to_string(),
                content,
                authors: split_list(&authors),
                tags: split_list(&tags),
                metadata: None,
            };
            let created = client.create_document(&document).await?;
            emit_document(&created, output)?;
            Ok(RunOutcome::ok())
        }
        Command::Upload {
            file,
            title,
            authors,
            tags,
            mime,
        } => {
            let selected = load_upload_file(&file, mime.as_deref()).await?;
            let mut form = DocumentUpload::new();
            if let Some(title) = title {
                form.set_title(title);
            }
            form.set_authors(authors);
            form.set_tags(tags);
            if !form.select_file(selected, FileSource::Browse) {
                return Err(upload_failure(&mut form));
            }
            match form.submit(&client).await {
                Some(AppEvent::Uploaded(document)) => {
                    if output == Output::Human {
                        eprintln!("{}", doclib::app::SUCCESS_MESSAGE);
                    }
                    emit_document(&document, output)?;
                    Ok(RunOutcome::ok())
                }
                _ => Err(upload_failure(&mut form)),
            }
        }
        Command::Update {
            id,
            title,
            authors,
            tags,
            content,
        } => {
            let update = DocumentUpdate {
                title,
                authors: authors.as_deref().map(split_list),
                tags: tags.as_deref().map(split_list),
                content,
            };
            if update.is_empty() {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("nothing to update")
                    .with_hint("Pass at least one of --title, --authors, --tags, or --content."));
            }
            let updated = client.update_document(&id, &update).await?;
            emit_document(&updated, output)?;
            Ok(RunOutcome::ok())
        }
        Command::Delete { id, yes } => {
            let title = if yes {
                None
            } else {
                let document = client.get_document(&id).await?;
                let mut prompt = interactive::StdioPrompt;
                if !prompt.confirm(&confirm_delete_message(&document.title)) {
                    eprintln!("Cancelled.");
                    return Ok(RunOutcome::ok());
                }
                Some(document.title)
            };
            client.delete_document(&id).await?;
            match (output, title) {
                (Output::Json, _) => emit_json(json!({ "deleted": id })),
                (Output::Human, Some(title)) => println!("Deleted \"{title}\" [{id}]"),
                (Output::Human, None) => println!("Deleted [{id}]"),
            }
            Ok(RunOutcome::ok())
        }
        Command::Shell => {
            interactive::run_shell(&client).await?;
            Ok(RunOutcome::ok())
        }
        Command::Completion { .. } => Ok(RunOutcome::ok()),
    }
}

fn emit_document(document: &doclib::api::Document, output: Output) -> Result<(), Error> {
    match output {
        Output::Json => emit_record(document),
        Output::Human => {
            println!("{}", render_document(document));
            Ok(())
        }
    }
}

fn upload_failure(form: &mut DocumentUpload) -> Error {
    form.take_error().unwrap_or_else(|| {
        Error::new(ErrorKind::Internal).with_message("upload did not complete")
    })
}

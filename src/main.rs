use anyhow::{Context, Result};
use book_catalog::catalog_service::{
    AuthorService, BookService, CatalogError, CatalogResult, GenreService, PublisherService,
};
use book_catalog::catalog_store::{
    AuthorFilter, BookFilter, NameFilter, Session, SortOrder, SqliteCatalogStore,
};
use book_catalog::config::{AppConfig, CliConfig, FileConfig, LogLevel};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[clap(version, about = "Manage a catalog of authors, books, genres and publishers")]
struct CliArgs {
    /// Path to a TOML config file. Its values override the flags below.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite catalog database file. Created on first use.
    #[clap(long = "db", value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Log verbosity. The LOG_LEVEL environment variable takes precedence.
    #[clap(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    #[clap(subcommand)]
    pub command: EntityCommand,
}

#[derive(Subcommand, Debug)]
enum EntityCommand {
    /// Authors and the books they are credited on.
    Authors {
        #[clap(subcommand)]
        command: AuthorCommand,
    },
    /// Books with their authors, genre and publisher.
    Books {
        #[clap(subcommand)]
        command: BookCommand,
    },
    Genres {
        #[clap(subcommand)]
        command: NamedCommand,
    },
    Publishers {
        #[clap(subcommand)]
        command: NamedCommand,
    },
}

#[derive(Subcommand, Debug)]
enum AuthorCommand {
    /// List authors, optionally filtered by name and surname.
    List {
        /// Case-insensitive substring of the first name.
        #[clap(long)]
        name: Option<String>,
        /// Case-insensitive substring of the surname.
        #[clap(long)]
        surname: Option<String>,
        #[clap(flatten)]
        sort: SortArgs,
    },
    #[clap(flatten)]
    Record(RecordCommand),
}

#[derive(Subcommand, Debug)]
enum BookCommand {
    /// List books, optionally filtered by title and references.
    List {
        /// Case-insensitive substring of the title.
        #[clap(long)]
        title: Option<String>,
        #[clap(long)]
        genre_id: Option<i64>,
        #[clap(long)]
        publisher_id: Option<i64>,
        #[clap(long)]
        author_id: Option<i64>,
        #[clap(flatten)]
        sort: SortArgs,
    },
    #[clap(flatten)]
    Record(RecordCommand),
}

/// Commands for entities identified by a unique name (genres, publishers).
#[derive(Subcommand, Debug)]
enum NamedCommand {
    /// List records, optionally filtered by name.
    List {
        /// Case-insensitive substring of the name.
        #[clap(long)]
        name: Option<String>,
        #[clap(flatten)]
        sort: SortArgs,
    },
    #[clap(flatten)]
    Record(RecordCommand),
}

/// Single-record commands shared by every entity.
#[derive(Subcommand, Debug)]
enum RecordCommand {
    /// Show one record.
    Get { id: i64 },
    /// Create a record from a JSON payload.
    Create { json: String },
    /// Apply a partial JSON payload to a record. Fields set to null are cleared.
    Update { id: i64, json: String },
    /// Delete a record.
    Delete { id: i64 },
}

#[derive(Args, Debug)]
struct SortArgs {
    /// Field to sort by. Unknown fields fall back to the default.
    #[clap(long)]
    sort_by: Option<String>,

    /// Sort descending.
    #[clap(long, conflicts_with = "asc")]
    desc: bool,

    /// Sort ascending.
    #[clap(long)]
    asc: bool,
}

impl SortArgs {
    fn order(&self, default: SortOrder) -> SortOrder {
        if self.desc {
            SortOrder::Desc
        } else if self.asc {
            SortOrder::Asc
        } else {
            default
        }
    }
}

// =============================================================================
// Dispatch
// =============================================================================

fn to_json<T: Serialize>(value: T) -> CatalogResult<Value> {
    serde_json::to_value(value).map_err(|e| CatalogError::Store(e.into()))
}

fn parse_payload<T: DeserializeOwned>(json: &str) -> CatalogResult<T> {
    serde_json::from_str(json).map_err(|e| CatalogError::Validation(format!("Invalid payload: {}", e)))
}

fn deleted(id: i64) -> Value {
    json!({ "deleted": true, "id": id })
}

fn run_authors(session: &Session<'_>, command: AuthorCommand, order: SortOrder) -> CatalogResult<Value> {
    let service = AuthorService::new(session);
    match command {
        AuthorCommand::List {
            name,
            surname,
            sort,
        } => to_json(service.list(&AuthorFilter {
            name,
            surname,
            order: sort.order(order),
            sort_by: sort.sort_by,
        })?),
        AuthorCommand::Record(RecordCommand::Get { id }) => to_json(service.get(id)?),
        AuthorCommand::Record(RecordCommand::Create { json }) => {
            to_json(service.create(parse_payload(&json)?)?)
        }
        AuthorCommand::Record(RecordCommand::Update { id, json }) => {
            to_json(service.update(id, parse_payload(&json)?)?)
        }
        AuthorCommand::Record(RecordCommand::Delete { id }) => {
            service.delete(id)?;
            Ok(deleted(id))
        }
    }
}

fn run_books(session: &Session<'_>, command: BookCommand, order: SortOrder) -> CatalogResult<Value> {
    let service = BookService::new(session);
    match command {
        BookCommand::List {
            title,
            genre_id,
            publisher_id,
            author_id,
            sort,
        } => to_json(service.list(&BookFilter {
            title,
            genre_id,
            publisher_id,
            author_id,
            order: sort.order(order),
            sort_by: sort.sort_by,
        })?),
        BookCommand::Record(RecordCommand::Get { id }) => to_json(service.get(id)?),
        BookCommand::Record(RecordCommand::Create { json }) => {
            to_json(service.create(parse_payload(&json)?)?)
        }
        BookCommand::Record(RecordCommand::Update { id, json }) => {
            to_json(service.update(id, parse_payload(&json)?)?)
        }
        BookCommand::Record(RecordCommand::Delete { id }) => {
            service.delete(id)?;
            Ok(deleted(id))
        }
    }
}

fn name_filter(name: Option<String>, sort: SortArgs, order: SortOrder) -> NameFilter {
    NameFilter {
        name,
        order: sort.order(order),
        sort_by: sort.sort_by,
    }
}

fn run_genres(session: &Session<'_>, command: NamedCommand, order: SortOrder) -> CatalogResult<Value> {
    let service = GenreService::new(session);
    match command {
        NamedCommand::List { name, sort } => to_json(service.list(&name_filter(name, sort, order))?),
        NamedCommand::Record(RecordCommand::Get { id }) => to_json(service.get(id)?),
        NamedCommand::Record(RecordCommand::Create { json }) => {
            to_json(service.create(parse_payload(&json)?)?)
        }
        NamedCommand::Record(RecordCommand::Update { id, json }) => {
            to_json(service.update(id, parse_payload(&json)?)?)
        }
        NamedCommand::Record(RecordCommand::Delete { id }) => {
            service.delete(id)?;
            Ok(deleted(id))
        }
    }
}

fn run_publishers(
    session: &Session<'_>,
    command: NamedCommand,
    order: SortOrder,
) -> CatalogResult<Value> {
    let service = PublisherService::new(session);
    match command {
        NamedCommand::List { name, sort } => to_json(service.list(&name_filter(name, sort, order))?),
        NamedCommand::Record(RecordCommand::Get { id }) => to_json(service.get(id)?),
        NamedCommand::Record(RecordCommand::Create { json }) => {
            to_json(service.create(parse_payload(&json)?)?)
        }
        NamedCommand::Record(RecordCommand::Update { id, json }) => {
            to_json(service.update(id, parse_payload(&json)?)?)
        }
        NamedCommand::Record(RecordCommand::Delete { id }) => {
            service.delete(id)?;
            Ok(deleted(id))
        }
    }
}

fn execute(store: &SqliteCatalogStore, command: EntityCommand, order: SortOrder) -> CatalogResult<Value> {
    store.session(|session| match command {
        EntityCommand::Authors { command } => run_authors(session, command, order),
        EntityCommand::Books { command } => run_books(session, command, order),
        EntityCommand::Genres { command } => run_genres(session, command, order),
        EntityCommand::Publishers { command } => run_publishers(session, command, order),
    })
}

fn error_body(err: &CatalogError) -> Value {
    json!({
        "kind": err.kind(),
        "status": err.status_code(),
        "message": err.to_string(),
    })
}

fn main() -> Result<ExitCode> {
    let cli_args = CliArgs::parse();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        db_path: cli_args.db_path.clone(),
        log_level: cli_args.log_level,
    };
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(app_config.log_level.level_filter().into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    info!("Opening SQLite catalog database at {:?}...", app_config.db_path);
    let store = SqliteCatalogStore::new(&app_config.db_path)?;

    match execute(&store, cli_args.command, app_config.default_sort_order) {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            warn!("Command failed ({}): {}", err.kind(), err);
            println!("{}", serde_json::to_string_pretty(&error_body(&err))?);
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_book_list_flags() {
        let args = CliArgs::try_parse_from([
            "book-catalog",
            "--db",
            "/tmp/catalog.db",
            "books",
            "list",
            "--title",
            "case",
            "--genre-id",
            "3",
            "--desc",
        ])
        .unwrap();

        match args.command {
            EntityCommand::Books {
                command:
                    BookCommand::List {
                        title,
                        genre_id,
                        sort,
                        ..
                    },
            } => {
                assert_eq!(title.as_deref(), Some("case"));
                assert_eq!(genre_id, Some(3));
                assert_eq!(sort.order(SortOrder::Asc), SortOrder::Desc);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_sort_direction_defaults_to_config() {
        let args =
            CliArgs::try_parse_from(["book-catalog", "genres", "list", "--sort-by", "id"]).unwrap();
        match args.command {
            EntityCommand::Genres {
                command: NamedCommand::List { sort, .. },
            } => {
                assert_eq!(sort.sort_by.as_deref(), Some("id"));
                assert_eq!(sort.order(SortOrder::Desc), SortOrder::Desc);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_asc_and_desc_conflict() {
        let result =
            CliArgs::try_parse_from(["book-catalog", "authors", "list", "--asc", "--desc"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_error_body() {
        let body = error_body(&CatalogError::not_found("Genre", 4));
        assert_eq!(
            body,
            json!({
                "kind": "not_found",
                "status": 404,
                "message": "Genre with id 4 not found",
            })
        );
    }

    #[test]
    fn test_invalid_payload_is_a_validation_error() {
        let err = parse_payload::<book_catalog::catalog_service::NewGenre>("{not json").unwrap_err();
        assert_eq!(err.kind(), book_catalog::ErrorKind::Validation);
    }

    #[test]
    fn test_execute_against_in_memory_store() {
        let store = SqliteCatalogStore::in_memory().unwrap();
        let created = execute(
            &store,
            EntityCommand::Genres {
                command: NamedCommand::Record(RecordCommand::Create {
                    json: r#"{"name": "Mystery"}"#.to_string(),
                }),
            },
            SortOrder::Asc,
        )
        .unwrap();
        assert_eq!(created["name"], "Mystery");

        let err = execute(
            &store,
            EntityCommand::Genres {
                command: NamedCommand::Record(RecordCommand::Delete { id: 99 }),
            },
            SortOrder::Asc,
        )
        .unwrap_err();
        assert_eq!(error_body(&err)["status"], 404);
    }
}

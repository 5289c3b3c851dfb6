use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pagestore::application::PageRepository;
use pagestore::domain::{base::Entity, ApplicationId, Page, PageId};
use pagestore::infrastructure::persistence::{DocumentPageRepository, SqliteDocumentStore};
use pagestore::infrastructure::security::{InMemoryPermissionGroups, StaticSecurityContext};
use pagestore::{logging, StoreConfig};
use std::path::{Path, PathBuf};

type CliRepository =
    DocumentPageRepository<SqliteDocumentStore, StaticSecurityContext, InMemoryPermissionGroups>;

/// Command line interface for the page store
#[derive(Parser, Debug)]
#[command(name = "pagestore")]
#[command(about = "Import and query pages of a SQLite document store")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    config: StoreConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Store every page of a JSON array
    Import { file: PathBuf },

    /// List the pages of an application
    List {
        application_id: String,

        /// Skip pages whose draft is deleted
        #[arg(long)]
        edit: bool,
    },

    /// Print a page's display name
    Name {
        page_id: String,

        /// Prefer the published name
        #[arg(long)]
        published: bool,
    },

    /// Print the page slugs of the applications
    Slugs {
        #[arg(required = true)]
        application_ids: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(&cli.config.log_filter)?;
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    if matches!(cli.command, Command::Import { .. }) && cli.config.is_in_memory() {
        bail!(
            "import needs a database file: pass --db <PATH> or set {}",
            pagestore::config::DB_PATH_VAR
        );
    }

    // The CLI runs with system access: no principal and no ACL filter
    let mut repo: CliRepository = DocumentPageRepository::new(
        open_store(&cli.config)?,
        StaticSecurityContext::anonymous(),
        InMemoryPermissionGroups::new(),
    );

    match cli.command {
        Command::Import { file } => import_pages(&mut repo, &file),
        Command::List {
            application_id,
            edit,
        } => {
            let application_id = ApplicationId::new(application_id)?;
            let pages = if edit {
                repo.find_by_application_id_and_non_deleted_edit_mode(&application_id, None)?
            } else {
                repo.find_by_application_id(&application_id, None)?
            };
            for page in pages {
                println!("{}\t{}", page.id(), page.name(false).unwrap_or_default());
            }
            Ok(())
        }
        Command::Name { page_id, published } => {
            let page_id = PageId::new(page_id)?;
            match repo.get_name_by_page_id(&page_id, published)? {
                Some(name) => println!("{}", name),
                None => bail!("Page {} not found", page_id),
            }
            Ok(())
        }
        Command::Slugs { application_ids } => {
            let application_ids = application_ids
                .into_iter()
                .map(ApplicationId::new)
                .collect::<Result<Vec<_>, _>>()?;
            for page in repo.find_slugs_by_application_ids(&application_ids, None)? {
                let slug = page
                    .unpublished_page()
                    .and_then(|draft| draft.custom_slug().or(draft.slug()))
                    .unwrap_or_default();
                println!("{}\t{}\t{}", page.application_id(), page.id(), slug);
            }
            Ok(())
        }
    }
}

fn open_store(config: &StoreConfig) -> Result<SqliteDocumentStore> {
    match &config.database_path {
        Some(path) => SqliteDocumentStore::new_with_path(path)
            .with_context(|| format!("Failed to open {}", path.display())),
        None => SqliteDocumentStore::new_in_memory().context("Failed to open in-memory store"),
    }
}

fn import_pages(repo: &mut CliRepository, path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let pages: Vec<Page> = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid page document in {}", path.display()))?;

    let count = pages.len();
    for page in pages {
        repo.save(page)?;
    }

    tracing::info!("Imported {} pages from {}", count, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pagestore::domain::PageVariant;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("pagestore").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_global_flags_before_command() {
        let cli = parse(&["--db", "pages.db", "list", "app-1", "--edit"]).unwrap();

        assert_eq!(cli.config.database_path, Some(PathBuf::from("pages.db")));
        assert_eq!(
            cli.command,
            Command::List {
                application_id: "app-1".to_string(),
                edit: true,
            }
        );
    }

    #[test]
    fn test_slugs_requires_an_application() {
        let err = parse(&["slugs"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let cli = parse(&["slugs", "app-1", "app-2"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Slugs {
                application_ids: vec!["app-1".to_string(), "app-2".to_string()],
            }
        );
    }

    #[test]
    fn test_db_value_is_not_taken_from_command_arguments() {
        let cli = parse(&["name", "--db"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_import_refuses_in_memory_store() {
        let cli = Cli {
            config: StoreConfig::default(),
            command: Command::Import {
                file: PathBuf::from("pages.json"),
            },
        };

        let err = run(cli).unwrap_err();
        assert!(err.to_string().contains("--db"));
    }

    #[test]
    fn test_import_persists_to_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("pages.db");
        let file = dir.path().join("pages.json");

        let page = Page::create(ApplicationId::new("app-1").unwrap(), PageVariant::new("Home"));
        std::fs::write(&file, serde_json::to_string(&vec![page.clone()]).unwrap()).unwrap();

        run(Cli {
            config: StoreConfig::default().with_database_path(&db),
            command: Command::Import { file },
        })
        .unwrap();

        let store = SqliteDocumentStore::new_with_path(&db).unwrap();
        assert_eq!(store.count::<Page>().unwrap(), 1);

        let repo: CliRepository = DocumentPageRepository::new(
            store,
            StaticSecurityContext::anonymous(),
            InMemoryPermissionGroups::new(),
        );
        assert_eq!(
            repo.get_name_by_page_id(page.id(), false).unwrap().as_deref(),
            Some("Home")
        );
    }
}

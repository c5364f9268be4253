//! CLI commands implementation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use console::style;

use tenderfile::config::Config;
use tenderfile::error::ServiceResponse;
use tenderfile::models::{CardType, FilingContext, ManualFiling, UploadLocation};
use tenderfile::repository::{
    DocumentRepository, DocumentStore, FirmRepository, QueueRepository,
};
use tenderfile::services::{FileOutcome, IngestionCoordinator, UploadFile};
use tenderfile::storage::{FsObjectStore, ObjectStore};

#[derive(Parser)]
#[command(name = "tender")]
#[command(about = "Document filing and ingestion for construction tender packages")]
#[command(version)]
pub struct Cli {
    /// Data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Upload context flags shared by `ingest` and `preview`.
#[derive(clap::Args, Clone)]
struct ContextArgs {
    /// Upload location (plan_card, consultant_card, contractor_card,
    /// document_card, general)
    #[arg(long, default_value = "general")]
    location: String,
    /// Card type (CONSULTANT or CONTRACTOR)
    #[arg(long)]
    card_type: Option<String>,
    /// Discipline (consultants) or trade (contractors) label
    #[arg(long)]
    discipline: Option<String>,
    /// Section name hint
    #[arg(long)]
    section: Option<String>,
    /// Firm the documents relate to
    #[arg(long)]
    firm: Option<String>,
    /// Also list the documents in the general document listing
    #[arg(long)]
    show_in_documents: bool,
}

impl ContextArgs {
    fn to_context(&self) -> anyhow::Result<FilingContext> {
        let upload_location = UploadLocation::parse(&self.location)
            .with_context(|| format!("unknown upload location '{}'", self.location))?;
        let card_type = match &self.card_type {
            Some(raw) => Some(
                CardType::parse(raw)
                    .with_context(|| format!("unknown card type '{}'", raw))?,
            ),
            None => None,
        };
        Ok(FilingContext {
            upload_location,
            card_type,
            discipline_or_trade: self.discipline.clone(),
            section_name: self.section.clone(),
            firm_name: self.firm.clone(),
            show_in_documents: self.show_in_documents,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,

    /// Ingest files into a project
    Ingest {
        /// Project identifier
        project: String,
        /// Files to upload
        files: Vec<PathBuf>,
        #[command(flatten)]
        context: ContextArgs,
        /// Manual override: folder path (requires --name, single file only)
        #[arg(long, requires = "name")]
        path: Option<String>,
        /// Manual override: display name (requires --path, single file only)
        #[arg(long, requires = "path")]
        name: Option<String>,
        /// Acting user
        #[arg(long, env = "USER")]
        user: Option<String>,
    },

    /// Preview where a file would be filed, without uploading
    Preview {
        /// Filename to classify
        file_name: String,
        #[command(flatten)]
        context: ContextArgs,
    },

    /// Re-queue a document for processing
    Retry {
        /// Document identifier
        document_id: String,
    },

    /// Soft-delete a document
    Delete {
        /// Document identifier
        document_id: String,
        /// Acting user
        #[arg(long, env = "USER")]
        user: Option<String>,
    },

    /// Show a project's filed documents and their processing state
    Status {
        /// Project identifier
        project: String,
        /// Include signed download URLs
        #[arg(long)]
        urls: bool,
    },
}

fn build_coordinator(config: &Config) -> anyhow::Result<IngestionCoordinator> {
    let db_path = config.database_path();
    let documents = Arc::new(DocumentRepository::new(&db_path)?);
    let firms = Arc::new(FirmRepository::new(&db_path)?);
    let queue = Arc::new(QueueRepository::new(&db_path)?);
    let objects = Arc::new(FsObjectStore::new(
        &config.blobs_dir(),
        &config.settings.bucket,
    ));
    Ok(IngestionCoordinator::new(documents, firms, queue, objects))
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.data_dir.clone())?;

    match cli.command {
        Commands::Init => {
            config.init()?;
            // Opening the repositories creates the schema.
            build_coordinator(&config)?;
            println!(
                "{} initialized data directory at {}",
                style("ok").green(),
                config.data_dir.display()
            );
            Ok(())
        }

        Commands::Ingest {
            project,
            files,
            context,
            path,
            name,
            user,
        } => {
            if files.is_empty() {
                bail!("no files given");
            }
            if path.is_some() && files.len() > 1 {
                bail!("--path/--name overrides apply to a single file");
            }
            let filing_context = context.to_context()?;
            let manual = match (path, name) {
                (Some(folder_path), Some(display_name)) => Some(ManualFiling {
                    folder_path,
                    display_name,
                }),
                _ => None,
            };

            let mut uploads = Vec::with_capacity(files.len());
            for file in &files {
                let content = std::fs::read(file)
                    .with_context(|| format!("reading {}", file.display()))?;
                let file_name = file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| file.display().to_string());
                let content_type = mime_guess::from_path(file)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string();
                uploads.push(UploadFile {
                    file_name,
                    content_type,
                    content,
                    manual: manual.clone(),
                });
            }

            let coordinator = build_coordinator(&config)?;
            let outcomes = coordinator
                .ingest(uploads, &filing_context, &project, user.as_deref())
                .await
                .map_err(|e| anyhow::anyhow!("{}: {}", e.code(), e))?;

            let mut failures = 0;
            for outcome in &outcomes {
                match outcome {
                    FileOutcome::Filed(doc) => println!(
                        "{} {} -> {}/{}",
                        style("filed").green(),
                        doc.original_filename,
                        doc.folder_path,
                        doc.display_name
                    ),
                    FileOutcome::Duplicate(doc) => println!(
                        "{} already stored as {}/{} ({})",
                        style("duplicate").yellow(),
                        doc.folder_path,
                        doc.display_name,
                        doc.id
                    ),
                    FileOutcome::Failed { file_name, error } => {
                        failures += 1;
                        println!(
                            "{} {}: {}",
                            style("failed").red(),
                            file_name,
                            error
                        );
                    }
                }
            }
            if failures > 0 {
                bail!("{} of {} files failed", failures, outcomes.len());
            }
            Ok(())
        }

        Commands::Preview { file_name, context } => {
            let filing_context = context.to_context()?;
            let preview = IngestionCoordinator::preview(&file_name, &filing_context);
            println!(
                "{}",
                serde_json::to_string_pretty(&ServiceResponse::ok(preview))?
            );
            Ok(())
        }

        Commands::Retry { document_id } => {
            let coordinator = build_coordinator(&config)?;
            let result = coordinator.queue().retry(&document_id).await;
            let response = ServiceResponse::from_result(result);
            println!("{}", serde_json::to_string_pretty(&response)?);
            if !response.success {
                bail!("retry failed");
            }
            Ok(())
        }

        Commands::Delete { document_id, user } => {
            let user = user.context("no acting user; pass --user")?;
            let coordinator = build_coordinator(&config)?;
            coordinator.delete_document(&document_id, &user).await?;
            println!("{} deleted {}", style("ok").green(), document_id);
            Ok(())
        }

        Commands::Status { project, urls } => {
            let db_path = config.database_path();
            let documents = DocumentRepository::new(&db_path)?;
            let objects =
                FsObjectStore::new(&config.blobs_dir(), &config.settings.bucket);
            let ttl = Duration::from_secs(config.settings.signed_url_ttl_secs);

            let docs = documents.list_active(&project).await?;
            if docs.is_empty() {
                println!("no documents in project {}", project);
                return Ok(());
            }
            for doc in &docs {
                println!(
                    "{:<10} {}/{} ({})",
                    doc.status.as_str(),
                    doc.folder_path,
                    doc.display_name,
                    doc.id
                );
                if urls {
                    match objects.signed_download_url(&doc.storage_key, ttl).await? {
                        Some(url) => println!("           {}", url),
                        None => println!("           {}", style("(blob missing)").red()),
                    }
                }
            }
            Ok(())
        }
    }
}

//! postman-sync CLI
//!
//! Command-line interface for converting OpenAPI specs to Postman collections
//! and keeping them in sync with the Postman API.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use postman_sync_client::{
    dispatch, ClientConfig, CollectionRequest, PostmanClient, DEFAULT_BASE_URL,
};
use postman_sync_common::{ApiKey, CollectionSummary, Operation};
use postman_sync_converter::{Converter, ConverterConfig, DEFAULT_CONVERTER};
use postman_sync_core::{
    load_document, CollectionStore, Orchestrator, SyncRequest, DEFAULT_WORKING_DIR,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "postman-sync")]
#[command(version, about = "Convert OpenAPI specs to Postman collections and sync them with the Postman API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Working directory holding the staged collection
    #[arg(long, global = true, default_value = DEFAULT_WORKING_DIR)]
    work_dir: PathBuf,

    /// Postman API base URL
    #[arg(long, global = true, env = "POSTMAN_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an OpenAPI spec to a Postman collection file
    #[command(after_help = "EXAMPLES:\n  \
        # Convert into the working directory (./docs/document-postman.json)\n  \
        postman-sync convert --spec openapi.yaml\n\n  \
        # Convert to an explicit path, tolerating converter warnings\n  \
        postman-sync convert --spec openapi.yaml --output pets.json --lenient")]
    Convert {
        /// Path to the OpenAPI spec
        #[arg(short, long)]
        spec: PathBuf,

        /// Output file (defaults to the working artifact)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        converter: ConverterArgs,
    },

    /// Convert an OpenAPI spec and import or update it in Postman
    #[command(after_help = "EXAMPLES:\n  \
        # Create a new collection\n  \
        postman-sync sync --spec openapi.yaml --api-key $POSTMAN_API_KEY\n\n  \
        # Update an existing collection\n  \
        postman-sync sync --spec openapi.yaml --id 1234-abcd")]
    Sync {
        /// Path to the OpenAPI spec
        #[arg(short, long)]
        spec: PathBuf,

        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        converter: ConverterArgs,
    },

    /// Import or update an existing collection JSON file
    #[command(after_help = "EXAMPLES:\n  \
        postman-sync push --collection pets.json\n  \
        postman-sync push --collection pets.json --id 1234-abcd")]
    Push {
        /// Path to the collection JSON
        #[arg(short, long)]
        collection: PathBuf,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Fetch a collection from Postman
    Fetch {
        /// Collection id or uid
        #[arg(long)]
        id: String,

        #[command(flatten)]
        auth: AuthArgs,

        /// Write the collection to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a collection from Postman
    Delete {
        /// Collection id or uid
        #[arg(long)]
        id: String,

        #[command(flatten)]
        auth: AuthArgs,
    },
}

#[derive(Args)]
struct AuthArgs {
    /// Postman API key
    #[arg(long, env = "POSTMAN_API_KEY", hide_env_values = true)]
    api_key: String,
}

#[derive(Args)]
struct TargetArgs {
    #[command(flatten)]
    auth: AuthArgs,

    /// Existing collection id (implies --operation update)
    #[arg(long)]
    id: Option<String>,

    /// Remote operation (defaults to update when --id is given, else import)
    #[arg(long)]
    operation: Option<SyncOperation>,
}

#[derive(Args)]
struct ConverterArgs {
    /// Converter executable
    #[arg(long, default_value = DEFAULT_CONVERTER)]
    converter: PathBuf,

    /// Do not treat converter stderr output as a failure
    #[arg(long)]
    lenient: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SyncOperation {
    /// Create a new collection
    Import,
    /// Replace an existing collection
    Update,
}

impl From<SyncOperation> for Operation {
    fn from(op: SyncOperation) -> Self {
        match op {
            SyncOperation::Import => Operation::Import,
            SyncOperation::Update => Operation::Update,
        }
    }
}

impl TargetArgs {
    fn into_request(self) -> SyncRequest {
        let operation = match (self.operation, &self.id) {
            (Some(op), _) => op.into(),
            (None, Some(_)) => Operation::Update,
            (None, None) => Operation::Import,
        };
        SyncRequest {
            operation,
            api_key: ApiKey::new(self.auth.api_key),
            collection_id: self.id,
        }
    }
}

impl ConverterArgs {
    fn build(&self) -> Converter {
        Converter::new(ConverterConfig {
            program: self.converter.clone(),
            strict: !self.lenient,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        println!("{} Verbose mode enabled", "→".cyan());
    }

    let client_config = ClientConfig {
        base_url: cli.base_url.clone(),
    };

    match cli.command {
        Commands::Convert {
            spec,
            output,
            converter,
        } => {
            let output = output.unwrap_or_else(|| {
                CollectionStore::new(&cli.work_dir)
                    .artifact_path()
                    .to_path_buf()
            });
            convert_command(&spec, &output, &converter, cli.verbose).await?;
        }
        Commands::Sync {
            spec,
            target,
            converter,
        } => {
            sync_command(
                &spec,
                target.into_request(),
                &converter,
                &cli.work_dir,
                client_config,
                cli.verbose,
            )
            .await?;
        }
        Commands::Push { collection, target } => {
            println!(
                "{} Loading collection: {}",
                "→".cyan(),
                collection.display()
            );
            let document = load_document(&collection)
                .await
                .with_context(|| format!("Failed to load collection {}", collection.display()))?;
            push_document(
                &document,
                target.into_request(),
                &cli.work_dir,
                client_config,
                cli.verbose,
            )
            .await?;
        }
        Commands::Fetch { id, auth, output } => {
            fetch_command(&id, auth, output.as_deref(), client_config).await?;
        }
        Commands::Delete { id, auth } => {
            delete_command(&id, auth, client_config).await?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "postman_sync=debug,postman_sync_core=debug,postman_sync_client=debug,postman_sync_converter=debug"
    } else {
        "postman_sync=info,postman_sync_core=info,postman_sync_client=warn,postman_sync_converter=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn convert_command(
    spec: &Path,
    output: &Path,
    args: &ConverterArgs,
    verbose: bool,
) -> Result<()> {
    println!("{} Converting spec: {}", "→".cyan(), spec.display());

    if verbose {
        println!("  Converter: {}", args.converter.display());
        println!("  Strict: {}", !args.lenient);
        println!("  Output: {}", output.display());
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let stdout = args
        .build()
        .convert(spec, output)
        .await
        .context("Failed to convert OpenAPI spec")?;

    if verbose && !stdout.trim().is_empty() {
        println!("{}", stdout.trim());
    }

    println!("\n{}", "✓ Conversion complete!".green().bold());
    println!("  📄 {}", output.display());

    Ok(())
}

async fn sync_command(
    spec: &Path,
    request: SyncRequest,
    args: &ConverterArgs,
    work_dir: &Path,
    client_config: ClientConfig,
    verbose: bool,
) -> Result<()> {
    // Converted output goes to a scratch file; the run resets the working directory
    let scratch = tempfile::tempdir().context("Failed to create temp dir")?;
    let converted = scratch.path().join("collection.json");

    convert_command(spec, &converted, args, verbose).await?;

    let document = load_document(&converted)
        .await
        .context("Failed to load converted collection")?;

    push_document(&document, request, work_dir, client_config, verbose).await
}

async fn push_document(
    document: &Value,
    request: SyncRequest,
    work_dir: &Path,
    client_config: ClientConfig,
    verbose: bool,
) -> Result<()> {
    let client = PostmanClient::new(client_config).context("Failed to create Postman client")?;
    let orchestrator = Orchestrator::new(CollectionStore::new(work_dir), client);

    println!(
        "{} Running {} against {}",
        "→".cyan(),
        request.operation.to_string().yellow(),
        orchestrator.api().base_url()
    );
    if verbose {
        println!(
            "  Working artifact: {}",
            orchestrator.store().artifact_path().display()
        );
        if let Some(id) = &request.collection_id {
            println!("  Collection: {}", id);
        }
    }

    let response = orchestrator
        .run(document, &request)
        .await
        .with_context(|| format!("Failed to {} collection", request.operation))?;

    let done = format!("✓ {} complete!", capitalize(request.operation.as_str()));
    println!("\n{}", done.green().bold());
    print_summary(&response)?;

    Ok(())
}

async fn fetch_command(
    id: &str,
    auth: AuthArgs,
    output: Option<&Path>,
    client_config: ClientConfig,
) -> Result<()> {
    let client = PostmanClient::new(client_config).context("Failed to create Postman client")?;
    let api_key = ApiKey::new(auth.api_key);

    eprintln!("{} Fetching collection {}", "→".cyan(), id.yellow());
    let response = dispatch(&client, &api_key, CollectionRequest::Fetch { id: Some(id) })
        .await
        .context("Failed to fetch collection")?;

    let pretty = serde_json::to_string_pretty(&response)?;
    match output {
        Some(path) => {
            tokio::fs::write(path, pretty)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("{} Saved to {}", "✓".green(), path.display());
        }
        None => println!("{}", pretty),
    }

    Ok(())
}

async fn delete_command(id: &str, auth: AuthArgs, client_config: ClientConfig) -> Result<()> {
    let client = PostmanClient::new(client_config).context("Failed to create Postman client")?;
    let api_key = ApiKey::new(auth.api_key);

    println!("{} Deleting collection {}", "→".cyan(), id.yellow());
    let response = dispatch(&client, &api_key, CollectionRequest::Delete { id: Some(id) })
        .await
        .context("Failed to delete collection")?;

    println!("\n{}", "✓ Delete complete!".green().bold());
    print_summary(&response)?;

    Ok(())
}

fn print_summary(response: &Value) -> Result<()> {
    match CollectionSummary::from_response(response) {
        Some(summary) => {
            println!("\n{}", "Collection:".bold());
            println!("  Id: {}", summary.id.yellow());
            if let Some(name) = &summary.name {
                println!("  Name: {}", name);
            }
            if let Some(uid) = &summary.uid {
                println!("  Uid: {}", uid.yellow());
            }
        }
        None => println!("{}", serde_json::to_string_pretty(response)?),
    }
    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_operation_defaults_to_update_with_id() {
        let cli = Cli::parse_from([
            "postman-sync",
            "push",
            "--collection",
            "pets.json",
            "--api-key",
            "key",
            "--id",
            "abc",
        ]);
        let Commands::Push { target, .. } = cli.command else {
            panic!("expected push");
        };
        let request = target.into_request();
        assert_eq!(request.operation, Operation::Update);
        assert_eq!(request.collection_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_operation_defaults_to_import() {
        let cli = Cli::parse_from([
            "postman-sync",
            "sync",
            "--spec",
            "openapi.yaml",
            "--api-key",
            "key",
        ]);
        let Commands::Sync {
            target, converter, ..
        } = cli.command
        else {
            panic!("expected sync");
        };
        assert_eq!(target.into_request().operation, Operation::Import);
        assert_eq!(converter.converter, PathBuf::from("openapi2postmanv2"));
        assert!(!converter.lenient);
        assert_eq!(cli.work_dir, PathBuf::from("./docs"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("import"), "Import");
        assert_eq!(capitalize(""), "");
    }
}

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};
use spnmux::batch::{create_single, read_names_file, BatchPrincipalCreator};
use spnmux::lookup::find_principals;
use spnmux::{config, factory, logging, Config, PrincipalQuery, ProviderType};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "spnmux", version, about = "Create and look up Azure AD service principals")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Identity provider (mock, azcli); defaults to SPNMUX_PROVIDER or mock
    #[arg(long, global = true)]
    provider: Option<ProviderType>,
    /// Role granted to created principals
    #[arg(long, global = true)]
    role: Option<String>,
    /// Scope the role is granted on
    #[arg(long, global = true)]
    scope: Option<String>,
    /// Credential expiry (YYYY-MM-DD or RFC 3339)
    #[arg(long, global = true)]
    expiry: Option<String>,
    /// Deadline for each provider call, in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    /// Path to the az executable
    #[arg(long, global = true)]
    az_path: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create one service principal per line of a file
    Batch {
        /// File with one display name per line
        #[arg(long, short)]
        file: PathBuf,
        /// Print generated secrets instead of [REDACTED]
        #[arg(long)]
        show_secrets: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a single service principal
    Create {
        /// Display name
        #[arg(long)]
        name: String,
        /// Create from the display name only, without a password credential
        #[arg(long)]
        no_password: bool,
        /// Print the generated secret instead of [REDACTED]
        #[arg(long)]
        show_secrets: bool,
    },
    /// Look up service principals
    Get(GetArgs),
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("query").required(true).args(["name", "app_id", "wildcard"])))]
struct GetArgs {
    /// Exact display name
    #[arg(long)]
    name: Option<String>,
    /// Application (client) id
    #[arg(long)]
    app_id: Option<String>,
    /// Display name pattern, `*` matches anything
    #[arg(long)]
    wildcard: Option<String>,
}

impl GetArgs {
    fn into_query(self) -> Option<PrincipalQuery> {
        self.name
            .map(PrincipalQuery::ByName)
            .or(self.app_id.map(PrincipalQuery::ByAppId))
            .or(self.wildcard.map(PrincipalQuery::ByWildcard))
    }
}

fn build_config(global: GlobalArgs) -> Result<Config> {
    let mut config = Config::from_env().context("reading SPNMUX_* environment")?;

    if let Some(provider) = global.provider {
        config.provider = provider;
    }
    if let Some(role) = global.role {
        config = config.with_default_role(role);
    }
    if let Some(scope) = global.scope {
        config = config.with_role_scope(scope);
    }
    if let Some(expiry) = global.expiry {
        config = config.with_credential_expiry(config::parse_expiry(&expiry)?);
    }
    if let Some(secs) = global.timeout_secs {
        config = config.with_call_timeout(Duration::from_secs(secs));
    }
    if let Some(az) = global.az_path {
        config = config.with_option("az_path", az);
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing("info")?;
    spnmux::init();

    let cli = Cli::parse();
    let config = build_config(cli.global)?;

    let mut provider = factory::new_provider(config.clone())?;
    provider
        .init()
        .await
        .with_context(|| format!("initializing {} provider", config.provider))?;

    let result = run(cli.command, &mut *provider, config).await;

    provider.close().await?;
    result
}

async fn run(
    command: Command,
    provider: &mut dyn spnmux::IdentityProvider,
    config: Config,
) -> Result<()> {
    match command {
        Command::Batch {
            file,
            show_secrets,
            json,
        } => {
            let names = read_names_file(&file).await?;
            info!(file = %file.display(), names = names.len(), "starting batch");

            let mut assigner = factory::new_role_assigner(config.clone())?;
            let outcome = BatchPrincipalCreator::new(provider, &mut *assigner, &config)
                .create_batch(&names)
                .await?;

            let reveal = show_secrets || config.reveal_secrets;
            let report = outcome.report(reveal);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for created in &report.created {
                    println!(
                        "{}\t{}\t{}",
                        created.display_name,
                        created.app_id,
                        created.secret.as_deref().unwrap_or("-")
                    );
                }
                println!("{}", report.summary);
            }
        }
        Command::Create {
            name,
            no_password,
            show_secrets,
        } => {
            let created = create_single(provider, &name, !no_password, &config).await?;
            let report = created.report(show_secrets || config.reveal_secrets);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Get(args) => {
            let query = args
                .into_query()
                .context("one of --name, --app-id or --wildcard is required")?;
            let found = find_principals(provider, &query).await?;
            println!("{}", serde_json::to_string_pretty(&found)?);
        }
    }

    Ok(())
}

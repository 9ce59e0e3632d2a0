//! CLI entry point for operating the prodgraph ontology service.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use prodgraph_auth::{AuthConfig, TokenVerifier};
use prodgraph_core::OntologyStore;
use prodgraph_graph::{GraphClient, GraphConfig};
use prodgraph_service::{seed, ServiceConfig};

#[derive(Parser)]
#[command(name = "prodgraph")]
#[command(about = "Operations CLI for the prodgraph product ontology")]
struct Cli {
    /// Config file prefix (default: prodgraph).
    #[arg(short, long, default_value = "prodgraph")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the uniqueness constraints. Idempotent.
    InitSchema,

    /// Populate a fresh database with demo data.
    Seed,

    /// Mint a bearer token.
    Token {
        /// Token subject (user identifier).
        #[arg(short, long, default_value = "admin")]
        subject: String,

        /// Roles to embed, repeatable.
        #[arg(short, long)]
        role: Vec<String>,
    },

    /// Verify connectivity and a token, if one is given.
    Check {
        /// Bearer token to verify.
        #[arg(short, long)]
        token: Option<String>,
    },

    /// Print a product and its assigned functionalities as JSON.
    Show {
        /// Product code.
        code: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();
    let config = ServiceConfig::load(&cli.config)?;

    match cli.command {
        Command::InitSchema => {
            let graph = connect(&config).await?;
            graph.ensure_constraints().await?;
            tracing::info!("Schema initialized");
        }
        Command::Seed => {
            let graph = connect(&config).await?;
            graph.ensure_constraints().await?;
            seed::seed(&graph).await?;
        }
        Command::Token { subject, role } => {
            let verifier = build_verifier(&config)?;
            let token = verifier.issue(&subject, &role)?;
            println!("{token}");
        }
        Command::Check { token } => {
            let graph = connect(&config).await?;
            // Any round trip proves the store answers.
            let (_, total) = OntologyStore::list_products(&graph, 1, 0).await?;
            tracing::info!(products = total, "Store reachable");

            if let Some(token) = token {
                let verifier = build_verifier(&config)?;
                let claims = verifier.verify(&token)?;
                tracing::info!(subject = %claims.sub, expires = claims.exp, "Token valid");
            }
        }
        Command::Show { code } => {
            let graph = connect(&config).await?;
            let store: &dyn OntologyStore = &graph;

            let product = store
                .get_product(&code)
                .await?
                .ok_or_else(|| anyhow::anyhow!("product '{code}' not found"))?;
            let functionalities = store
                .functionalities_of(prodgraph_core::OwnerKind::Product, &code)
                .await?;

            let details = prodgraph_core::ProductDetails {
                product,
                functionalities,
            };
            println!("{}", serde_json::to_string_pretty(&details)?);
        }
    }

    Ok(())
}

async fn connect(config: &ServiceConfig) -> anyhow::Result<GraphClient> {
    let graph_config = GraphConfig {
        uri: config.neo4j.uri.clone(),
        user: config.neo4j.user.clone(),
        password: config.neo4j.password.clone(),
        database: config.neo4j.database.clone(),
        query_timeout_secs: config.neo4j.query_timeout_secs,
        ..Default::default()
    };
    Ok(GraphClient::connect(&graph_config).await?)
}

fn build_verifier(config: &ServiceConfig) -> anyhow::Result<TokenVerifier> {
    let mut auth = AuthConfig::new(config.token_secret()?);
    auth.issuer = config.auth.issuer.clone();
    auth.audience = config.auth.audience.clone();
    auth.token_ttl_secs = config.auth.token_ttl_secs;
    Ok(TokenVerifier::new(auth)?)
}

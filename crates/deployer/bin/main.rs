use clap::Parser;
use runtime_plan_file::PlanFileRuntime;
use runtime_trait::Runtime;
use spec::{Dep, Manifest, NetworkProfile};
use std::{fs, path::PathBuf};
use tracing_subscriber::EnvFilter;

const DEFAULT_NETWORK: &str = "sepolia";

#[derive(Parser)]
#[command(name = "deployer")]
#[command(about = "Resolve contract deployment modules into an ordered deployment plan", long_about = None)]
struct Cli {
    /// Deployment descriptor (JSON)
    file: PathBuf,

    /// Target network: sepolia, mainnet. Overrides the descriptor
    #[arg(long)]
    network: Option<String>,

    /// Directory the plan is written to
    #[arg(long, default_value = "deployments")]
    out_dir: PathBuf,

    /// Read variables from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Only log the resolved operations
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match &cli.env_file {
        Some(path) => {
            dotenv::from_path(path)
                .map_err(|e| eyre::eyre!("failed to load {}: {}", path.display(), e))?;
        }
        None => {
            dotenv::dotenv().ok();
        }
    }

    let contents = fs::read_to_string(&cli.file)
        .map_err(|e| eyre::eyre!("failed to read {}: {}", cli.file.display(), e))?;
    let dep: Dep = serde_json::from_str(&contents)?;

    let network_name = cli
        .network
        .clone()
        .or_else(|| dep.network.clone())
        .unwrap_or_else(|| DEFAULT_NETWORK.to_string());
    let network = NetworkProfile::from_env(&network_name)?;

    tracing::info!(
        module = %dep.module,
        network = network.name(),
        endpoint = %network.redacted_endpoint(),
        deployer = %network.deployer(),
        "planning deployment"
    );
    if network.etherscan_api_key().is_none() {
        tracing::warn!("ETHERSCAN_API_KEY is not set, contracts cannot be verified");
    }

    let modules = catalog::apply(&dep)?;
    let plan = resolver::resolve(&modules)?;
    let operations = resolver::render(&plan, &network);

    let manifest = Manifest::new(dep.module.clone(), network, dep.compiler.clone())
        .with_operations(operations);

    if cli.dry_run {
        for op in &manifest.operations {
            tracing::info!(
                step = op.step,
                module = %op.module,
                contract = %op.contract,
                args = ?op.args,
                "operation"
            );
        }
        return Ok(());
    }

    let svc = Service::new(PlanFileRuntime::new(cli.out_dir));
    svc.deploy(manifest).await?;

    Ok(())
}

struct Service<R> {
    runtime: R,
}

impl<R: Runtime> Service<R> {
    fn new(runtime: R) -> Self {
        Self { runtime }
    }

    async fn deploy(&self, manifest: Manifest) -> eyre::Result<()> {
        self.runtime.run(manifest).await
    }
}

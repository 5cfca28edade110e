use serde::Serialize;
use std::path::{Path, PathBuf};
use template::Template;

use runtime_trait::Runtime;
use spec::{Address, CompilerSettings, DeploymentOperation, Literal, Manifest, RenderedArg};

pub const PLAN_FILE: &str = "deployment_plan.yaml";
pub const SUMMARY_FILE: &str = "summary.txt";

#[derive(Serialize)]
struct PlanFile<'a> {
    name: &'a str,
    network: PlanNetwork,
    compiler: &'a CompilerSettings,
    operations: &'a [DeploymentOperation],
}

#[derive(Serialize)]
struct PlanNetwork {
    name: &'static str,
    chain_id: u64,
    endpoint: String,
    deployer: Address,
}

#[derive(Template, Serialize)]
#[template(path = "summary.txt")]
struct Summary {
    name: String,
    network: String,
    chain_id: u64,
    endpoint: String,
    deployer: String,
    solidity: String,
    sources: String,
    operations: Vec<SummaryOperation>,
}

#[derive(Serialize)]
struct SummaryOperation {
    step: usize,
    module: String,
    contract: String,
    args: String,
}

impl From<&DeploymentOperation> for SummaryOperation {
    fn from(op: &DeploymentOperation) -> Self {
        let args = op
            .args
            .iter()
            .map(|arg| match arg {
                RenderedArg::Value(Literal::Address(a)) => a.to_checksum(None),
                RenderedArg::Value(Literal::Uint(n)) => n.to_string(),
                RenderedArg::Value(Literal::Bool(b)) => b.to_string(),
                RenderedArg::Value(Literal::String(s)) => format!("{:?}", s),
                RenderedArg::Pending(placeholder) => format!("<{}>", placeholder),
            })
            .collect::<Vec<_>>()
            .join(", ");

        SummaryOperation {
            step: op.step,
            module: op.module.clone(),
            contract: op.contract.clone(),
            args,
        }
    }
}

/// Writes `<dir>/<name>/deployment_plan.yaml` and `summary.txt`.
pub struct PlanFileRuntime {
    dir_path: PathBuf,
}

impl PlanFileRuntime {
    pub fn new(dir_path: impl Into<PathBuf>) -> Self {
        Self {
            dir_path: dir_path.into(),
        }
    }

    fn plan_yaml(&self, manifest: &Manifest) -> eyre::Result<String> {
        let network = &manifest.network;
        let plan = PlanFile {
            name: &manifest.name,
            network: PlanNetwork {
                name: network.name(),
                chain_id: network.chain_id(),
                endpoint: network.redacted_endpoint(),
                deployer: network.deployer(),
            },
            compiler: &manifest.compiler,
            operations: &manifest.operations,
        };
        Ok(serde_yaml::to_string(&plan)?)
    }

    fn summary(&self, manifest: &Manifest) -> eyre::Result<String> {
        let network = &manifest.network;
        let summary = Summary {
            name: manifest.name.clone(),
            network: network.name().to_string(),
            chain_id: network.chain_id(),
            endpoint: network.redacted_endpoint(),
            deployer: network.deployer().to_checksum(None),
            solidity: manifest.compiler.solidity.clone(),
            sources: manifest.compiler.sources.clone(),
            operations: manifest.operations.iter().map(Into::into).collect(),
        };
        Ok(summary.render()?)
    }
}

async fn write(path: &Path, contents: String) -> eyre::Result<()> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| eyre::eyre!("failed to write {}: {}", path.display(), e))
}

#[async_trait::async_trait]
impl Runtime for PlanFileRuntime {
    async fn run(&self, manifest: Manifest) -> eyre::Result<()> {
        // render both files before touching the filesystem
        let plan = self.plan_yaml(&manifest)?;
        let summary = self.summary(&manifest)?;

        let parent_folder = self.dir_path.join(&manifest.name);
        tokio::fs::create_dir_all(&parent_folder).await?;

        let plan_path = parent_folder.join(PLAN_FILE);
        write(&plan_path, plan).await?;
        write(&parent_folder.join(SUMMARY_FILE), summary).await?;

        tracing::info!(
            path = %plan_path.display(),
            operations = manifest.operations.len(),
            network = manifest.network.name(),
            "wrote deployment plan"
        );

        Ok(())
    }
}

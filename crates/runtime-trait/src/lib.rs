use spec::Manifest;

/// Hands a rendered manifest to whatever executes the creations.
#[async_trait::async_trait]
pub trait Runtime {
    async fn run(&self, manifest: Manifest) -> eyre::Result<()>;
}

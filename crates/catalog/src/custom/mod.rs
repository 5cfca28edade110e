use serde::Deserialize;
use spec::{Deployment, DeploymentModule};

/// Modules spelled out in the input descriptor itself.
#[derive(Default, Deserialize)]
pub struct CustomDeployment {}

#[derive(Debug, Deserialize)]
pub struct CustomDeploymentInput {
    pub modules: Vec<DeploymentModule>,
}

impl Deployment for CustomDeployment {
    type Input = CustomDeploymentInput;

    fn modules(&self, input: CustomDeploymentInput) -> eyre::Result<Vec<DeploymentModule>> {
        if input.modules.is_empty() {
            return Err(eyre::eyre!("custom deployment declares no modules"));
        }
        Ok(input.modules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spec::{ConstructorArg, Dep};

    #[test]
    fn test_modules_from_descriptor() {
        let dep: Dep = serde_json::from_str(
            r#"{
                "module": "custom",
                "network": "mainnet",
                "args": { "modules": [
                    { "id": "Token", "contract": "Token", "output": "token", "args": ["Name", 18] },
                    { "id": "Vault", "contract": "Vault", "args": [{ "module": "Token" }] }
                ] }
            }"#,
        )
        .unwrap();

        let modules = CustomDeployment::default().apply(&dep).unwrap();
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].output, "token");
        assert_eq!(
            modules[1].args,
            vec![ConstructorArg::Ref {
                module: "Token".to_string(),
                output: None,
            }]
        );
    }

    #[test]
    fn test_empty_is_rejected() {
        let dep: Dep =
            serde_json::from_str(r#"{ "module": "custom", "args": { "modules": [] } }"#).unwrap();
        assert!(CustomDeployment::default().apply(&dep).is_err());
    }
}

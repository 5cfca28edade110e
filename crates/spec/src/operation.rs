use crate::{Address, Literal};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BindError {
    #[error("step {step} ({module}): no deployed address for `{placeholder}`")]
    Unbound {
        step: usize,
        module: String,
        placeholder: Placeholder,
    },
}

/// Stands in for the address of a module that has not been deployed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    pub module: String,
    pub output: String,
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.output)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum RenderedArg {
    Value(Literal),
    Pending(Placeholder),
}

impl RenderedArg {
    pub fn is_pending(&self) -> bool {
        matches!(self, RenderedArg::Pending(_))
    }
}

/// One contract creation, in the order the executor must run it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentOperation {
    pub step: usize,
    pub module: String,
    pub contract: String,
    pub output: String,
    pub args: Vec<RenderedArg>,
}

impl DeploymentOperation {
    /// Modules whose addresses must be bound before this operation can run.
    pub fn pending(&self) -> impl Iterator<Item = &Placeholder> {
        self.args.iter().filter_map(|arg| match arg {
            RenderedArg::Pending(placeholder) => Some(placeholder),
            RenderedArg::Value(_) => None,
        })
    }

    /// Replaces every placeholder with the address recorded for its module.
    pub fn bind(&self, bindings: &Bindings) -> Result<Vec<Literal>, BindError> {
        self.args
            .iter()
            .map(|arg| match arg {
                RenderedArg::Value(literal) => Ok(literal.clone()),
                RenderedArg::Pending(placeholder) => bindings
                    .get(&placeholder.module)
                    .map(Literal::Address)
                    .ok_or_else(|| BindError::Unbound {
                        step: self.step,
                        module: self.module.clone(),
                        placeholder: placeholder.clone(),
                    }),
            })
            .collect()
    }
}

/// Deployed addresses reported back by the executor, keyed by module id.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bindings {
    addresses: BTreeMap<String, Address>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, module: impl Into<String>, address: Address) {
        self.addresses.insert(module.into(), address);
    }

    pub fn get(&self, module: &str) -> Option<Address> {
        self.addresses.get(module).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marketplace() -> DeploymentOperation {
        DeploymentOperation {
            step: 2,
            module: "SaleMarketplaceModule".to_string(),
            contract: "SaleMarketplace".to_string(),
            output: "sale".to_string(),
            args: vec![
                RenderedArg::Value(Literal::Uint(7)),
                RenderedArg::Pending(Placeholder {
                    module: "SaleEscrowModule".to_string(),
                    output: "escrow".to_string(),
                }),
            ],
        }
    }

    #[test]
    fn test_bind_substitutes_recorded_address() {
        let escrow: Address = "0x220878008d3eb7c94Afda696d2057462df66fdd8".parse().unwrap();
        let mut bindings = Bindings::new();
        bindings.record("SaleEscrowModule", escrow);

        let args = marketplace().bind(&bindings).unwrap();
        assert_eq!(args, vec![Literal::Uint(7), Literal::Address(escrow)]);
    }

    #[test]
    fn test_bind_fails_when_dependency_not_deployed() {
        let err = marketplace().bind(&Bindings::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "step 2 (SaleMarketplaceModule): no deployed address for `SaleEscrowModule.escrow`"
        );
    }

    #[test]
    fn test_pending() {
        let op = marketplace();
        let pending: Vec<_> = op.pending().map(|p| p.to_string()).collect();
        assert_eq!(pending, vec!["SaleEscrowModule.escrow"]);
    }
}

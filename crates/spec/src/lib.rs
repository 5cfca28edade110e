use serde::{Deserialize, Serialize, de::DeserializeOwned};

mod address;
mod network;
mod operation;

pub use address::{Address, AddressError, looks_like_address, parse_address};
pub use network::{
    API_KEY_VAR, ConfigError, ETHERSCAN_API_KEY_VAR, NetworkProfile, Networks, PRIVATE_KEY_VAR,
    Secret,
};
pub use operation::{BindError, Bindings, DeploymentOperation, Placeholder, RenderedArg};

pub const DEFAULT_OUTPUT: &str = "address";
pub const DEFAULT_SOLIDITY: &str = "0.8.26";
pub const DEFAULT_SOURCES: &str = "./contracts";

/// Input descriptor: which catalog entry to apply, on which network, with
/// which entry specific arguments.
#[derive(Debug, Deserialize)]
pub struct Dep {
    pub module: String,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub compiler: CompilerSettings,
    #[serde(default)]
    pub args: serde_json::Value,
}

/// A named group of contract deployments that can be instantiated from a [`Dep`].
pub trait Deployment {
    type Input: DeserializeOwned;

    fn apply(&self, dep: &Dep) -> eyre::Result<Vec<DeploymentModule>> {
        let args = match &dep.args {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            args => args.clone(),
        };
        let input: Self::Input = serde_json::from_value(args)?;
        self.modules(input)
    }

    fn modules(&self, input: Self::Input) -> eyre::Result<Vec<DeploymentModule>>;
}

/// Settings forwarded to the executor that compiles the contracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    pub solidity: String,
    pub sources: String,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            solidity: DEFAULT_SOLIDITY.to_string(),
            sources: DEFAULT_SOURCES.to_string(),
        }
    }
}

/// Everything a runtime receives for a single run.
#[derive(Debug)]
pub struct Manifest {
    pub name: String,
    pub network: NetworkProfile,
    pub compiler: CompilerSettings,
    pub operations: Vec<DeploymentOperation>,
}

impl Manifest {
    pub fn new(name: String, network: NetworkProfile, compiler: CompilerSettings) -> Self {
        Manifest {
            name,
            network,
            compiler,
            operations: vec![],
        }
    }

    pub fn with_operations(mut self, operations: Vec<DeploymentOperation>) -> Self {
        self.operations = operations;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Address(Address),
    Uint(u64),
    Bool(bool),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawArg")]
pub enum ConstructorArg {
    Literal(Literal),
    /// Address of another module once it is deployed. `None` means the
    /// output that module declares.
    Ref {
        module: String,
        output: Option<String>,
    },
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RefArg {
    module: String,
    #[serde(default)]
    output: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawArg {
    Ref(RefArg),
    Bool(bool),
    Uint(u64),
    Text(String),
}

impl TryFrom<RawArg> for ConstructorArg {
    type Error = AddressError;

    fn try_from(raw: RawArg) -> Result<Self, Self::Error> {
        let literal = match raw {
            RawArg::Ref(RefArg { module, output }) => {
                return Ok(ConstructorArg::Ref { module, output });
            }
            RawArg::Bool(b) => Literal::Bool(b),
            RawArg::Uint(n) => Literal::Uint(n),
            RawArg::Text(s) if looks_like_address(&s) => Literal::Address(parse_address(&s)?),
            RawArg::Text(s) => Literal::String(s),
        };
        Ok(ConstructorArg::Literal(literal))
    }
}

#[macro_export]
macro_rules! module_ref {
    ($module:expr) => {
        spec::ConstructorArg::Ref {
            module: $module.to_string(),
            output: None,
        }
    };
    ($module:expr, $output:expr) => {
        spec::ConstructorArg::Ref {
            module: $module.to_string(),
            output: Some($output.to_string()),
        }
    };
}

impl From<Literal> for ConstructorArg {
    fn from(literal: Literal) -> Self {
        ConstructorArg::Literal(literal)
    }
}

impl From<Address> for ConstructorArg {
    fn from(address: Address) -> Self {
        ConstructorArg::Literal(Literal::Address(address))
    }
}

impl From<u64> for ConstructorArg {
    fn from(n: u64) -> Self {
        ConstructorArg::Literal(Literal::Uint(n))
    }
}

impl From<bool> for ConstructorArg {
    fn from(b: bool) -> Self {
        ConstructorArg::Literal(Literal::Bool(b))
    }
}

impl From<&str> for ConstructorArg {
    fn from(s: &str) -> Self {
        ConstructorArg::Literal(Literal::String(s.to_string()))
    }
}

impl From<String> for ConstructorArg {
    fn from(s: String) -> Self {
        ConstructorArg::Literal(Literal::String(s))
    }
}

/// One contract to create, as declared by a deployment script.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeploymentModule {
    pub id: String,
    pub contract: String,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default)]
    pub args: Vec<ConstructorArg>,
}

fn default_output() -> String {
    DEFAULT_OUTPUT.to_string()
}

impl DeploymentModule {
    pub fn new(
        id: impl Into<String>,
        contract: impl Into<String>,
        args: Vec<ConstructorArg>,
    ) -> Self {
        DeploymentModule {
            id: id.into(),
            contract: contract.into(),
            output: default_output(),
            args,
        }
    }

    pub fn builder(id: impl Into<String>, contract: impl Into<String>) -> ModuleBuilder {
        ModuleBuilder {
            id: id.into(),
            contract: contract.into(),
            output: None,
            args: vec![],
        }
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.args.iter().filter_map(|arg| match arg {
            ConstructorArg::Ref { module, .. } => Some(module.as_str()),
            ConstructorArg::Literal(_) => None,
        })
    }
}

pub struct ModuleBuilder {
    id: String,
    contract: String,
    output: Option<String>,
    args: Vec<ConstructorArg>,
}

impl ModuleBuilder {
    pub fn output<S: Into<String>>(mut self, output: S) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn arg(mut self, arg: impl Into<ConstructorArg>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ConstructorArg>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> DeploymentModule {
        DeploymentModule {
            id: self.id,
            contract: self.contract,
            output: self.output.unwrap_or_else(default_output),
            args: self.args,
        }
    }
}

impl From<ModuleBuilder> for DeploymentModule {
    fn from(builder: ModuleBuilder) -> Self {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let usdt: Address = "0xB9A0B25B041B950686b78B68E7156B8f38141F80".parse().unwrap();
        let module = DeploymentModule::builder("SaleMarketplaceModule", "SaleMarketplace")
            .output("sale")
            .arg(usdt)
            .arg(crate::ConstructorArg::Ref {
                module: "SaleEscrowModule".to_string(),
                output: None,
            })
            .build();

        assert_eq!(module.output, "sale");
        assert_eq!(module.args.len(), 2);
        assert_eq!(
            module.dependencies().collect::<Vec<_>>(),
            vec!["SaleEscrowModule"]
        );
    }

    #[test]
    fn test_descriptor_args() {
        let module: DeploymentModule = serde_json::from_str(
            r#"{
                "id": "Market",
                "contract": "SaleMarketplace",
                "args": [
                    "0xB9A0B25B041B950686b78B68E7156B8f38141F80",
                    "label",
                    42,
                    true,
                    { "module": "Escrow", "output": "escrow" },
                    { "module": "Escrow" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(module.output, DEFAULT_OUTPUT);
        assert_eq!(
            module.args,
            vec![
                ConstructorArg::Literal(Literal::Address(
                    "0xB9A0B25B041B950686b78B68E7156B8f38141F80".parse().unwrap()
                )),
                ConstructorArg::Literal(Literal::String("label".to_string())),
                ConstructorArg::Literal(Literal::Uint(42)),
                ConstructorArg::Literal(Literal::Bool(true)),
                ConstructorArg::Ref {
                    module: "Escrow".to_string(),
                    output: Some("escrow".to_string()),
                },
                ConstructorArg::Ref {
                    module: "Escrow".to_string(),
                    output: None,
                },
            ]
        );
    }

    #[test]
    fn test_descriptor_rejects_bad_checksum() {
        let res: Result<DeploymentModule, _> = serde_json::from_str(
            r#"{ "id": "A", "contract": "A", "args": ["0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD"] }"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_misspelt_reference_key_is_rejected() {
        let res: Result<DeploymentModule, _> = serde_json::from_str(
            r#"{ "id": "M", "contract": "M", "args": [{ "module": "E", "ouptut": "sale" }] }"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_misspelt_module_key_is_rejected() {
        let res: Result<DeploymentModule, _> = serde_json::from_str(
            r#"{ "id": "M", "contract": "M", "arg": ["0xB9A0B25B041B950686b78B68E7156B8f38141F80"] }"#,
        );
        let err = res.unwrap_err().to_string();
        assert!(err.contains("unknown field `arg`"), "{err}");
    }

    #[test]
    fn test_dep_defaults() {
        let dep: Dep = serde_json::from_str(r#"{ "module": "rwa" }"#).unwrap();
        assert_eq!(dep.network, None);
        assert_eq!(dep.compiler, CompilerSettings::default());
        assert!(dep.args.is_null());
    }
}

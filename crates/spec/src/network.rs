use crate::Address;
use alloy_primitives::hex;
use k256::ecdsa::SigningKey;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const API_KEY_VAR: &str = "KEY";
pub const PRIVATE_KEY_VAR: &str = "PRIVATE_KEY";
pub const ETHERSCAN_API_KEY_VAR: &str = "ETHERSCAN_API_KEY";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown network `{0}` (supported: {supported})", supported = Networks::names().join(", "))]
    UnknownNetwork(String),
    #[error("missing required configuration variable `{0}`")]
    MissingConfiguration(&'static str),
    #[error("`PRIVATE_KEY` is not a valid secp256k1 private key")]
    InvalidPrivateKey,
}

/// Networks a deployment can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Networks {
    Sepolia,
    Mainnet,
}

impl Networks {
    pub const ALL: [Networks; 2] = [Networks::Sepolia, Networks::Mainnet];

    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        Self::ALL
            .into_iter()
            .find(|n| n.name() == name)
            .ok_or_else(|| ConfigError::UnknownNetwork(name.to_string()))
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|n| n.name()).collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Networks::Sepolia => "sepolia",
            Networks::Mainnet => "mainnet",
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Networks::Sepolia => 11155111,
            Networks::Mainnet => 1,
        }
    }

    /// Endpoint template, `{KEY}` is replaced by the provider api key.
    pub fn endpoint_template(&self) -> &'static str {
        match self {
            Networks::Sepolia => "https://sepolia.infura.io/v3/{KEY}",
            Networks::Mainnet => "https://mainnet.infura.io/v3/{KEY}",
        }
    }
}

/// A value read from configuration that must never be printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Secret(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Endpoint and credentials for one network. Built once at startup and passed
/// down by reference; nothing reads the environment after this.
#[derive(Debug, Clone)]
pub struct NetworkProfile {
    pub network: Networks,
    api_key: Secret,
    private_key: Secret,
    etherscan_api_key: Option<Secret>,
    deployer: Address,
}

impl NetworkProfile {
    pub fn from_env(name: &str) -> Result<Self, ConfigError> {
        Self::load(name, |var| std::env::var(var).ok())
    }

    pub fn load<F>(name: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let network = Networks::from_name(name)?;

        let required = |var: &'static str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingConfiguration(var))
        };

        let api_key = Secret::new(required(API_KEY_VAR)?);
        let private_key = Secret::new(required(PRIVATE_KEY_VAR)?);
        let etherscan_api_key = lookup(ETHERSCAN_API_KEY_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(Secret::new);

        let deployer = deployer_address(private_key.expose())?;

        Ok(Self {
            network,
            api_key,
            private_key,
            etherscan_api_key,
            deployer,
        })
    }

    pub fn name(&self) -> &'static str {
        self.network.name()
    }

    pub fn chain_id(&self) -> u64 {
        self.network.chain_id()
    }

    /// Account that signs the creation transactions.
    pub fn deployer(&self) -> Address {
        self.deployer
    }

    pub fn endpoint(&self) -> String {
        self.network
            .endpoint_template()
            .replace("{KEY}", self.api_key.expose())
    }

    /// Endpoint safe for logs and plan files.
    pub fn redacted_endpoint(&self) -> String {
        self.network.endpoint_template().replace("{KEY}", "***")
    }

    pub fn private_key(&self) -> &Secret {
        &self.private_key
    }

    pub fn etherscan_api_key(&self) -> Option<&Secret> {
        self.etherscan_api_key.as_ref()
    }
}

fn deployer_address(private_key: &str) -> Result<Address, ConfigError> {
    let bytes = hex::decode(private_key).map_err(|_| ConfigError::InvalidPrivateKey)?;
    let signing_key =
        SigningKey::from_slice(&bytes).map_err(|_| ConfigError::InvalidPrivateKey)?;

    Ok(Address::from_private_key(&signing_key))
}

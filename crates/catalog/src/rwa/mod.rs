use serde::Deserialize;
use spec::{Deployment, DeploymentModule, module_ref, parse_address};

const KYC: &str = "0x2Ff598aaAb89aa39dfe597a9546a4d9B9F6a8B99";
const USDT: &str = "0xB9A0B25B041B950686b78B68E7156B8f38141F80";

pub const FACTORY_MODULE: &str = "RWATokenFactoryModule";
pub const ESCROW_MODULE: &str = "SaleEscrowModule";
pub const MARKETPLACE_MODULE: &str = "SaleMarketplaceModule";

/// Real world asset token project: a token factory gated by a KYC registry and
/// a USDT sale marketplace that settles through an escrow.
#[derive(Default, Deserialize)]
pub struct RwaDeployment {}

#[derive(Debug, Deserialize)]
pub struct RwaDeploymentInput {
    #[serde(default)]
    pub kyc: Option<String>,
    #[serde(default)]
    pub usdt: Option<String>,
    /// Already deployed escrow. When absent the marketplace is wired to the
    /// escrow deployed in the same run.
    #[serde(default)]
    pub escrow: Option<String>,
}

impl Deployment for RwaDeployment {
    type Input = RwaDeploymentInput;

    fn modules(&self, input: RwaDeploymentInput) -> eyre::Result<Vec<DeploymentModule>> {
        let kyc = parse_address(input.kyc.as_deref().unwrap_or(KYC))?;
        let usdt = parse_address(input.usdt.as_deref().unwrap_or(USDT))?;

        let factory = DeploymentModule::builder(FACTORY_MODULE, "RWATokenFactory")
            .output("factory")
            .arg(kyc)
            .build();

        let escrow = DeploymentModule::builder(ESCROW_MODULE, "SaleEscrow")
            .output("escrow")
            .arg(usdt)
            .arg(kyc)
            .build();

        let escrow_arg = match input.escrow.as_deref() {
            Some(address) => parse_address(address)?.into(),
            None => module_ref!(ESCROW_MODULE, "escrow"),
        };

        let sale = DeploymentModule::builder(MARKETPLACE_MODULE, "SaleMarketplace")
            .output("sale")
            .arg(usdt)
            .arg(kyc)
            .arg(escrow_arg)
            .build();

        Ok(vec![factory, escrow, sale])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spec::{ConstructorArg, Dep, Literal};

    fn dep(args: &str) -> Dep {
        serde_json::from_str(&format!(r#"{{ "module": "rwa", "args": {} }}"#, args)).unwrap()
    }

    #[test]
    fn test_defaults_reference_escrow() {
        let modules = RwaDeployment::default()
            .apply(&serde_json::from_str(r#"{ "module": "rwa" }"#).unwrap())
            .unwrap();

        let ids: Vec<_> = modules.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec![FACTORY_MODULE, ESCROW_MODULE, MARKETPLACE_MODULE]);

        let factory = &modules[0];
        assert_eq!(factory.contract, "RWATokenFactory");
        assert_eq!(
            factory.args,
            vec![ConstructorArg::Literal(Literal::Address(KYC.parse().unwrap()))]
        );

        let sale = &modules[2];
        assert_eq!(
            sale.args[2],
            ConstructorArg::Ref {
                module: ESCROW_MODULE.to_string(),
                output: Some("escrow".to_string()),
            }
        );
    }

    #[test]
    fn test_predeployed_escrow_is_literal() {
        let modules = RwaDeployment::default()
            .apply(&dep(r#"{ "escrow": "0x220878008d3eb7c94Afda696d2057462df66fdd8" }"#))
            .unwrap();

        assert_eq!(
            modules[2].args[2],
            ConstructorArg::Literal(Literal::Address(
                "0x220878008d3eb7c94Afda696d2057462df66fdd8".parse().unwrap()
            ))
        );
        assert_eq!(modules[2].dependencies().count(), 0);
    }

    #[test]
    fn test_overrides() {
        let other = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        let modules = RwaDeployment::default()
            .apply(&dep(&format!(r#"{{ "usdt": "{}" }}"#, other)))
            .unwrap();
        assert_eq!(
            modules[1].args[0],
            ConstructorArg::Literal(Literal::Address(other.parse().unwrap()))
        );
    }

    #[test]
    fn test_bad_checksum_input() {
        let res = RwaDeployment::default()
            .apply(&dep(r#"{ "usdt": "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD" }"#));
        assert!(res.is_err());
    }

    #[test]
    fn test_invalid_address_input() {
        let res = RwaDeployment::default().apply(&dep(r#"{ "kyc": "0x1234" }"#));
        assert!(res.is_err());
    }
}

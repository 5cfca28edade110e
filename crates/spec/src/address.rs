pub use alloy_primitives::Address;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address `{0}` must start with 0x")]
    MissingPrefix(String),
    #[error("address `{0}` must be 40 hex digits")]
    Malformed(String),
    #[error("address `{0}` has an invalid EIP-55 checksum")]
    InvalidChecksum(String),
}

/// Shape check used to tell addresses from other string literals in a descriptor.
pub fn looks_like_address(s: &str) -> bool {
    s.len() == 42
        && (s.starts_with("0x") || s.starts_with("0X"))
        && s[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Mixed case input must carry a valid checksum, single case input carries none.
pub fn parse_address(s: &str) -> Result<Address, AddressError> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| AddressError::MissingPrefix(s.to_string()))?;

    let mixed_case = digits.chars().any(|c| c.is_ascii_lowercase())
        && digits.chars().any(|c| c.is_ascii_uppercase());
    if !mixed_case {
        return digits
            .parse()
            .map_err(|_| AddressError::Malformed(s.to_string()));
    }

    Address::parse_checksummed(s, None).map_err(|e| match e {
        alloy_primitives::AddressError::InvalidChecksum => {
            AddressError::InvalidChecksum(s.to_string())
        }
        _ => AddressError::Malformed(s.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const KYC: &str = "0x2Ff598aaAb89aa39dfe597a9546a4d9B9F6a8B99";

    #[test]
    fn test_checksummed_input() {
        let address = parse_address(KYC).unwrap();
        assert_eq!(address.to_checksum(None), KYC);
    }

    #[test]
    fn test_single_case_is_accepted() {
        let expected = parse_address(KYC).unwrap();
        assert_eq!(parse_address(&KYC.to_lowercase()).unwrap(), expected);
        assert_eq!(
            parse_address(&format!("0x{}", KYC[2..].to_uppercase())).unwrap(),
            expected
        );
    }

    #[test]
    fn test_bad_checksum_is_rejected() {
        let err = parse_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD").unwrap_err();
        assert!(matches!(err, AddressError::InvalidChecksum(_)));
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            parse_address("2Ff598aaAb89aa39dfe597a9546a4d9B9F6a8B99"),
            Err(AddressError::MissingPrefix(_))
        ));
        assert!(matches!(
            parse_address("0x2ff598"),
            Err(AddressError::Malformed(_))
        ));
        assert!(matches!(
            parse_address("0xzzf598aaab89aa39dfe597a9546a4d9b9f6a8b99"),
            Err(AddressError::Malformed(_))
        ));
    }

    #[test]
    fn test_looks_like() {
        assert!(looks_like_address(KYC));
        assert!(!looks_like_address("SaleEscrow"));
        assert!(!looks_like_address("0x1234"));
    }
}

use crate::sdk::{signer_chain_address, ChainContext, Interop};
use crate::types::{ChainAddress, Platform};
use anyhow::{anyhow, Result};
use std::fmt;

pub const ETH_PRIVATE_KEY_ENV: &str = "ETH_PRIVATE_KEY";
pub const SOL_PRIVATE_KEY_ENV: &str = "SOL_PRIVATE_KEY";

/// Signing keys, read from the environment once at startup.
#[derive(Clone, Default)]
pub struct Credentials {
    eth_private_key: Option<String>,
    sol_private_key: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("eth_private_key", &redact(&self.eth_private_key))
            .field("sol_private_key", &redact(&self.sol_private_key))
            .finish()
    }
}

impl Credentials {
    pub fn new(eth_private_key: Option<String>, sol_private_key: Option<String>) -> Self {
        Self {
            eth_private_key: eth_private_key.filter(|key| !key.is_empty()),
            sol_private_key: sol_private_key.filter(|key| !key.is_empty()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            std::env::var(ETH_PRIVATE_KEY_ENV).ok(),
            std::env::var(SOL_PRIVATE_KEY_ENV).ok(),
        )
    }

    /// Secret key for a platform family.
    pub fn require(&self, platform: Platform) -> Result<&str> {
        let (env, key) = match platform {
            Platform::Evm => (ETH_PRIVATE_KEY_ENV, &self.eth_private_key),
            Platform::Solana => (SOL_PRIVATE_KEY_ENV, &self.sol_private_key),
            other => anyhow::bail!("Unsupported platform: {other}"),
        };
        key.as_deref()
            .ok_or_else(|| anyhow!("Missing environment variable: {env}"))
    }
}

/// A chain context together with a signer for it and the signer's address.
pub struct SignerBundle<S: Interop> {
    pub chain: S::Context,
    pub signer: S::Signer,
    pub address: ChainAddress,
}

impl<S: Interop> fmt::Debug for SignerBundle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerBundle")
            .field("chain", &self.chain.chain())
            .field("address", &self.address.to_string())
            .finish()
    }
}

/// Resolve the signing key for `chain`'s platform and build a signer through the SDK.
pub async fn get_signer<S: Interop>(
    sdk: &S,
    chain: S::Context,
    credentials: &Credentials,
) -> Result<SignerBundle<S>> {
    let platform = chain.platform();
    let secret = credentials.require(platform)?;
    let signer = sdk.get_signer(&chain, secret).await?;
    let address = signer_chain_address(&signer)?;
    tracing::info!(chain = %chain.chain(), %platform, %address, "signer ready");
    Ok(SignerBundle {
        chain,
        signer,
        address,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Chain;
    use crate::testing::{FakeInterop, SdkCall};

    #[test]
    fn missing_key_names_the_variable() {
        let credentials = Credentials::new(None, Some(String::new()));
        let err = credentials.require(Platform::Evm).unwrap_err();
        assert_eq!(err.to_string(), "Missing environment variable: ETH_PRIVATE_KEY");
        let err = credentials.require(Platform::Solana).unwrap_err();
        assert_eq!(err.to_string(), "Missing environment variable: SOL_PRIVATE_KEY");
    }

    #[test]
    fn unknown_platforms_are_rejected() {
        let credentials = Credentials::new(Some("a".into()), Some("b".into()));
        let err = credentials.require(Platform::Sui).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported platform: Sui");
    }

    #[test]
    fn debug_output_hides_keys() {
        let credentials = Credentials::new(Some("0xdeadbeef".into()), None);
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("deadbeef"));
        assert!(rendered.contains("<redacted>"));
    }

    #[tokio::test]
    async fn builds_signer_with_platform_key() {
        let sdk = FakeInterop::default();
        let credentials = Credentials::new(Some("eth-key".into()), Some("sol-key".into()));

        let source = get_signer(&sdk, sdk.get_chain(Chain::Sepolia).unwrap(), &credentials)
            .await
            .unwrap();
        let destination = get_signer(&sdk, sdk.get_chain(Chain::Solana).unwrap(), &credentials)
            .await
            .unwrap();

        assert_eq!(source.address.chain, Chain::Sepolia);
        assert_eq!(destination.address.chain, Chain::Solana);
        assert_eq!(
            sdk.calls(),
            vec![
                SdkCall::GetSigner(Chain::Sepolia, "eth-key".into()),
                SdkCall::GetSigner(Chain::Solana, "sol-key".into()),
            ]
        );
    }

    #[tokio::test]
    async fn missing_key_skips_signer_construction() {
        let sdk = FakeInterop::default();
        let credentials = Credentials::new(Some("eth-key".into()), None);

        let err = get_signer(&sdk, sdk.get_chain(Chain::Solana).unwrap(), &credentials)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing environment variable: SOL_PRIVATE_KEY");
        assert!(sdk.calls().is_empty());
    }

    #[tokio::test]
    async fn unsupported_platform_fails() {
        let sdk = FakeInterop::default();
        let mut chain = sdk.get_chain(Chain::Sepolia).unwrap();
        chain.platform = Platform::Aptos;
        let credentials = Credentials::new(Some("eth-key".into()), Some("sol-key".into()));

        let err = get_signer(&sdk, chain, &credentials).await.unwrap_err();
        assert_eq!(err.to_string(), "Unsupported platform: Aptos");
        assert!(sdk.calls().is_empty());
    }

    #[tokio::test]
    async fn signer_errors_propagate() {
        let sdk = FakeInterop {
            fail_signer: Some("rpc unreachable".into()),
            ..Default::default()
        };
        let credentials = Credentials::new(Some("eth-key".into()), None);

        let err = get_signer(&sdk, sdk.get_chain(Chain::Sepolia).unwrap(), &credentials)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "rpc unreachable");
    }
}

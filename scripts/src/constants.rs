//! Constants used in the deploy scripts

use alloy::primitives::B256;

/// The name of the upgradeable proxy contract deployed in front of implementations
///
/// See https://docs.openzeppelin.com/contracts/5.x/api/proxy#transparent_proxy
pub const PROXY_CONTRACT_NAME: &str = "TransparentUpgradeableProxy";

/// The default directory holding compiled contract artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// The extension of a compiled contract artifact
pub const ARTIFACT_EXTENSION: &str = "json";

/// The suffix of the per-network environment variable holding the deployer key,
/// e.g. `SEPOLIA_PRIVKEY`
pub const PRIVKEY_ENV_SUFFIX: &str = "_PRIVKEY";

/// The `DEFAULT_ADMIN_ROLE` of OpenZeppelin's `AccessControl`
pub const DEFAULT_ADMIN_ROLE: B256 = B256::ZERO;

//! Constants used by the deployment stores

/// The extension of every persisted document
pub const JSON_EXTENSION: &str = "json";

/// The file stem of the per-network configuration document
pub const CONFIG_FILE_STEM: &str = "config";

/// The suffix appended to a contract name to address its proxy record
pub const PROXY_SUFFIX: &str = "-proxy";

/// The separator between a record name and the address embedded on archival
pub const ARCHIVE_SEPARATOR: &str = "-";

/// The default root directory of the deployment stores
pub const DEFAULT_DEPLOYMENTS_DIR: &str = "deployments";

// ---------------------------
// | Configuration Doc Keys  |
// ---------------------------

/// The proxy admin address key in the `config.json` file
pub const PROXY_ADMIN_KEY: &str = "proxyAdmin";

/// The token mapping key in the `config.json` file
pub const TOKEN_MAPPING_KEY: &str = "tokenMapping";

/// The cross-chain endpoint identifier key in the `config.json` file
pub const LZ_ENDPOINT_ID_KEY: &str = "lzEndpointId";

/// The cross-chain endpoint address key in the `config.json` file
pub const LZ_ENDPOINT_KEY: &str = "lzEndpoint";

/// The RPC url key, derived from the network catalog and never persisted
pub const RPC_KEY: &str = "rpc";

/// The chain id key, derived from the network catalog and never persisted
pub const CHAIN_ID_KEY: &str = "chainId";

/// The network name key, derived from the network catalog and never persisted
pub const NAME_KEY: &str = "name";

//! Default configuration values
//!
//! Used when neither the configuration file nor the environment provides a
//! value.

/// Configuration file loaded when no path is given
pub const CONFIG_PATH: &str = "config/deployer.toml";

/// Prefix of environment overrides, e.g. `DEPLOYER__DEPLOY__CONFIRMATIONS=2`
pub const ENV_PREFIX: &str = "DEPLOYER";

/// Separator between nested keys in environment overrides
pub const ENV_SEPARATOR: &str = "__";

/// Environment variable holding the deployer's private key
pub const PRIVATE_KEY_VAR: &str = "DEPLOYER_PRIVATE_KEY";

/// Registry files live under `<root>/<network>/addresses/<chainId>.json`
pub const REGISTRY_ROOT: &str = "env";

/// Compiled contract artifacts
pub const ARTIFACTS_DIR: &str = "artifacts";

/// Network used when none is selected
pub const DEFAULT_NETWORK: &str = "localhost";

/// Local development node
pub const LOCALHOST_URL: &str = "http://127.0.0.1:8545";

/// Chain id of local development nodes
pub const LOCAL_CHAIN_ID: u64 = 31337;

/// Confirmations awaited per deployment
pub const CONFIRMATIONS: usize = 1;

/// Confirmation timeout (seconds)
pub const CONFIRMATION_TIMEOUT_SECS: u64 = 300;

/// Receipt polling interval (milliseconds)
pub const POLL_INTERVAL_MS: u64 = 2_000;

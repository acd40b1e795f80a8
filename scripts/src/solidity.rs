//! Definitions of Solidity functions called by the deploy scripts

use alloy::sol;

sol! {
    function hasRole(bytes32 role, address account) external view returns (bool);
}

//! Per-network chain parameters.

use crate::Hash256;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Network {
    Mainnet,
    Testnet,
    Regtest,
}

/// Parameters the storage subsystem needs at bootstrap: the genesis block
/// identity and the hard-coded stake-modifier checksum checkpoints the
/// index loader verifies reconstructed chains against.
#[derive(Clone, Debug)]
pub struct ChainParams {
    pub network: Network,
    pub genesis_hash: Hash256,
    pub stake_modifier_checkpoints: &'static [(i32, u32)],
}

impl ChainParams {
    /// Expected stake-modifier checksum at `height`, if a checkpoint is pinned there.
    pub fn stake_modifier_checkpoint(&self, height: i32) -> Option<u32> {
        self.stake_modifier_checkpoints
            .iter()
            .find(|(checkpoint_height, _)| *checkpoint_height == height)
            .map(|(_, checksum)| *checksum)
    }
}

const MAINNET_GENESIS: Hash256 = [
    0x63, 0x1c, 0x25, 0x9f, 0x4a, 0x80, 0x05, 0x12, 0xd9, 0xc1, 0x14, 0x02, 0x5c, 0xd4, 0x8c, 0x57,
    0x3a, 0x2c, 0x9c, 0x36, 0x88, 0x2e, 0x1a, 0xbe, 0x7c, 0xa3, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00,
];

const TESTNET_GENESIS: Hash256 = [
    0xd1, 0x6c, 0x0a, 0x7e, 0x55, 0x92, 0x41, 0xca, 0x21, 0x5f, 0xe9, 0x71, 0x3c, 0x68, 0x7b, 0xf5,
    0x10, 0x42, 0x8d, 0xd6, 0x3e, 0x75, 0x39, 0x26, 0x1e, 0x1d, 0x0c, 0x00, 0x00, 0x00, 0x00, 0x00,
];

const MAINNET_STAKE_MODIFIER_CHECKPOINTS: &[(i32, u32)] = &[
    (0, 0x0e00670b),
    (25_000, 0x8c341b7a),
    (100_000, 0x3f120cf5),
    (250_000, 0xa97e0fd1),
];

const TESTNET_STAKE_MODIFIER_CHECKPOINTS: &[(i32, u32)] = &[(0, 0x0e00670b)];

pub fn chain_params(network: Network) -> ChainParams {
    match network {
        Network::Mainnet => ChainParams {
            network,
            genesis_hash: MAINNET_GENESIS,
            stake_modifier_checkpoints: MAINNET_STAKE_MODIFIER_CHECKPOINTS,
        },
        Network::Testnet => ChainParams {
            network,
            genesis_hash: TESTNET_GENESIS,
            stake_modifier_checkpoints: TESTNET_STAKE_MODIFIER_CHECKPOINTS,
        },
        Network::Regtest => ChainParams {
            network,
            genesis_hash: TESTNET_GENESIS,
            stake_modifier_checkpoints: &[],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoint_lookup() {
        let params = chain_params(Network::Mainnet);
        assert_eq!(params.stake_modifier_checkpoint(0), Some(0x0e00670b));
        assert_eq!(params.stake_modifier_checkpoint(25_000), Some(0x8c341b7a));
        assert_eq!(params.stake_modifier_checkpoint(1), None);
    }

    #[test]
    fn regtest_has_no_checkpoints() {
        let params = chain_params(Network::Regtest);
        assert!(params.stake_modifier_checkpoints.is_empty());
    }
}

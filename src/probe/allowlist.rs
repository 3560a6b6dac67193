//! Allow-list Merkle trees.
//!
//! Leaves are `keccak256(address)` over the 20 address bytes; interior nodes
//! hash the sorted pair of their children, so proofs carry no left/right
//! flags. An odd node at the end of a layer is promoted unchanged.

use alloy::primitives::{keccak256, Address, B256};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: invalid address '{value}'")]
pub struct AllowListParseError {
    pub line: usize,
    pub value: String,
}

/// The `{key, proof}` pair a mint call presents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AllowListAuth {
    /// Allow-list root; zero selects the public tier.
    pub key: B256,
    pub proof: Vec<B256>,
}

impl AllowListAuth {
    /// Auth for the public tier (zero key, empty proof).
    pub fn public() -> Self {
        Self::default()
    }

    pub fn is_public(&self) -> bool {
        self.key == B256::ZERO
    }
}

/// Merkle tree over a set of allowed addresses.
#[derive(Debug, Clone)]
pub struct AllowList {
    layers: Vec<Vec<B256>>,
}

impl AllowList {
    pub fn new(addresses: impl IntoIterator<Item = Address>) -> Self {
        let mut leaves: Vec<B256> = addresses.into_iter().map(leaf).collect();
        leaves.sort();
        leaves.dedup();

        let mut layers = vec![leaves];
        while let Some(layer) = layers.last().filter(|layer| layer.len() > 1) {
            let next: Vec<B256> = layer
                .chunks(2)
                .filter_map(|pair| pair.iter().copied().reduce(hash_pair))
                .collect();
            layers.push(next);
        }

        Self { layers }
    }

    /// Parse one address per line. Blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Result<Self, AllowListParseError> {
        let mut addresses = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let value = raw.split('#').next().unwrap_or_default().trim();
            if value.is_empty() {
                continue;
            }
            let address = value.parse::<Address>().map_err(|_| AllowListParseError {
                line: index + 1,
                value: value.to_string(),
            })?;
            addresses.push(address);
        }
        Ok(Self::new(addresses))
    }

    /// Tree root; zero for an empty list.
    pub fn root(&self) -> B256 {
        self.layers
            .last()
            .and_then(|layer| layer.first())
            .copied()
            .unwrap_or(B256::ZERO)
    }

    pub fn len(&self) -> usize {
        self.layers.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Proof of membership for `address`, if it is on the list.
    pub fn proof(&self, address: Address) -> Option<Vec<B256>> {
        let target = leaf(address);
        let mut index = self.layers.first()?.iter().position(|l| *l == target)?;

        let mut proof = Vec::new();
        for layer in &self.layers[..self.layers.len() - 1] {
            let sibling = index ^ 1;
            if let Some(node) = layer.get(sibling) {
                proof.push(*node);
            }
            index /= 2;
        }
        Some(proof)
    }

    /// Auth for `address` against this list.
    pub fn auth(&self, address: Address) -> Option<AllowListAuth> {
        self.proof(address).map(|proof| AllowListAuth {
            key: self.root(),
            proof,
        })
    }
}

/// Leaf hash of an address.
pub fn leaf(address: Address) -> B256 {
    keccak256(address.as_slice())
}

/// Check a proof against a root.
pub fn verify(proof: &[B256], root: B256, leaf: B256) -> bool {
    proof.iter().fold(leaf, |node, sibling| hash_pair(node, *sibling)) == root
}

fn hash_pair(a: B256, b: B256) -> B256 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(lo.as_slice());
    buf[32..].copy_from_slice(hi.as_slice());
    keccak256(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addresses(n: u8) -> Vec<Address> {
        (1..=n).map(|i| Address::repeat_byte(i)).collect()
    }

    #[test]
    fn test_every_member_verifies() {
        for size in 1..=7 {
            let list = AllowList::new(addresses(size));
            assert_eq!(list.len(), size as usize);
            for address in addresses(size) {
                let proof = list.proof(address).unwrap();
                assert!(verify(&proof, list.root(), leaf(address)), "size {size}");
            }
        }
    }

    #[test]
    fn test_outsider_has_no_proof() {
        let list = AllowList::new(addresses(4));
        let outsider = Address::repeat_byte(0xee);
        assert!(list.proof(outsider).is_none());

        let borrowed = list.proof(Address::repeat_byte(1)).unwrap();
        assert!(!verify(&borrowed, list.root(), leaf(outsider)));
    }

    #[test]
    fn test_single_member_root_is_leaf() {
        let only = Address::repeat_byte(9);
        let list = AllowList::new([only]);
        assert_eq!(list.root(), leaf(only));
        assert_eq!(list.proof(only).unwrap(), Vec::<B256>::new());
    }

    #[test]
    fn test_order_and_duplicates_do_not_matter() {
        let mut shuffled = addresses(5);
        shuffled.reverse();
        shuffled.push(Address::repeat_byte(3));
        assert_eq!(AllowList::new(shuffled).root(), AllowList::new(addresses(5)).root());
    }

    #[test]
    fn test_empty_list() {
        let list = AllowList::new(Vec::new());
        assert!(list.is_empty());
        assert_eq!(list.root(), B256::ZERO);
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let text = format!(
            "# presale\n{}\n\n{}  # team\n",
            Address::repeat_byte(1),
            Address::repeat_byte(2)
        );
        let list = AllowList::parse(&text).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.root(), AllowList::new(addresses(2)).root());
    }

    #[test]
    fn test_parse_reports_line() {
        let err = AllowList::parse("0x0000000000000000000000000000000000000001\nnot-an-address\n")
            .unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.value, "not-an-address");
    }

    #[test]
    fn test_auth_uses_root_as_key() {
        let list = AllowList::new(addresses(3));
        let auth = list.auth(Address::repeat_byte(2)).unwrap();
        assert_eq!(auth.key, list.root());
        assert!(!auth.is_public());
        assert!(AllowListAuth::public().is_public());
    }
}

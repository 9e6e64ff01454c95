//! Sparse Merkle tree for watchlist membership.
//!
//! Watchlists (sanctioned passport numbers, name+DOB, name+YOB) are large,
//! mostly-empty keyspaces: keys are Poseidon hashes of the watched data.
//! Entries sit on the path given by the key's bits (least significant bit
//! first), pushed only as deep as needed to separate them, with empty
//! subtrees hashing to zero and leaves hashing as
//! `Poseidon3(key, value, 1)`.
//!
//! The store is populated by the data curation pipeline and read-only for
//! the registry, which only tracks the roots.

use veripass_core::constants::WATCHLIST_TREE_DEPTH;
use veripass_core::Field;
use veripass_crypto::{poseidon, poseidon2, poseidon3};

use crate::error::{Result, TreeError};

#[derive(Debug, Clone)]
enum Node {
    Empty,
    Leaf { key: Field, value: Field },
    Internal { left: Box<Node>, right: Box<Node> },
}

impl Node {
    fn hash(&self) -> Result<Field> {
        match self {
            Node::Empty => Ok(Field::zero()),
            Node::Leaf { key, value } => Ok(poseidon3(*key, *value, Field::from_u64(1))?),
            Node::Internal { left, right } => Ok(poseidon2(left.hash()?, right.hash()?)?),
        }
    }
}

/// A proof of membership or provable absence for one key.
///
/// `siblings` runs leaf-to-root and is zero-padded to
/// [`WATCHLIST_TREE_DEPTH`]; `closest_leaf` is the key of the leaf found on
/// the path (zero when the slot is empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchlistProof {
    pub root: Field,
    pub depth: usize,
    pub membership: bool,
    pub closest_leaf: Field,
    pub siblings: Vec<Field>,
}

/// Sparse Merkle tree over watchlist entries.
#[derive(Debug, Clone)]
pub struct WatchlistTree {
    root_node: Node,
    root: Field,
    size: usize,
}

impl WatchlistTree {
    pub fn new() -> Self {
        Self {
            root_node: Node::Empty,
            root: Field::zero(),
            size: 0,
        }
    }

    pub fn root(&self) -> Field {
        self.root
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Insert an entry. Duplicate keys are rejected; the curation pipeline
    /// deduplicates upstream and a silent overwrite would change the root
    /// without changing the size.
    pub fn add(&mut self, key: Field, value: Field) -> Result<()> {
        let taken = std::mem::replace(&mut self.root_node, Node::Empty);
        match Self::insert(taken, key, value, 0) {
            Ok(node) => {
                self.root_node = node;
                self.root = self.root_node.hash()?;
                self.size += 1;
                Ok(())
            }
            Err((node, err)) => {
                self.root_node = node;
                Err(err)
            }
        }
    }

    fn insert(node: Node, key: Field, value: Field, depth: usize) -> std::result::Result<Node, (Node, TreeError)> {
        if depth >= WATCHLIST_TREE_DEPTH {
            return Err((node, TreeError::KeyCollision(WATCHLIST_TREE_DEPTH)));
        }
        match node {
            Node::Empty => Ok(Node::Leaf { key, value }),
            Node::Leaf { key: existing_key, value: existing_value } => {
                if existing_key == key {
                    return Err((
                        Node::Leaf { key: existing_key, value: existing_value },
                        TreeError::DuplicateKey,
                    ));
                }
                // Split: push the existing leaf one level down, then insert
                // the new key into the resulting internal node. On failure
                // the original leaf is restored, not the partial split.
                let mut split = Node::Internal {
                    left: Box::new(Node::Empty),
                    right: Box::new(Node::Empty),
                };
                if let Node::Internal { ref mut left, ref mut right } = split {
                    let slot = if bit(&existing_key, depth) { right } else { left };
                    **slot = Node::Leaf { key: existing_key, value: existing_value };
                }
                match Self::insert(split, key, value, depth) {
                    Ok(node) => Ok(node),
                    Err((_partial, err)) => Err((
                        Node::Leaf { key: existing_key, value: existing_value },
                        err,
                    )),
                }
            }
            Node::Internal { left, right } => {
                if bit(&key, depth) {
                    match Self::insert(*right, key, value, depth + 1) {
                        Ok(new_right) => Ok(Node::Internal { left, right: Box::new(new_right) }),
                        Err((old_right, err)) => {
                            Err((Node::Internal { left, right: Box::new(old_right) }, err))
                        }
                    }
                } else {
                    match Self::insert(*left, key, value, depth + 1) {
                        Ok(new_left) => Ok(Node::Internal { left: Box::new(new_left), right }),
                        Err((old_left, err)) => {
                            Err((Node::Internal { left: Box::new(old_left), right }, err))
                        }
                    }
                }
            }
        }
    }

    /// Build the raw path proof for `key`, regardless of membership.
    pub fn proof(&self, key: Field) -> Result<WatchlistProof> {
        let mut siblings_top_down = Vec::new();
        let mut node = &self.root_node;
        let mut depth = 0usize;
        loop {
            match node {
                Node::Internal { left, right } => {
                    if bit(&key, depth) {
                        siblings_top_down.push(left.hash()?);
                        node = right;
                    } else {
                        siblings_top_down.push(right.hash()?);
                        node = left;
                    }
                    depth += 1;
                }
                Node::Leaf { key: leaf_key, .. } => {
                    let mut siblings: Vec<Field> = siblings_top_down.into_iter().rev().collect();
                    siblings.resize(WATCHLIST_TREE_DEPTH, Field::zero());
                    return Ok(WatchlistProof {
                        root: self.root,
                        depth,
                        membership: *leaf_key == key,
                        closest_leaf: *leaf_key,
                        siblings,
                    });
                }
                Node::Empty => {
                    let mut siblings: Vec<Field> = siblings_top_down.into_iter().rev().collect();
                    siblings.resize(WATCHLIST_TREE_DEPTH, Field::zero());
                    return Ok(WatchlistProof {
                        root: self.root,
                        depth,
                        membership: false,
                        closest_leaf: Field::zero(),
                        siblings,
                    });
                }
            }
        }
    }

    /// Proof that `key` is present.
    pub fn membership_proof(&self, key: Field) -> Result<WatchlistProof> {
        let proof = self.proof(key)?;
        if !proof.membership {
            return Err(TreeError::WrongProofKind(
                "key is not a member of the watchlist".to_string(),
            ));
        }
        Ok(proof)
    }

    /// Proof that `key` is provably absent.
    pub fn non_membership_proof(&self, key: Field) -> Result<WatchlistProof> {
        let proof = self.proof(key)?;
        if proof.membership {
            return Err(TreeError::WrongProofKind(
                "key is a member of the watchlist".to_string(),
            ));
        }
        Ok(proof)
    }
}

impl Default for WatchlistTree {
    fn default() -> Self {
        Self::new()
    }
}

fn bit(key: &Field, depth: usize) -> bool {
    key.to_biguint().bit(depth as u64)
}

// ---------------------------------------------------------------------------
// Watchlist leaf construction
// ---------------------------------------------------------------------------

/// Leaf for a watched passport number: nine ASCII characters, `<`-padded.
pub fn passport_number_leaf(passport_number: &str) -> Result<Field> {
    if passport_number.len() > 9 || !passport_number.is_ascii() {
        return Err(TreeError::InvalidLeaf(format!(
            "passport number must be at most 9 ASCII characters: {passport_number:?}"
        )));
    }
    let mut padded = passport_number.as_bytes().to_vec();
    padded.resize(9, b'<');
    let inputs: Vec<Field> = padded.iter().map(|b| Field::from_u64(*b as u64)).collect();
    Ok(poseidon(&inputs)?)
}

/// Leaf for a watched (name, date-of-birth) pair.
pub fn name_dob_leaf(first_name: &str, last_name: &str, dob_yymmdd: &str) -> Result<Field> {
    let name = name_leaf(first_name, last_name)?;
    let dob = dob_leaf(dob_yymmdd)?;
    Ok(poseidon2(dob, name)?)
}

/// Leaf for a watched (name, year-of-birth) pair.
pub fn name_yob_leaf(first_name: &str, last_name: &str, yob_yy: &str) -> Result<Field> {
    if yob_yy.len() != 2 || !yob_yy.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TreeError::InvalidLeaf(format!(
            "year of birth must be two digits: {yob_yy:?}"
        )));
    }
    let name = name_leaf(first_name, last_name)?;
    let digits: Vec<Field> = yob_yy.bytes().map(|b| Field::from_u64(b as u64)).collect();
    let yob = poseidon(&digits)?;
    Ok(poseidon2(yob, name)?)
}

/// Hash a name in its machine-readable form: `LAST<<FIRST`, apostrophes
/// and dots stripped, spaces and hyphens replaced by `<`, padded or
/// truncated to 39 characters. The 39 bytes are packed into three
/// 13-character field elements and hashed together.
pub fn name_leaf(first_name: &str, last_name: &str) -> Result<Field> {
    let first = normalize_name_part(first_name);
    let last = normalize_name_part(last_name);
    let mut mrz = format!("{last}<<{first}");
    if mrz.len() > 39 {
        mrz.truncate(39);
    } else {
        while mrz.len() < 39 {
            mrz.push('<');
        }
    }
    let chunks: Vec<Field> = mrz
        .as_bytes()
        .chunks(13)
        .map(|chunk| Field::from_biguint(&num_bigint::BigUint::from_bytes_le(chunk)))
        .collect();
    Ok(poseidon(&chunks)?)
}

/// Hash a YYMMDD date of birth as six ASCII digits.
pub fn dob_leaf(dob_yymmdd: &str) -> Result<Field> {
    if dob_yymmdd.len() != 6 || !dob_yymmdd.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TreeError::InvalidLeaf(format!(
            "date of birth must be six digits: {dob_yymmdd:?}"
        )));
    }
    let digits: Vec<Field> = dob_yymmdd.bytes().map(|b| Field::from_u64(b as u64)).collect();
    Ok(poseidon(&digits)?)
}

fn normalize_name_part(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '\'' && *c != '.')
        .map(|c| if c == ' ' || c == '-' { '<' } else { c })
        .collect()
}

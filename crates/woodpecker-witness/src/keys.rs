//! The configured set of witness verifiers.

use woodpecker_note::Verifier;

use crate::error::WitnessError;

/// Distinct witness verifiers.
///
/// Fetched or configured once at startup. Duplicate keys collapse to one so
/// that a quorum is always counted over distinct witnesses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WitnessKeys {
    verifiers: Vec<Verifier>,
}

impl WitnessKeys {
    /// Parse every key string. Any malformed key fails the whole set.
    pub fn parse<S: AsRef<str>>(keys: &[S]) -> Result<Self, WitnessError> {
        let mut verifiers: Vec<Verifier> = Vec::with_capacity(keys.len());
        for key in keys {
            let key = key.as_ref();
            let v = Verifier::new(key).map_err(|e| WitnessError::InvalidKey {
                key: key.to_string(),
                source: e,
            })?;
            if !verifiers
                .iter()
                .any(|o| o.name() == v.name() && o.key_hash() == v.key_hash())
            {
                verifiers.push(v);
            }
        }
        Ok(Self { verifiers })
    }

    pub fn verifiers(&self) -> &[Verifier] {
        &self.verifiers
    }

    pub fn len(&self) -> usize {
        self.verifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verifiers.is_empty()
    }
}

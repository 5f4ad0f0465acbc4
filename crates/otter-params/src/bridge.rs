//! Character-access bridge.
//!
//! Integer queries that let a consumer without a string type rebuild every
//! key and value, and the page path and hash: ask for a length, then poll
//! each position.
//! Indices are checked; reading past the end is `IndexOutOfRange`.

use std::sync::Arc;

use crate::error::{ParamsError, ParamsResult};
use crate::snapshot::{EncodedPair, Snapshot};

/// Read-only query surface over one snapshot.
#[derive(Debug, Clone)]
pub struct CharBridge {
    snapshot: Arc<Snapshot>,
}

impl CharBridge {
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        Self { snapshot }
    }

    /// Number of pairs.
    pub fn pair_count(&self) -> u32 {
        self.snapshot.encoded().len() as u32
    }

    /// Units in the key of pair `i`.
    pub fn key_length(&self, i: usize) -> ParamsResult<u32> {
        Ok(self.pair(i)?.key.len() as u32)
    }

    /// Unit `j` of the key of pair `i`.
    pub fn key_char(&self, i: usize, j: usize) -> ParamsResult<u32> {
        unit_at(&self.pair(i)?.key, j)
    }

    /// Units in the value of pair `i`.
    pub fn value_length(&self, i: usize) -> ParamsResult<u32> {
        Ok(self.pair(i)?.value.len() as u32)
    }

    /// Unit `j` of the value of pair `i`.
    pub fn value_char(&self, i: usize, j: usize) -> ParamsResult<u32> {
        unit_at(&self.pair(i)?.value, j)
    }

    /// Units in the page URL before the query, or in the whole URL with
    /// `full`. Zero when the snapshot was not taken from a full URL.
    pub fn path_length(&self, full: bool) -> u32 {
        self.snapshot.encoded_location().path(full).len() as u32
    }

    /// Unit `j` of the path, see [`path_length`](Self::path_length).
    pub fn path_char(&self, full: bool, j: usize) -> ParamsResult<u32> {
        unit_at(self.snapshot.encoded_location().path(full), j)
    }

    /// Units in the hash, without the leading "#".
    pub fn hash_length(&self) -> u32 {
        self.snapshot.encoded_location().hash.len() as u32
    }

    /// Unit `j` of the hash.
    pub fn hash_char(&self, j: usize) -> ParamsResult<u32> {
        unit_at(&self.snapshot.encoded_location().hash, j)
    }

    /// Whole pair `i` in one call, for callers on this side of the boundary.
    pub fn entry(&self, i: usize) -> ParamsResult<(&str, &str)> {
        let params = self.snapshot.params();
        params
            .get(i)
            .ok_or_else(|| ParamsError::pair_out_of_range(i as i64, params.len()))
    }

    fn pair(&self, i: usize) -> ParamsResult<&EncodedPair> {
        let encoded = self.snapshot.encoded();
        encoded
            .get(i)
            .ok_or_else(|| ParamsError::pair_out_of_range(i as i64, encoded.len()))
    }
}

fn unit_at(units: &[u32], j: usize) -> ParamsResult<u32> {
    units
        .get(j)
        .copied()
        .ok_or_else(|| ParamsError::char_out_of_range(j as i64, units.len()))
}

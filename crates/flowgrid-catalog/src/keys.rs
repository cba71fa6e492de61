//! Composite key encoding for the catalog tables.
//!
//! Strings are written as a big-endian `u32` length followed by their
//! UTF-8 bytes, so an encoded `(tenant, process_id)` is never a prefix of
//! a different pair. Integers are big-endian, which makes the byte order
//! of `(tenant, process_id, version)` keys equal to version order and lets
//! the version index answer range queries directly.

use std::ops::RangeInclusive;

use crate::error::{CatalogError, CatalogResult};

fn push_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u32).to_be_bytes());
    buf.extend_from_slice(s.as_bytes());
}

/// Encoded `(tenant, process_id)`, the key of the counter, latest and
/// digest tables and the prefix of every version index entry.
pub fn id_key(tenant: &str, process_id: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8 + tenant.len() + process_id.len() + 8);
    push_str(&mut buf, tenant);
    push_str(&mut buf, process_id);
    buf
}

/// Key of the definitions table.
pub fn definition_key(tenant: &str, process_key: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(4 + tenant.len() + 8);
    push_str(&mut buf, tenant);
    buf.extend_from_slice(&process_key.to_be_bytes());
    buf
}

/// Key of the version index.
pub fn version_key(tenant: &str, process_id: &str, version: u32) -> Vec<u8> {
    let mut buf = id_key(tenant, process_id);
    buf.extend_from_slice(&version.to_be_bytes());
    buf
}

/// Key of the deployment index.
pub fn deployment_key(tenant: &str, process_id: &str, deployment_key: u64) -> Vec<u8> {
    let mut buf = id_key(tenant, process_id);
    buf.extend_from_slice(&deployment_key.to_be_bytes());
    buf
}

/// Every definition key belonging to `tenant`.
pub fn tenant_definitions(tenant: &str) -> RangeInclusive<Vec<u8>> {
    definition_key(tenant, 0)..=definition_key(tenant, u64::MAX)
}

/// Every version index key of `(tenant, process_id)`.
pub fn all_versions(tenant: &str, process_id: &str) -> RangeInclusive<Vec<u8>> {
    version_key(tenant, process_id, 0)..=version_key(tenant, process_id, u32::MAX)
}

/// Sequential reader over an encoded key.
struct KeyReader<'a> {
    bytes: &'a [u8],
}

impl<'a> KeyReader<'a> {
    fn take(&mut self, n: usize) -> CatalogResult<&'a [u8]> {
        if self.bytes.len() < n {
            return Err(CatalogError::Key(format!(
                "expected {n} more bytes, found {}",
                self.bytes.len()
            )));
        }
        let (head, tail) = self.bytes.split_at(n);
        self.bytes = tail;
        Ok(head)
    }

    fn read_u32(&mut self) -> CatalogResult<u32> {
        let raw = self.take(4)?;
        Ok(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    fn read_str(&mut self) -> CatalogResult<String> {
        let len = self.read_u32()? as usize;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec()).map_err(|e| CatalogError::Key(e.to_string()))
    }

    fn finish(self) -> CatalogResult<()> {
        if self.bytes.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::Key(format!(
                "{} trailing bytes",
                self.bytes.len()
            )))
        }
    }
}

/// Decode a version index key into `(tenant, process_id, version)`.
pub fn decode_version_key(bytes: &[u8]) -> CatalogResult<(String, String, u32)> {
    let mut reader = KeyReader { bytes };
    let tenant = reader.read_str()?;
    let process_id = reader.read_str()?;
    let version = reader.read_u32()?;
    reader.finish()?;
    Ok((tenant, process_id, version))
}

// Copyright 2026 lasso developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Length-prefixed `(key, payload)` record streams.
//!
//! A record file is a sequence of frames, each a little-endian `u32` length
//! followed by that many bytes encoding a key/value pair. Payloads are
//! `bincode`-encoded values. Writer and reader agree on the exact sequence
//! of keys; the reader asserts every key it consumes.
//!
//! Vectors are stored as a record group: a `<key>.dim` integer, a
//! `<key>.size` integer (the number of stored nonzeros), then zero or more
//! element fragments under `<key>` holding at most [`MESSAGE_SIZE`] entries
//! each, so that a single frame never outgrows [`MAX_RECORD_SIZE`] no
//! matter how large the vector is.

use crate::core::{Error, LassoError, LassoFloat};
use lasso_math::{DenseVector, SparseVector};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io::{Read, Write};

/// Upper bound on the encoded size of a single record frame.
pub const MAX_RECORD_SIZE: usize = 64 * 1024 * 1024;

/// Maximum number of vector elements per fragment record.
pub const MESSAGE_SIZE: usize = 4_000_000;

#[derive(Serialize, Deserialize)]
struct KeyValuePair {
    key: String,
    value: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct Element<F> {
    index: u64,
    value: F,
}

fn fragment_count(len: usize) -> usize {
    len / MESSAGE_SIZE + usize::from(len % MESSAGE_SIZE != 0)
}

/// Writes keyed records to a byte sink.
pub struct RecordWriter<W: Write> {
    writer: W,
}

impl<W: Write> RecordWriter<W> {
    /// Wrap a byte sink.
    pub fn new(writer: W) -> Self {
        RecordWriter { writer }
    }

    /// Append one `(key, payload)` record.
    pub fn write<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), Error> {
        let value = bincode::serialize(value)?;
        let encoded = bincode::serialize(&KeyValuePair {
            key: key.to_string(),
            value,
        })?;
        if encoded.len() > MAX_RECORD_SIZE {
            return Err(LassoError::RecordTooLarge {
                size: encoded.len(),
                limit: MAX_RECORD_SIZE,
            }
            .into());
        }
        self.writer.write_all(&(encoded.len() as u32).to_le_bytes())?;
        self.writer.write_all(&encoded)?;
        Ok(())
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<(), Error> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Reads keyed records from a byte source, asserting each expected key.
pub struct RecordReader<R: Read> {
    reader: R,
}

impl<R: Read> RecordReader<R> {
    /// Wrap a byte source.
    pub fn new(reader: R) -> Self {
        RecordReader { reader }
    }

    /// Consume one record whose key must be `expected_key`.
    pub fn read<T: DeserializeOwned>(&mut self, expected_key: &str) -> Result<T, Error> {
        let mut len = [0u8; 4];
        self.reader.read_exact(&mut len)?;
        let len = u32::from_le_bytes(len) as usize;
        if len > MAX_RECORD_SIZE {
            return Err(LassoError::RecordTooLarge {
                size: len,
                limit: MAX_RECORD_SIZE,
            }
            .into());
        }
        let mut buf = vec![0u8; len];
        self.reader.read_exact(&mut buf)?;
        let pair: KeyValuePair = bincode::deserialize(&buf)?;
        if pair.key != expected_key {
            return Err(LassoError::RecordKeyMismatch {
                expected: expected_key.to_string(),
                found: pair.key,
            }
            .into());
        }
        Ok(bincode::deserialize(&pair.value)?)
    }
}

/// Chunked record-group storage of a real vector.
pub trait VectorRecord: Sized {
    /// Write `self` as a `.dim`/`.size`/fragments record group under
    /// `key_base`.
    fn write_records<W: Write>(
        &self,
        writer: &mut RecordWriter<W>,
        key_base: &str,
    ) -> Result<(), Error>;

    /// Read back a record group written by
    /// [`write_records`](`VectorRecord::write_records`). Returns the vector
    /// and its stored nonzero count; a count of zero marks the empty-vector
    /// sentinel used for absent history slots.
    fn read_records<R: Read>(
        reader: &mut RecordReader<R>,
        key_base: &str,
    ) -> Result<(Self, usize), Error>;

    /// Write the empty-vector sentinel: dimension zero, size zero, no
    /// element fragments.
    fn write_empty_records<W: Write>(
        writer: &mut RecordWriter<W>,
        key_base: &str,
    ) -> Result<(), Error> {
        writer.write(&format!("{}.dim", key_base), &0u64)?;
        writer.write(&format!("{}.size", key_base), &0u64)
    }
}

impl<F: LassoFloat> VectorRecord for DenseVector<F> {
    /// Only nonzero elements are stored. The fragment count derives from
    /// the dimension: each fragment covers a fixed index window.
    fn write_records<W: Write>(
        &self,
        writer: &mut RecordWriter<W>,
        key_base: &str,
    ) -> Result<(), Error> {
        writer.write(&format!("{}.dim", key_base), &(self.len() as u64))?;
        writer.write(&format!("{}.size", key_base), &(self.nonzeros() as u64))?;

        for fragment in 0..fragment_count(self.len()) {
            let lo = fragment * MESSAGE_SIZE;
            let hi = ((fragment + 1) * MESSAGE_SIZE).min(self.len());
            let elements: Vec<Element<F>> = (lo..hi)
                .filter(|&i| !self[i].is_zero())
                .map(|i| Element {
                    index: i as u64,
                    value: self[i],
                })
                .collect();
            writer.write(key_base, &elements)?;
        }
        Ok(())
    }

    fn read_records<R: Read>(
        reader: &mut RecordReader<R>,
        key_base: &str,
    ) -> Result<(Self, usize), Error> {
        let dim: u64 = reader.read(&format!("{}.dim", key_base))?;
        let size: u64 = reader.read(&format!("{}.size", key_base))?;

        let mut v = DenseVector::zeros(dim as usize);
        for _ in 0..fragment_count(dim as usize) {
            let elements: Vec<Element<F>> = reader.read(key_base)?;
            for e in elements {
                v[e.index as usize] = e.value;
            }
        }
        Ok((v, size as usize))
    }
}

impl<F: LassoFloat> VectorRecord for SparseVector<F> {
    /// The dimension record holds the largest stored index; the fragment
    /// count derives from the nonzero count.
    fn write_records<W: Write>(
        &self,
        writer: &mut RecordWriter<W>,
        key_base: &str,
    ) -> Result<(), Error> {
        writer.write(
            &format!("{}.dim", key_base),
            &(self.max_index().unwrap_or(0) as u64),
        )?;
        writer.write(&format!("{}.size", key_base), &(self.len() as u64))?;

        let mut entries = self.iter();
        for _ in 0..fragment_count(self.len()) {
            let elements: Vec<Element<F>> = entries
                .by_ref()
                .take(MESSAGE_SIZE)
                .map(|(&k, &v)| Element {
                    index: k as u64,
                    value: v,
                })
                .collect();
            writer.write(key_base, &elements)?;
        }
        Ok(())
    }

    fn read_records<R: Read>(
        reader: &mut RecordReader<R>,
        key_base: &str,
    ) -> Result<(Self, usize), Error> {
        let _dim: u64 = reader.read(&format!("{}.dim", key_base))?;
        let size: u64 = reader.read(&format!("{}.size", key_base))?;

        let mut v = SparseVector::new();
        for _ in 0..fragment_count(size as usize) {
            let elements: Vec<Element<F>> = reader.read(key_base)?;
            for e in elements {
                v.set(e.index as usize, e.value);
            }
        }
        Ok((v, size as usize))
    }
}

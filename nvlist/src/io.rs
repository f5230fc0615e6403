// SPDX-License-Identifier: Apache-2.0

//! Byte sources and sinks for the JSON codec.
//!
//! The codec only needs two narrow capabilities, so it talks to these traits
//! instead of `std::io`. With the `std` feature, [`IoReader`] and [`IoWriter`]
//! adapt any `std::io::Read` / `std::io::Write`:
//!
//! ```rust
//! use nvlist::{decode, IoReader};
//!
//! let input: &[u8] = b"{\"answer\": 42}\n";
//! let nvl = decode(IoReader::new(input)).unwrap();
//! assert_eq!(nvl.get_number("answer"), Ok(42));
//! ```

use alloc::vec::Vec;

/// Trait for input sources the decoder reads from.
pub trait Reader {
    /// The error type returned by read operations
    type Error;

    /// Read data into the provided buffer.
    /// Returns the number of bytes read, or an error.
    ///
    /// # Contract
    /// - A return value of 0 **MUST** indicate true end of stream
    /// - Implementations **MUST NOT** return 0 unless no more data will ever be available
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Trait for output sinks the encoder writes to.
pub trait Writer {
    /// The error type returned by write operations
    type Error;

    /// Write the whole of `data`, or fail.
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

impl<R: Reader + ?Sized> Reader for &mut R {
    type Error = R::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        (**self).read(buf)
    }
}

impl<W: Writer + ?Sized> Writer for &mut W {
    type Error = W::Error;

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write_all(data)
    }
}

impl Writer for Vec<u8> {
    type Error = core::convert::Infallible;

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.extend_from_slice(data);
        Ok(())
    }
}

/// Adapts a `std::io::Read` into a [`Reader`].
///
/// Interrupted reads are retried.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct IoReader<R>(R);

#[cfg(feature = "std")]
impl<R: std::io::Read> IoReader<R> {
    pub fn new(inner: R) -> Self {
        Self(inner)
    }

    pub fn into_inner(self) -> R {
        self.0
    }
}

#[cfg(feature = "std")]
impl<R: std::io::Read> Reader for IoReader<R> {
    type Error = std::io::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        loop {
            match self.0.read(buf) {
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }
}

/// Adapts a `std::io::Write` into a [`Writer`].
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct IoWriter<W>(W);

#[cfg(feature = "std")]
impl<W: std::io::Write> IoWriter<W> {
    pub fn new(inner: W) -> Self {
        Self(inner)
    }

    pub fn into_inner(self) -> W {
        self.0
    }
}

#[cfg(feature = "std")]
impl<W: std::io::Write> Writer for IoWriter<W> {
    type Error = std::io::Error;

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.0.write_all(data)?;
        self.0.flush()
    }
}

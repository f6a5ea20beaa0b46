// MIT LICENSE
//
// Copyright (c) 2021 Dash Core Group
//
// Permission is hereby granted, free of charge, to any
// person obtaining a copy of this software and associated
// documentation files (the "Software"), to deal in the
// Software without restriction, including without
// limitation the rights to use, copy, modify, merge,
// publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software
// is furnished to do so, subject to the following
// conditions:
//
// The above copyright notice and this permission notice
// shall be included in all copies or substantial portions
// of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF
// ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED
// TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A
// PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT
// SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY
// CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR
// IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
// DEALINGS IN THE SOFTWARE.

//! Storage contract for treelog

use treelog_costs::CostResult;

use crate::Error;

/// Top-level storage abstraction.
///
/// Owns the connection and hands out transactions. All reads and writes go
/// through [`Transaction`]; nothing is applied until
/// [`Storage::commit_transaction`] succeeds.
pub trait Storage<'db> {
    /// Storage transaction type
    type Transaction: Transaction;

    /// Starts a new transaction
    fn start_transaction(&'db self) -> Self::Transaction;

    /// Consumes and commits a transaction, applying all of its writes at
    /// once. Fails without applying anything if another transaction
    /// committed conflicting changes first.
    fn commit_transaction(&self, transaction: Self::Transaction) -> CostResult<(), Error>;

    /// Discards every write made through `transaction` so far
    fn rollback_transaction(&self, transaction: &Self::Transaction) -> Result<(), Error>;

    /// Forces committed data to be written
    fn flush(&self) -> Result<(), Error>;
}

/// A unit of atomic work against bucketed storage.
///
/// Methods take `&self`; implementations buffer or forward writes through
/// interior mutability so several readers of the same transaction can
/// coexist with writes, as with the RocksDB transaction handle.
pub trait Transaction {
    /// Get the value stored under `key` in `bucket`.
    ///
    /// Fails with [`Error::ObjectNotFound`] if there is none.
    fn get<B: AsRef<[u8]>, K: AsRef<[u8]>>(&self, bucket: B, key: K) -> CostResult<Vec<u8>, Error>;

    /// Insert or overwrite `key` in `bucket`. Within one transaction the last
    /// write wins.
    fn set<B: AsRef<[u8]>, K: AsRef<[u8]>>(
        &self,
        bucket: B,
        key: K,
        value: &[u8],
    ) -> CostResult<(), Error>;

    /// Number of entries currently under `bucket`, this transaction's
    /// pending writes included.
    ///
    /// Fails with [`Error::ObjectNotFound`] if the bucket has no entries.
    fn size<B: AsRef<[u8]>>(&self, bucket: B) -> CostResult<u64, Error>;
}

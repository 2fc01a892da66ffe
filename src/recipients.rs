//! Recipient list editing, validation and totals
//!
//! A [`RecipientList`] holds the user's raw input: address and amount stay as
//! typed until [`RecipientList::validate`] turns the list into an ordered
//! snapshot of [`TransferIntent`]s. List order is transfer order.

use crate::address::parse_address;
use crate::error::{Error, Result};
use crate::types::{Amount, AmountParseError};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One row of user input, unvalidated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientEntry {
    pub address: String,
    pub amount: String,
}

impl RecipientEntry {
    pub fn new(address: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            amount: amount.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.address.trim().is_empty() && self.amount.trim().is_empty()
    }
}

/// Editable field of a [`RecipientEntry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientField {
    Address,
    Amount,
}

/// A validated transfer: well-formed address and a positive amount in wei
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferIntent {
    pub address: Address,
    pub amount: Amount,
}

/// Why an entry failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    MissingAddress,
    MissingAmount,
    MalformedAddress,
    MalformedAmount,
    TooManyDecimals,
    NonPositiveAmount,
}

impl ValidationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationReason::MissingAddress => "missing address",
            ValidationReason::MissingAmount => "missing amount",
            ValidationReason::MalformedAddress => "malformed address",
            ValidationReason::MalformedAmount => "malformed amount",
            ValidationReason::TooManyDecimals => "too many decimal places",
            ValidationReason::NonPositiveAmount => "amount must be greater than zero",
        }
    }
}

/// First offending entry of a list. `index` is zero-based.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("recipient {} has {}", .index + 1, .reason.as_str())]
pub struct ValidationError {
    pub index: usize,
    pub reason: ValidationReason,
}

/// Ordered recipient list. Never empty: removing the last entry leaves one blank entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientList {
    entries: Vec<RecipientEntry>,
}

impl Default for RecipientList {
    fn default() -> Self {
        Self::new()
    }
}

impl RecipientList {
    /// A list holding a single blank entry
    pub fn new() -> Self {
        Self {
            entries: vec![RecipientEntry::default()],
        }
    }

    /// Build a list from existing entries; an empty input yields one blank entry
    pub fn from_entries(entries: Vec<RecipientEntry>) -> Self {
        if entries.is_empty() {
            return Self::new();
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[RecipientEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a blank entry
    pub fn add(&mut self) {
        self.entries.push(RecipientEntry::default());
    }

    /// Append a filled-in entry
    pub fn push(&mut self, entry: RecipientEntry) {
        self.entries.push(entry);
    }

    /// Remove the entry at `index`
    pub fn remove(&mut self, index: usize) -> Result<RecipientEntry> {
        if index >= self.entries.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        let removed = self.entries.remove(index);
        if self.entries.is_empty() {
            self.entries.push(RecipientEntry::default());
        }
        Ok(removed)
    }

    /// Replace one field of one entry with the raw user value
    pub fn update(&mut self, index: usize, field: RecipientField, value: impl Into<String>) -> Result<()> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        match field {
            RecipientField::Address => entry.address = value.into(),
            RecipientField::Amount => entry.amount = value.into(),
        }
        Ok(())
    }

    /// Replace every entry with `entries`. Returns false and leaves the list
    /// untouched when `entries` is empty.
    pub fn replace_with(&mut self, entries: Vec<RecipientEntry>) -> bool {
        if entries.is_empty() {
            return false;
        }
        self.entries = entries;
        true
    }

    /// Check every entry in order and return the validated transfer snapshot.
    ///
    /// Stops at the first offending entry.
    pub fn validate(&self) -> std::result::Result<Vec<TransferIntent>, ValidationError> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                validate_entry(entry).map_err(|reason| ValidationError { index, reason })
            })
            .collect()
    }

    /// Sum of all parseable amounts. Entries that do not parse count as zero.
    pub fn total(&self) -> Amount {
        self.entries
            .iter()
            .filter_map(|e| Amount::parse_ether(&e.amount).ok())
            .sum()
    }
}

impl From<Vec<TransferIntent>> for RecipientList {
    fn from(intents: Vec<TransferIntent>) -> Self {
        Self::from_entries(
            intents
                .into_iter()
                .map(|i| RecipientEntry::new(i.address.to_checksum(None), i.amount.to_ether_string()))
                .collect(),
        )
    }
}

fn validate_entry(entry: &RecipientEntry) -> std::result::Result<TransferIntent, ValidationReason> {
    if entry.address.trim().is_empty() {
        return Err(ValidationReason::MissingAddress);
    }
    if entry.amount.trim().is_empty() {
        return Err(ValidationReason::MissingAmount);
    }

    let address = parse_address(&entry.address).map_err(|_| ValidationReason::MalformedAddress)?;
    let amount = Amount::parse_ether(&entry.amount).map_err(|e| match e {
        AmountParseError::Empty => ValidationReason::MissingAmount,
        AmountParseError::Malformed | AmountParseError::TooLarge => ValidationReason::MalformedAmount,
        AmountParseError::TooPrecise => ValidationReason::TooManyDecimals,
        AmountParseError::Negative => ValidationReason::NonPositiveAmount,
    })?;
    if amount.is_zero() {
        return Err(ValidationReason::NonPositiveAmount);
    }

    Ok(TransferIntent { address, amount })
}

//! Used-value scanning.
//!
//! Before an allocation batch every allocator needs to know which values are
//! already taken. The scan is recomputed per batch from the live document.
//! Values sitting on publishers that the batch is about to reassign are
//! released through an [`ExclusionSet`], so a publisher can receive its own
//! old value back.

use std::collections::BTreeSet;

use crate::document::{AddressHandle, AddressParameter, HostDocument, ServiceFamily};

fn normalize(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Values temporarily treated as free during one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    values: BTreeSet<String>,
}

impl ExclusionSet {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            values: values
                .into_iter()
                .map(|v| normalize(v.as_ref()))
                .filter(|v| !v.is_empty())
                .collect(),
        }
    }

    /// Values held by reassigned publishers that no other publisher shares.
    ///
    /// A value still carried by a publisher outside the batch stays used,
    /// otherwise the allocator could hand out a duplicate.
    pub fn reassignable<'a, S, U>(selected: S, unselected: U) -> Self
    where
        S: IntoIterator<Item = &'a str>,
        U: IntoIterator<Item = &'a str>,
    {
        let kept: BTreeSet<String> = unselected.into_iter().map(normalize).collect();
        Self::new(selected.into_iter().map(normalize).filter(|v| !kept.contains(v)))
    }

    /// Split a document's `(handle, value)` pairs by batch membership and
    /// derive the reassignable values.
    pub fn from_partition(
        values: &[(AddressHandle, String)],
        selected: &BTreeSet<AddressHandle>,
    ) -> Self {
        let (in_batch, outside): (Vec<_>, Vec<_>) =
            values.iter().partition(|(handle, _)| selected.contains(handle));
        Self::reassignable(
            in_batch.iter().map(|(_, v)| v.as_str()),
            outside.iter().map(|(_, v)| v.as_str()),
        )
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(&normalize(value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Uppercased set of values currently in use for one purpose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedValueScan {
    values: BTreeSet<String>,
}

impl UsedValueScan {
    /// Collect every `parameter` value on `family` address records.
    pub fn scan<D>(doc: &D, family: ServiceFamily, parameter: AddressParameter, ignore: &ExclusionSet) -> Self
    where
        D: HostDocument + ?Sized,
    {
        let values = doc.parameter_values(family, parameter);
        let scan = Self::from_values(values.iter().map(|(_, v)| v.as_str()), ignore);
        log::debug!(
            "Scanned {} {} values on {} addresses ({} in use, {} released)",
            values.len(),
            parameter,
            family,
            scan.len(),
            ignore.len()
        );
        scan
    }

    pub fn from_values<I, S>(values: I, ignore: &ExclusionSet) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            values: values
                .into_iter()
                .map(|v| normalize(v.as_ref()))
                .filter(|v| !v.is_empty() && !ignore.contains(v))
                .collect(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(&normalize(value))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

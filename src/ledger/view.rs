//! Ledger views: one exhaustive chunk of an account's history and the
//! operations that stitch overlapping chunks into a single timeline

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Vocabulary;
use crate::halftrade::HalfTrade;
use crate::ledger::LedgerMutation;
use crate::types::*;

/// One account's mutations over an exhaustive date range, together with the
/// provenance of every slice of that sequence
///
/// Mutations are kept in ascending date order and all lie within the
/// chunk's `[start_date, end_date)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerView {
    chunk: ExhaustiveChunk,
    mutations: Vec<LedgerMutation>,
    imported_from: Vec<ImportDetails>,
}

fn sum_amounts(mutations: &[LedgerMutation]) -> BigDecimal {
    mutations.iter().map(|m| &m.amount).sum()
}

impl LedgerView {
    /// Build a view from a parsed export
    ///
    /// Ordering is not checked here; callers sort mutations ascending by
    /// date, or run the import through a `StrictViewValidator`.
    pub fn from_chunk(
        chunk: ExhaustiveChunk,
        mutations: Vec<LedgerMutation>,
        imported_from: Vec<ImportDetails>,
    ) -> Self {
        Self {
            chunk,
            mutations,
            imported_from,
        }
    }

    pub fn chunk(&self) -> &ExhaustiveChunk {
        &self.chunk
    }

    pub fn account(&self) -> &AccountId {
        &self.chunk.account
    }

    pub fn start_date(&self) -> NaiveDate {
        self.chunk.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.chunk.end_date
    }

    pub fn start_balance(&self) -> Option<&Balance> {
        self.chunk.start_balance.as_ref()
    }

    pub fn mutations(&self) -> &[LedgerMutation] {
        &self.mutations
    }

    pub fn imported_from(&self) -> &[ImportDetails] {
        &self.imported_from
    }

    /// Sum of all mutation amounts, independent of any anchor
    pub fn total_change(&self) -> BigDecimal {
        sum_amounts(&self.mutations)
    }

    /// Balance at `end_date`, i.e. after every mutation in the view
    pub fn end_balance(&self) -> ReconcileResult<BigDecimal> {
        let start = self.anchor()?;
        Ok(&start.amount + &self.total_change())
    }

    /// Balance at the start of `date`, before any mutation dated `date`
    pub fn balance_at(&self, date: NaiveDate) -> ReconcileResult<BigDecimal> {
        if date < self.start_date() || date > self.end_date() {
            return Err(ReconcileError::InvalidRange(format!(
                "{} lies outside [{}, {}]",
                date,
                self.start_date(),
                self.end_date()
            )));
        }
        let start = self.anchor()?;
        let idx = self.split_index(date);
        Ok(&start.amount + &sum_amounts(&self.mutations[..idx]))
    }

    /// Balance after each mutation, in sequence order
    pub fn running_balances(&self) -> ReconcileResult<Vec<(NaiveDate, BigDecimal)>> {
        let mut balance = self.anchor()?.amount.clone();
        Ok(self
            .mutations
            .iter()
            .map(|m| {
                balance += &m.amount;
                (m.date, balance.clone())
            })
            .collect())
    }

    /// Read-form records for every mutation, keyed by `vocabulary`
    pub fn half_trades(&self, vocabulary: &Vocabulary) -> Vec<HalfTrade> {
        self.mutations
            .iter()
            .map(|m| HalfTrade::from_mutation(m, vocabulary))
            .collect()
    }

    fn anchor(&self) -> ReconcileResult<&Balance> {
        self.chunk
            .start_balance
            .as_ref()
            .ok_or_else(|| ReconcileError::MissingStartBalance(self.chunk.account.clone()))
    }

    /// Position of the first mutation dated on or after `date`
    fn split_index(&self, date: NaiveDate) -> usize {
        self.mutations.partition_point(|m| m.date < date)
    }

    fn ensure_same_account(&self, other: &LedgerView) -> ReconcileResult<()> {
        if self.chunk.account != other.chunk.account {
            return Err(ReconcileError::Conflict {
                field: "account".to_string(),
            });
        }
        Ok(())
    }

    /// Reject an incoming view whose range is empty or reversed
    fn ensure_valid_range(other: &LedgerView) -> ReconcileResult<()> {
        if other.start_date() >= other.end_date() {
            return Err(ReconcileError::InvalidRange(format!(
                "[{}, {}) is empty",
                other.start_date(),
                other.end_date()
            )));
        }
        Ok(())
    }

    fn push_provenance(&mut self, details: ImportDetails) {
        if !self.imported_from.contains(&details) {
            self.imported_from.push(details);
        }
    }

    /// Divide the view into `[start_date, date)` and `[date, end_date)`
    ///
    /// The second half is anchored at the running balance at the cut when
    /// this view has a start balance. Provenance records are clipped to the
    /// half they describe; a record spanning the cut appears in both.
    pub fn split_at(&self, date: NaiveDate) -> ReconcileResult<(LedgerView, LedgerView)> {
        if date <= self.start_date() || date >= self.end_date() {
            return Err(ReconcileError::InvalidRange(format!(
                "cannot split [{}, {}) at {}",
                self.start_date(),
                self.end_date(),
                date
            )));
        }

        let idx = self.split_index(date);
        let len = self.mutations.len();
        let cut_balance = self.chunk.start_balance.as_ref().map(|start| {
            Balance::new(
                &start.amount + &sum_amounts(&self.mutations[..idx]),
                start.unit.clone(),
            )
        });

        let before = LedgerView {
            chunk: ExhaustiveChunk {
                end_date: date,
                ..self.chunk.clone()
            },
            mutations: self.mutations[..idx].to_vec(),
            imported_from: self
                .imported_from
                .iter()
                .filter_map(|d| d.clipped(0, idx))
                .collect(),
        };
        let after = LedgerView {
            chunk: ExhaustiveChunk {
                start_date: date,
                start_balance: cut_balance,
                ..self.chunk.clone()
            },
            mutations: self.mutations[idx..].to_vec(),
            imported_from: self
                .imported_from
                .iter()
                .filter_map(|d| d.clipped(idx, len))
                .collect(),
        };

        debug!(
            account = %self.chunk.account,
            %date,
            before = before.mutations.len(),
            after = after.mutations.len(),
            "split view"
        );
        Ok((before, after))
    }

    /// Extend this view backwards with the segment immediately before it
    pub fn prepend(&mut self, other: LedgerView) -> ReconcileResult<()> {
        Self::ensure_valid_range(&other)?;
        self.ensure_same_account(&other)?;
        if other.start_date() >= self.start_date() {
            return Err(ReconcileError::Adjacency(format!(
                "nothing to prepend: other starts {}, this starts {}",
                other.start_date(),
                self.start_date()
            )));
        }
        if other.end_date() != self.start_date() {
            return Err(ReconcileError::Adjacency(format!(
                "prepend not adjacent: other ends {}, this starts {}",
                other.end_date(),
                self.start_date()
            )));
        }

        let start_balance = match (&other.chunk.start_balance, &self.chunk.start_balance) {
            (Some(theirs), Some(ours)) => {
                ours.ensure_same_unit(theirs)?;
                let computed = other.end_balance()?;
                if computed != ours.amount {
                    return Err(ReconcileError::BalanceContinuity {
                        computed,
                        expected: ours.amount.clone(),
                        date: self.start_date(),
                    });
                }
                Some(theirs.clone())
            }
            (Some(theirs), None) => Some(theirs.clone()),
            (None, Some(ours)) => Some(Balance::new(
                &ours.amount - &other.total_change(),
                ours.unit.clone(),
            )),
            (None, None) => None,
        };

        let offset = other.mutations.len();
        let LedgerView {
            chunk,
            mut mutations,
            mut imported_from,
        } = other;
        mutations.append(&mut self.mutations);
        imported_from.extend(self.imported_from.iter().map(|d| d.shifted(offset)));

        self.mutations = mutations;
        self.imported_from = imported_from;
        self.chunk.start_date = chunk.start_date;
        self.chunk.start_balance = start_balance;

        debug!(
            account = %self.chunk.account,
            start = %self.chunk.start_date,
            added = offset,
            "prepended segment"
        );
        Ok(())
    }

    /// Extend this view forwards with the segment immediately after it
    pub fn append(&mut self, other: LedgerView) -> ReconcileResult<()> {
        Self::ensure_valid_range(&other)?;
        self.ensure_same_account(&other)?;
        if other.end_date() <= self.end_date() {
            return Err(ReconcileError::Adjacency(format!(
                "nothing to append: other ends {}, this ends {}",
                other.end_date(),
                self.end_date()
            )));
        }
        if other.start_date() != self.end_date() {
            return Err(ReconcileError::Adjacency(format!(
                "append not adjacent: other starts {}, this ends {}",
                other.start_date(),
                self.end_date()
            )));
        }

        let start_balance = match (&self.chunk.start_balance, &other.chunk.start_balance) {
            (Some(ours), Some(theirs)) => {
                ours.ensure_same_unit(theirs)?;
                let computed = self.end_balance()?;
                if computed != theirs.amount {
                    return Err(ReconcileError::BalanceContinuity {
                        computed,
                        expected: theirs.amount.clone(),
                        date: self.end_date(),
                    });
                }
                Some(ours.clone())
            }
            (Some(ours), None) => Some(ours.clone()),
            (None, Some(theirs)) => Some(Balance::new(
                &theirs.amount - &self.total_change(),
                theirs.unit.clone(),
            )),
            (None, None) => None,
        };

        let offset = self.mutations.len();
        let LedgerView {
            chunk,
            mutations,
            imported_from,
        } = other;
        let added = mutations.len();
        self.mutations.extend(mutations);
        self.imported_from
            .extend(imported_from.iter().map(|d| d.shifted(offset)));
        self.chunk.end_date = chunk.end_date;
        self.chunk.start_balance = start_balance;

        debug!(
            account = %self.chunk.account,
            end = %self.chunk.end_date,
            added,
            "appended segment"
        );
        Ok(())
    }

    /// Merge a second observation of a sub-range already covered by this view
    ///
    /// Mutations in the overlap window are paired by position. Every pair is
    /// checked before any is merged, so a conflict leaves this view as it was.
    pub fn mix_in(&mut self, other: LedgerView) -> ReconcileResult<()> {
        Self::ensure_valid_range(&other)?;
        self.ensure_same_account(&other)?;
        if other.start_date() < self.start_date() || other.end_date() > self.end_date() {
            return Err(ReconcileError::InvalidRange(format!(
                "[{}, {}) is not contained in [{}, {})",
                other.start_date(),
                other.end_date(),
                self.start_date(),
                self.end_date()
            )));
        }

        let first = self.split_index(other.start_date());
        let end = self.split_index(other.end_date());
        let expected = end - first;
        let supplied = other.mutations.len();
        if supplied < expected {
            return Err(ReconcileError::RangeUnderflow {
                window_start: other.start_date(),
                expected,
                supplied,
            });
        }
        if supplied > expected {
            return Err(ReconcileError::RangeOverflow {
                window_start: other.start_date(),
                expected,
                supplied,
            });
        }

        let start_balance = match (&self.chunk.start_balance, &other.chunk.start_balance) {
            (Some(ours), Some(theirs)) => {
                ours.ensure_same_unit(theirs)?;
                let computed = self.balance_at(other.start_date())?;
                if computed != theirs.amount {
                    return Err(ReconcileError::BalanceContinuity {
                        computed,
                        expected: theirs.amount.clone(),
                        date: other.start_date(),
                    });
                }
                Some(ours.clone())
            }
            (None, Some(theirs)) => Some(Balance::new(
                &theirs.amount - &sum_amounts(&self.mutations[..first]),
                theirs.unit.clone(),
            )),
            (ours, None) => ours.clone(),
        };

        for (ours, theirs) in self.mutations[first..end].iter().zip(&other.mutations) {
            ours.check_merge(theirs)?;
        }
        for (ours, theirs) in self.mutations[first..end].iter_mut().zip(&other.mutations) {
            ours.merge(theirs)?;
        }
        for details in &other.imported_from {
            self.push_provenance(details.shifted(first));
        }
        self.chunk.start_balance = start_balance;

        debug!(
            account = %self.chunk.account,
            window_start = %other.start_date(),
            matched = expected,
            "mixed in overlapping segment"
        );
        Ok(())
    }

    /// Fold a newly imported view into this accumulator
    ///
    /// The part of `other` before this view is prepended, the part after it
    /// appended, and the overlapping part mixed in. Either every step
    /// succeeds or this view is left untouched.
    pub fn add_data(&mut self, other: LedgerView) -> ReconcileResult<()> {
        Self::ensure_valid_range(&other)?;
        self.ensure_same_account(&other)?;
        if other.end_date() < self.start_date() || other.start_date() > self.end_date() {
            return Err(ReconcileError::DisjointRange {
                start: self.start_date(),
                end: self.end_date(),
                other_start: other.start_date(),
                other_end: other.end_date(),
            });
        }

        let mut merged = self.clone();
        let mut pending = Some(other);

        if let Some(current) = pending.take() {
            pending = if current.start_date() >= merged.start_date() {
                Some(current)
            } else if current.end_date() <= merged.start_date() {
                merged.prepend(current)?;
                None
            } else {
                let (prefix, rest) = current.split_at(merged.start_date())?;
                merged.prepend(prefix)?;
                Some(rest)
            };
        }

        if let Some(current) = pending.take() {
            pending = if current.end_date() <= merged.end_date() {
                Some(current)
            } else if current.start_date() >= merged.end_date() {
                merged.append(current)?;
                None
            } else {
                let (rest, suffix) = current.split_at(merged.end_date())?;
                merged.append(suffix)?;
                Some(rest)
            };
        }

        if let Some(current) = pending {
            merged.mix_in(current)?;
        }

        info!(
            account = %merged.chunk.account,
            start = %merged.start_date(),
            end = %merged.end_date(),
            mutations = merged.mutations.len(),
            "merged import into ledger view"
        );
        *self = merged;
        Ok(())
    }
}

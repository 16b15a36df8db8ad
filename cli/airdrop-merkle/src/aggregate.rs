//! Merging of independent eligibility lists into one airdrop.
//!
//! Sources are applied in call order and claimants keep the position at which
//! they were first seen, which becomes their leaf position in the tree.

use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

use crate::address::Address;
use crate::allocation::Airdrop;
use crate::config::{AggregationPolicy, DuplicatePolicy};
use crate::error::AggregateError;

/// Allocation category an eligibility source contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Nft,
    Voter,
    EarlyContrib,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Nft => "nft",
            Category::Voter => "voter",
            Category::EarlyContrib => "earlyContrib",
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NftSource {
    Wrapped { addresses: Vec<String> },
    Bare(Vec<String>),
}

#[derive(Deserialize)]
struct AddressEntry {
    address: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum VoterSource {
    Wrapped { eligible_address: Vec<AddressEntry> },
    Bare(Vec<AddressEntry>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TokenAmount {
    Number(u64),
    Text(String),
}

#[derive(Deserialize)]
struct ContributorEntry {
    address: String,
    tokens: TokenAmount,
}

/// Parses a whole-token amount such as `"25,000"`.
///
/// Commas must group thousands: the leading group has one to three digits and
/// every later group exactly three. Fractions, signs and any other character
/// are rejected.
pub fn parse_token_amount(input: &str) -> Option<u64> {
    let mut groups = input.trim().split(',');
    let head = groups.next()?;
    let mut digits = String::from(head);
    let mut grouped = false;
    for group in groups {
        if group.len() != 3 {
            return None;
        }
        grouped = true;
        digits.push_str(group);
    }
    if head.is_empty() || (grouped && head.len() > 3) {
        return None;
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Accumulates eligibility sources under an [`AggregationPolicy`].
#[derive(Debug, Clone)]
pub struct Aggregator {
    policy: AggregationPolicy,
    airdrop: Airdrop,
    seen: HashSet<(Category, Address)>,
}

impl Aggregator {
    pub fn new(policy: AggregationPolicy) -> Self {
        Aggregator {
            policy,
            airdrop: Airdrop::new(),
            seen: HashSet::new(),
        }
    }

    fn duplicate_policy(&self, category: Category) -> DuplicatePolicy {
        match category {
            Category::Nft => self.policy.nft,
            Category::Voter => self.policy.voter,
            Category::EarlyContrib => self.policy.early_contrib,
        }
    }

    fn cap(&self, category: Category) -> Option<u64> {
        match category {
            Category::EarlyContrib => Some(self.policy.early_contrib_cap),
            Category::Nft | Category::Voter => None,
        }
    }

    fn parse(category: Category, input: &str) -> Result<Address, AggregateError> {
        Address::parse(input).map_err(|source| AggregateError::InvalidAddress {
            category,
            input: input.to_string(),
            source,
        })
    }

    /// Credits `amount` to `address` in `category`, honouring the duplicate
    /// policy for that category. A capped category never sums past its cap.
    fn credit(
        &mut self,
        category: Category,
        address: Address,
        amount: u64,
    ) -> Result<(), AggregateError> {
        let first = self.seen.insert((category, address));
        let policy = self.duplicate_policy(category);
        if !first && policy == DuplicatePolicy::Reject {
            return Err(AggregateError::DuplicateEntry { category, address });
        }

        let cap = self.cap(category);
        let allocation = self.airdrop.entry(address);
        let field = match category {
            Category::Nft => &mut allocation.nft,
            Category::Voter => &mut allocation.voter,
            Category::EarlyContrib => &mut allocation.early_contrib,
        };
        let total = if first {
            amount
        } else {
            field
                .checked_add(amount)
                .ok_or(AggregateError::AmountOverflow(address))?
        };
        *field = match cap {
            Some(cap) if total > cap => {
                tracing::warn!(%address, %category, total, cap, "clamping summed allocation");
                cap
            }
            _ => total,
        };
        Ok(())
    }

    /// Grants the NFT bonus to every listed address.
    pub fn add_nft_holders<I, S>(&mut self, addresses: I) -> Result<(), AggregateError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let amount = self.policy.nft_amount;
        let mut count = 0usize;
        for raw in addresses {
            let address = Self::parse(Category::Nft, raw.as_ref())?;
            self.credit(Category::Nft, address, amount)?;
            count += 1;
        }
        tracing::debug!(count, amount, "added nft holders");
        Ok(())
    }

    /// Grants the voter/POAP bonus to every listed address.
    pub fn add_voters<I, S>(&mut self, addresses: I) -> Result<(), AggregateError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let amount = self.policy.voter_amount;
        let mut count = 0usize;
        for raw in addresses {
            let address = Self::parse(Category::Voter, raw.as_ref())?;
            self.credit(Category::Voter, address, amount)?;
            count += 1;
        }
        tracing::debug!(count, amount, "added voters");
        Ok(())
    }

    /// Adds early-contributor amounts, clamping each entry to the cap before
    /// it is merged. Under [`DuplicatePolicy::Additive`] the summed total is
    /// clamped as well.
    pub fn add_early_contributors<I, S>(&mut self, entries: I) -> Result<(), AggregateError>
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        let cap = self.policy.early_contrib_cap;
        let mut count = 0usize;
        for (raw, tokens) in entries {
            let address = Self::parse(Category::EarlyContrib, raw.as_ref())?;
            let amount = if tokens > cap {
                tracing::warn!(%address, tokens, cap, "clamping early contributor allocation");
                cap
            } else {
                tokens
            };
            self.credit(Category::EarlyContrib, address, amount)?;
            count += 1;
        }
        tracing::debug!(count, cap, "added early contributors");
        Ok(())
    }

    /// Reads an NFT-holder source: `{"addresses": [...]}` or a bare array.
    pub fn add_nft_holders_json(&mut self, json: &str) -> Result<(), AggregateError> {
        let source: NftSource =
            serde_json::from_str(json).map_err(|source| AggregateError::Json {
                category: Category::Nft,
                source,
            })?;
        let addresses = match source {
            NftSource::Wrapped { addresses } | NftSource::Bare(addresses) => addresses,
        };
        self.add_nft_holders(addresses)
    }

    /// Reads a voter source: `{"eligible_address": [{"address": ...}]}` or a
    /// bare array of `{"address": ...}` objects.
    pub fn add_voters_json(&mut self, json: &str) -> Result<(), AggregateError> {
        let source: VoterSource =
            serde_json::from_str(json).map_err(|source| AggregateError::Json {
                category: Category::Voter,
                source,
            })?;
        let entries = match source {
            VoterSource::Wrapped { eligible_address } | VoterSource::Bare(eligible_address) => {
                eligible_address
            }
        };
        self.add_voters(entries.into_iter().map(|entry| entry.address))
    }

    /// Reads an early-contributor source: `[{"address": ..., "tokens": "25,000"}]`.
    pub fn add_early_contributors_json(&mut self, json: &str) -> Result<(), AggregateError> {
        let entries: Vec<ContributorEntry> =
            serde_json::from_str(json).map_err(|source| AggregateError::Json {
                category: Category::EarlyContrib,
                source,
            })?;

        let mut parsed = Vec::with_capacity(entries.len());
        for entry in entries {
            let tokens = match entry.tokens {
                TokenAmount::Number(tokens) => tokens,
                TokenAmount::Text(text) => match parse_token_amount(&text) {
                    Some(tokens) => tokens,
                    None => {
                        let address = Self::parse(Category::EarlyContrib, &entry.address)?;
                        return Err(AggregateError::InvalidAmount {
                            address,
                            input: text,
                        });
                    }
                },
            };
            parsed.push((entry.address, tokens));
        }
        self.add_early_contributors(parsed)
    }

    pub fn airdrop(&self) -> &Airdrop {
        &self.airdrop
    }

    pub fn finish(self) -> Airdrop {
        tracing::info!(claimants = self.airdrop.len(), "aggregated airdrop");
        self.airdrop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::Allocation;

    const A: &str = "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC";
    const B: &str = "0x15d34AAf54267DB7D7c367839AAf71A00a2C6A65";

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    #[test]
    fn test_parse_token_amount() {
        assert_eq!(parse_token_amount("25,000"), Some(25_000));
        assert_eq!(parse_token_amount(" 1,000 "), Some(1_000));
        assert_eq!(parse_token_amount("1,234,567"), Some(1_234_567));
        assert_eq!(parse_token_amount("1000"), Some(1_000));
        assert_eq!(parse_token_amount("12"), Some(12));
        assert_eq!(parse_token_amount("1,,000"), None);
        assert_eq!(parse_token_amount("25,00,0"), None);
        assert_eq!(parse_token_amount("1000,000"), None);
        assert_eq!(parse_token_amount(",000"), None);
        assert_eq!(parse_token_amount("1,000,"), None);
        assert_eq!(parse_token_amount("1_000"), None);
        assert_eq!(parse_token_amount("1.5"), None);
        assert_eq!(parse_token_amount("-3"), None);
        assert_eq!(parse_token_amount(""), None);
        assert_eq!(parse_token_amount(","), None);
    }

    #[test]
    fn test_merges_categories_by_address() {
        let mut aggregator = Aggregator::new(AggregationPolicy::default());
        aggregator.add_nft_holders([A]).unwrap();
        aggregator
            .add_voters([B, A.to_lowercase().as_str()])
            .unwrap();
        let airdrop = aggregator.finish();

        assert_eq!(airdrop.len(), 2);
        assert_eq!(airdrop.position(&addr(A)), Some(0));
        assert_eq!(
            airdrop.get(&addr(A)),
            Some(&Allocation {
                nft: 400,
                voter: 399,
                early_contrib: 0
            })
        );
        assert_eq!(
            airdrop.get(&addr(B)),
            Some(&Allocation {
                nft: 0,
                voter: 399,
                early_contrib: 0
            })
        );
    }

    #[test]
    fn test_early_contributor_clamped_to_cap() {
        let mut aggregator = Aggregator::new(AggregationPolicy::default());
        aggregator
            .add_early_contributors_json(&format!(
                r#"[{{"address": "{A}", "tokens": "25,000"}}, {{"address": "{B}", "tokens": "1,500"}}]"#
            ))
            .unwrap();
        let airdrop = aggregator.finish();
        assert_eq!(airdrop.get(&addr(A)).unwrap().early_contrib, 20_000);
        assert_eq!(airdrop.get(&addr(B)).unwrap().early_contrib, 1_500);
    }

    #[test]
    fn test_additive_early_contrib_never_exceeds_cap() {
        let policy = AggregationPolicy {
            early_contrib: DuplicatePolicy::Additive,
            ..AggregationPolicy::default()
        };
        let mut aggregator = Aggregator::new(policy);
        aggregator
            .add_early_contributors([(A, 25_000), (A, 300), (B, 15_000), (B, 6_000)])
            .unwrap();
        let airdrop = aggregator.finish();
        assert_eq!(airdrop.get(&addr(A)).unwrap().early_contrib, 20_000);
        assert_eq!(airdrop.get(&addr(B)).unwrap().early_contrib, 20_000);
    }

    #[test]
    fn test_additive_early_contrib_sums_below_cap() {
        let policy = AggregationPolicy {
            early_contrib: DuplicatePolicy::Additive,
            ..AggregationPolicy::default()
        };
        let mut aggregator = Aggregator::new(policy);
        aggregator
            .add_early_contributors([(A, 1_000), (A, 300)])
            .unwrap();
        assert_eq!(
            aggregator.airdrop().get(&addr(A)).unwrap().early_contrib,
            1_300
        );
    }

    #[test]
    fn test_early_contrib_set_once_by_default() {
        let mut aggregator = Aggregator::new(AggregationPolicy::default());
        let err = aggregator
            .add_early_contributors_json(&format!(
                r#"[{{"address": "{A}", "tokens": "25,000"}}, {{"address": "{A}", "tokens": "25,000"}}]"#
            ))
            .unwrap_err();
        assert!(matches!(
            err,
            AggregateError::DuplicateEntry {
                category: Category::EarlyContrib,
                address
            } if address == addr(A)
        ));
        assert_eq!(
            aggregator.airdrop().get(&addr(A)).unwrap().early_contrib,
            20_000
        );
    }

    #[test]
    fn test_reject_policy_flags_duplicates() {
        let mut aggregator = Aggregator::new(AggregationPolicy::default());
        let err = aggregator
            .add_nft_holders([A, A.to_lowercase().as_str()])
            .unwrap_err();
        assert!(matches!(
            err,
            AggregateError::DuplicateEntry {
                category: Category::Nft,
                address
            } if address == addr(A)
        ));
    }

    #[test]
    fn test_duplicates_across_calls_in_same_category() {
        let mut aggregator = Aggregator::new(AggregationPolicy::default());
        aggregator.add_voters([A]).unwrap();
        assert!(matches!(
            aggregator.add_voters([A]),
            Err(AggregateError::DuplicateEntry {
                category: Category::Voter,
                ..
            })
        ));
    }

    #[test]
    fn test_additive_policy_for_flat_category() {
        let policy = AggregationPolicy {
            voter: DuplicatePolicy::Additive,
            ..AggregationPolicy::default()
        };
        let mut aggregator = Aggregator::new(policy);
        aggregator.add_voters([A, A]).unwrap();
        assert_eq!(aggregator.airdrop().get(&addr(A)).unwrap().voter, 798);
    }

    #[test]
    fn test_invalid_address() {
        let mut aggregator = Aggregator::new(AggregationPolicy::default());
        assert!(matches!(
            aggregator.add_nft_holders(["0x1234"]),
            Err(AggregateError::InvalidAddress {
                category: Category::Nft,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_amount() {
        let mut aggregator = Aggregator::new(AggregationPolicy::default());
        let err = aggregator
            .add_early_contributors_json(&format!(r#"[{{"address": "{A}", "tokens": "12.5"}}]"#))
            .unwrap_err();
        assert!(matches!(err, AggregateError::InvalidAmount { .. }));
    }

    #[test]
    fn test_source_json_shapes() {
        let mut aggregator = Aggregator::new(AggregationPolicy::default());
        aggregator
            .add_nft_holders_json(&format!(r#"{{"addresses": ["{A}"]}}"#))
            .unwrap();
        aggregator
            .add_voters_json(&format!(r#"{{"eligible_address": [{{"address": "{B}"}}]}}"#))
            .unwrap();
        aggregator
            .add_early_contributors_json(&format!(r#"[{{"address": "{B}", "tokens": 10}}]"#))
            .unwrap();
        let airdrop = aggregator.finish();
        assert_eq!(airdrop.get(&addr(A)).and_then(Allocation::total), Some(400));
        assert_eq!(airdrop.get(&addr(B)).and_then(Allocation::total), Some(409));

        let mut bare = Aggregator::new(AggregationPolicy::default());
        bare.add_nft_holders_json(&format!(r#"["{A}"]"#)).unwrap();
        bare.add_voters_json(&format!(r#"[{{"address": "{A}"}}]"#))
            .unwrap();
        assert_eq!(bare.airdrop().get(&addr(A)).and_then(Allocation::total), Some(799));
    }

    #[test]
    fn test_malformed_source() {
        let mut aggregator = Aggregator::new(AggregationPolicy::default());
        assert!(matches!(
            aggregator.add_voters_json("{\"voters\": 3}"),
            Err(AggregateError::Json {
                category: Category::Voter,
                ..
            })
        ));
    }
}

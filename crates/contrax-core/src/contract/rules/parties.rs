//! Contracting party extraction (갑 / 을 designation clauses).

use std::fmt;

use super::patterns::CONTRACT_PARTY;
use super::{FieldExtraction, FieldExtractor};
use crate::models::log::ExtractionLog;

/// Contract role named by a designation clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartyRole {
    /// 갑, the first party.
    First,
    /// 을, the second party.
    Second,
}

impl PartyRole {
    fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "갑" => Some(PartyRole::First),
            "을" => Some(PartyRole::Second),
            _ => None,
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            PartyRole::First => "갑",
            PartyRole::Second => "을",
        }
    }

    fn pattern_name(&self) -> &'static str {
        match self {
            PartyRole::First => "CONTRACT_PARTY_A",
            PartyRole::Second => "CONTRACT_PARTY_B",
        }
    }
}

impl fmt::Display for PartyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.marker())
    }
}

/// One designation clause found in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyMatch {
    pub role: PartyRole,
    /// Prefix token as written (`주식회사`, `(주)`, `( 주 )`, `㈜`).
    pub prefix: String,
    /// Company name, trimmed.
    pub name: String,
}

impl PartyMatch {
    /// Canonical company name: canonical prefix, a space, the name.
    pub fn canonical_name(&self) -> String {
        format!("{} {}", canonical_prefix(&self.prefix), self.name)
    }
}

/// Both contracting parties, as canonical company names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parties {
    pub first: Option<String>,
    pub second: Option<String>,
}

impl Parties {
    fn slot(&mut self, role: PartyRole) -> &mut Option<String> {
        match role {
            PartyRole::First => &mut self.first,
            PartyRole::Second => &mut self.second,
        }
    }

    fn is_complete(&self) -> bool {
        self.first.is_some() && self.second.is_some()
    }
}

/// Map a legal-entity prefix to one of the two canonical forms.
///
/// Abbreviated forms (`(주)`, `( 주 )`, `㈜`) become `(주)`; everything else
/// is `주식회사`.
pub fn canonical_prefix(prefix: &str) -> &'static str {
    let compact: String = prefix.chars().filter(|c| !c.is_whitespace()).collect();
    if compact == "(주)" || compact == "㈜" {
        "(주)"
    } else {
        "주식회사"
    }
}

/// All designation clauses in `text`, left to right.
pub fn find_party_clauses(text: &str) -> impl Iterator<Item = PartyMatch> + '_ {
    CONTRACT_PARTY.captures_iter(text).filter_map(|caps| {
        let role = PartyRole::from_marker(caps.get(3)?.as_str())?;
        Some(PartyMatch {
            role,
            prefix: caps.get(1)?.as_str().to_string(),
            name: caps.get(2)?.as_str().trim().to_string(),
        })
    })
}

/// Extracts the first party (갑) and second party (을).
///
/// The first clause seen for a role wins; later clauses for the same role are
/// logged and discarded. Scanning stops once both roles are filled.
#[derive(Debug, Clone, Default)]
pub struct PartyExtractor;

impl PartyExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for PartyExtractor {
    type Output = Parties;

    fn extract(&self, text: &str) -> FieldExtraction<Parties> {
        let mut log = ExtractionLog::new();
        let mut parties = Parties::default();
        let mut matched = 0usize;

        for found in find_party_clauses(text) {
            if found.name.is_empty() {
                continue;
            }
            matched += 1;

            let name = found.canonical_name();
            if let Some(kept) = parties.slot(found.role) {
                log.warn(format!(
                    "Regex pattern [{}] matched again: {}; keeping first match {}",
                    found.role.pattern_name(),
                    name,
                    kept
                ));
            } else {
                log.info(format!(
                    "Regex pattern [{}] matched: {}",
                    found.role.pattern_name(),
                    name
                ));
                *parties.slot(found.role) = Some(name);
            }

            if parties.is_complete() {
                break;
            }
        }

        if matched == 0 {
            log.warn("No contract party designation clause found");
        } else {
            for role in [PartyRole::First, PartyRole::Second] {
                if parties.slot(role).is_none() {
                    log.warn(format!("Contract party [{}] not found", role));
                }
            }
        }

        FieldExtraction::new(parties, log)
    }
}

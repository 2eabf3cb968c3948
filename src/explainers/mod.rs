//! The six explainer decks.
//!
//! Each deck has its own visual enum, so decks have different types.
//! [`DeckId::visit`] hands the concrete deck to a [`DeckVisitor`], which
//! lets callers stay generic over the visual type.

pub mod batching;
pub mod grpo;
pub mod init;
pub mod kv_cache;
pub mod sampling;
pub mod sharding;

use std::fmt;
use std::str::FromStr;

use crate::core::{Deck, Visual};
use crate::error::Error;

/// Name of a deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeckId {
    Batching,
    Sharding,
    Grpo,
    KvCache,
    Sampling,
    Init,
}

impl DeckId {
    pub const ALL: [DeckId; 6] = [
        DeckId::Batching,
        DeckId::Sharding,
        DeckId::Grpo,
        DeckId::KvCache,
        DeckId::Sampling,
        DeckId::Init,
    ];

    /// Command-line name.
    pub fn name(self) -> &'static str {
        match self {
            DeckId::Batching => "batching",
            DeckId::Sharding => "sharding",
            DeckId::Grpo => "grpo",
            DeckId::KvCache => "kv-cache",
            DeckId::Sampling => "sampling",
            DeckId::Init => "init",
        }
    }

    /// Human-readable title.
    pub fn title(self) -> &'static str {
        match self {
            DeckId::Batching => "Batch Generation with Padding",
            DeckId::Sharding => "Checkpoint Sharding with ZeRO",
            DeckId::Grpo => "Group-Relative Policy Optimization",
            DeckId::KvCache => "KV Cache Growth",
            DeckId::Sampling => "Token Sampling",
            DeckId::Init => "System Initialization",
        }
    }

    /// Build the deck and pass it to `visitor`.
    pub fn visit<T: DeckVisitor>(self, visitor: T) -> T::Output {
        match self {
            DeckId::Batching => visitor.visit(batching::deck()),
            DeckId::Sharding => visitor.visit(sharding::deck()),
            DeckId::Grpo => visitor.visit(grpo::deck()),
            DeckId::KvCache => visitor.visit(kv_cache::deck()),
            DeckId::Sampling => visitor.visit(sampling::deck()),
            DeckId::Init => visitor.visit(init::deck()),
        }
    }
}

impl fmt::Display for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DeckId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        DeckId::ALL
            .into_iter()
            .find(|id| id.name() == wanted || (wanted == "kv" && *id == DeckId::KvCache))
            .ok_or_else(|| Error::UnknownDeck(s.to_string()))
    }
}

/// Operation over a deck of any visual type.
pub trait DeckVisitor {
    type Output;

    fn visit<V: Visual>(self, deck: Deck<V>) -> Self::Output;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Summary;

    impl DeckVisitor for Summary {
        type Output = (&'static str, &'static str, usize);

        fn visit<V: Visual>(self, deck: Deck<V>) -> Self::Output {
            (deck.id, deck.title, deck.len())
        }
    }

    #[test]
    fn test_names_round_trip() {
        for id in DeckId::ALL {
            assert_eq!(id.name().parse::<DeckId>().unwrap(), id);
        }
        assert_eq!("KV_CACHE".parse::<DeckId>().unwrap(), DeckId::KvCache);
        assert!(matches!(
            "attention".parse::<DeckId>(),
            Err(Error::UnknownDeck(_))
        ));
    }

    #[test]
    fn test_ids_and_titles_match_decks() {
        for id in DeckId::ALL {
            let (deck_id, title, len) = id.visit(Summary);
            assert_eq!(deck_id, id.name());
            assert_eq!(title, id.title());
            assert!(len > 0);
        }
    }
}

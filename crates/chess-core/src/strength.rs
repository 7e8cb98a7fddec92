//! Mapping from a requested rating to engine search parameters.
//!
//! Tiers are matched in order: the first tier whose upper bound is at least the
//! requested rating wins, ratings below the first bound land in the first tier,
//! and the final tier has no upper bound.

use serde::Deserialize;
use thiserror::Error;

/// Highest skill level the engine accepts.
pub const MAX_SKILL_LEVEL: u8 = 20;

/// Search parameters handed to the engine for one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStrength {
    pub skill_level: u8,
    pub depth: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SkillTier {
    /// Inclusive upper rating bound; `None` for the open-ended last tier
    pub max_rating: Option<i64>,
    pub skill_level: u8,
    pub depth: u32,
}

impl SkillTier {
    const fn new(max_rating: Option<i64>, skill_level: u8, depth: u32) -> Self {
        Self {
            max_rating,
            skill_level,
            depth,
        }
    }

    pub fn strength(&self) -> EngineStrength {
        EngineStrength {
            skill_level: self.skill_level,
            depth: self.depth,
        }
    }
}

const DEFAULT_TIERS: [SkillTier; 5] = [
    SkillTier::new(Some(1000), 1, 5),
    SkillTier::new(Some(1400), 5, 8),
    SkillTier::new(Some(1800), 10, 12),
    SkillTier::new(Some(2200), 15, 15),
    SkillTier::new(None, 20, 20),
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TierTableError {
    #[error("tier table is empty")]
    Empty,

    #[error("only the last tier may omit max_rating (tier {0})")]
    UnboundedBeforeLast(usize),

    #[error("the last tier must omit max_rating")]
    BoundedLast,

    #[error("max_rating must strictly increase (tier {0})")]
    BoundsNotAscending(usize),

    #[error("skill_level must be at most 20 (tier {0})")]
    SkillOutOfRange(usize),

    #[error("depth must be at least 1 (tier {0})")]
    ZeroDepth(usize),

    #[error("skill_level and depth must not decrease as rating rises (tier {0})")]
    NotMonotonic(usize),

    #[error("invalid tier JSON: {0}")]
    Json(String),
}

/// An ordered, validated list of skill tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierTable {
    tiers: Vec<SkillTier>,
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            tiers: DEFAULT_TIERS.to_vec(),
        }
    }
}

impl TierTable {
    pub fn new(tiers: Vec<SkillTier>) -> Result<Self, TierTableError> {
        let last = tiers.len().checked_sub(1).ok_or(TierTableError::Empty)?;

        for (i, tier) in tiers.iter().enumerate() {
            if tier.skill_level > MAX_SKILL_LEVEL {
                return Err(TierTableError::SkillOutOfRange(i));
            }
            if tier.depth == 0 {
                return Err(TierTableError::ZeroDepth(i));
            }
            match (i == last, tier.max_rating) {
                (true, Some(_)) => return Err(TierTableError::BoundedLast),
                (false, None) => return Err(TierTableError::UnboundedBeforeLast(i)),
                _ => {}
            }
        }

        for (i, pair) in tiers.windows(2).enumerate() {
            let (lower, upper) = (&pair[0], &pair[1]);
            if let (Some(a), Some(b)) = (lower.max_rating, upper.max_rating) {
                if b <= a {
                    return Err(TierTableError::BoundsNotAscending(i + 1));
                }
            }
            if upper.skill_level < lower.skill_level || upper.depth < lower.depth {
                return Err(TierTableError::NotMonotonic(i + 1));
            }
        }

        Ok(Self { tiers })
    }

    /// Parse a JSON array of tiers, e.g.
    /// `[{"max_rating": 1200, "skill_level": 3, "depth": 6}, {"max_rating": null, "skill_level": 20, "depth": 18}]`.
    pub fn from_json(json: &str) -> Result<Self, TierTableError> {
        let tiers: Vec<SkillTier> =
            serde_json::from_str(json).map_err(|e| TierTableError::Json(e.to_string()))?;
        Self::new(tiers)
    }

    pub fn tiers(&self) -> &[SkillTier] {
        &self.tiers
    }

    /// Map a rating to engine parameters. Total over every `i64`.
    pub fn map(&self, rating: i64) -> EngineStrength {
        // Validated tables are never empty and end with the unbounded tier
        let last = &self.tiers[self.tiers.len() - 1];
        self.tiers
            .iter()
            .find(|tier| tier.max_rating.is_some_and(|max| rating <= max))
            .unwrap_or(last)
            .strength()
    }
}

//! Pairing policy: which two waiting players may form a session.

use duelgrid_protocol::Player;

/// Decides whether two waiting players are compatible.
///
/// The queue stores the policy behind a `dyn` pointer, so swapping in a
/// ranked-ladder or party-aware policy touches nothing but construction.
pub trait MatchPolicy: Send + Sync + 'static {
    /// `true` if `a` and `b` may be paired. Must be symmetric.
    fn compatible(&self, a: &Player, b: &Player) -> bool;
}

/// The default policy: skill levels within a tolerance window, same region.
#[derive(Debug, Clone, Copy)]
pub struct SkillRegion {
    /// Maximum allowed skill-level difference.
    pub skill_tolerance: i32,
}

impl Default for SkillRegion {
    fn default() -> Self {
        Self { skill_tolerance: 2 }
    }
}

impl MatchPolicy for SkillRegion {
    fn compatible(&self, a: &Player, b: &Player) -> bool {
        (a.skill_level - b.skill_level).abs() <= self.skill_tolerance
            && a.region == b.region
    }
}

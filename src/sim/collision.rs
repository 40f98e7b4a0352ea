//! Player/entity contact detection and per-kind resolution

use super::state::{Entity, EntityKind, Player};
use crate::consts::{COLLISION_FAR_Z, COLLISION_NEAR_Z, PLAYER_HALF_WIDTH};

/// What a contact does to the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Nothing happens (out of reach, jumped over, or protected)
    None,
    /// A credit token was picked up
    CollectCredit,
    /// A shield token was picked up
    CollectShield,
    /// A barrier was absorbed by spending a shield
    ShieldSpent,
    /// A barrier ended the run
    Fatal,
}

impl Contact {
    /// Whether the entity is consumed by this contact
    pub fn removes_entity(&self) -> bool {
        matches!(self, Contact::CollectCredit | Contact::CollectShield)
    }
}

/// Whether an entity is inside the player's collision volume footprint
pub fn touches(player: &Player, entity: &Entity) -> bool {
    entity.pos.z < COLLISION_FAR_Z
        && entity.pos.z > COLLISION_NEAR_Z
        && entity.overlaps_x(player.pos.x, PLAYER_HALF_WIDTH)
}

/// Decide what touching `entity` does, given the shields available
pub fn resolve(player: &Player, entity: &Entity, shields: u32) -> Contact {
    if !touches(player, entity) {
        return Contact::None;
    }

    match entity.kind {
        EntityKind::CreditToken => Contact::CollectCredit,
        EntityKind::ShieldToken => Contact::CollectShield,
        EntityKind::LowBarrier | EntityKind::TallBarrier | EntityKind::Bus | EntityKind::Weaver => {
            if player.pos.y >= entity.height || player.invincible {
                Contact::None
            } else if shields > 0 {
                Contact::ShieldSpent
            } else {
                Contact::Fatal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grounded_player() -> Player {
        let mut player = Player::spawn(0.0);
        player.invincible = false;
        player
    }

    #[test]
    fn test_depth_band() {
        let player = grounded_player();
        let mut e = Entity::new(1, EntityKind::TallBarrier, 1, 40.0);
        assert!(!touches(&player, &e));
        e.pos.z = 39.0;
        assert!(touches(&player, &e));
        e.pos.z = -60.0;
        assert!(!touches(&player, &e));
    }

    #[test]
    fn test_other_lane_is_safe() {
        let player = grounded_player();
        let e = Entity::new(1, EntityKind::Bus, 0, 0.0);
        assert_eq!(resolve(&player, &e, 0), Contact::None);
    }

    #[test]
    fn test_barrier_outcomes() {
        let mut player = grounded_player();
        let e = Entity::new(1, EntityKind::LowBarrier, 1, 0.0);
        assert_eq!(resolve(&player, &e, 0), Contact::Fatal);
        assert_eq!(resolve(&player, &e, 2), Contact::ShieldSpent);

        player.pos.y = 61.0;
        assert_eq!(resolve(&player, &e, 0), Contact::None);

        player.pos.y = 0.0;
        player.invincible = true;
        assert_eq!(resolve(&player, &e, 0), Contact::None);
    }

    #[test]
    fn test_tokens_collect_even_while_invincible() {
        let mut player = grounded_player();
        player.invincible = true;
        let credit = Entity::new(1, EntityKind::CreditToken, 1, 0.0);
        let shield = Entity::new(2, EntityKind::ShieldToken, 1, 0.0);
        assert_eq!(resolve(&player, &credit, 0), Contact::CollectCredit);
        assert_eq!(resolve(&player, &shield, 0), Contact::CollectShield);
        assert!(Contact::CollectCredit.removes_entity());
        assert!(!Contact::ShieldSpent.removes_entity());
    }
}

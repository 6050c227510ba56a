//! Travellers: a category spec.md §3 requires exist, even though none of
//! the literal end-to-end scenarios in §8 place one. `Vagrant` is a minimal
//! no-ability Traveller, present purely to exercise the category.

use super::{RoleAbility, RoleKind};

#[derive(Clone, Debug, Default)]
pub struct Vagrant;
impl RoleAbility for Vagrant {
    fn kind(&self) -> RoleKind {
        RoleKind::Vagrant
    }
}

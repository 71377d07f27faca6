use crate::picker::PickResult;
use cubefield_common::{Color, EntityId};
use cubefield_kernel::EntityGrid;

pub const HIGHLIGHT_SCALE: f32 = 2.0;

/// How the hovered entity changed with the latest pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverChange {
    Unchanged,
    Entered(EntityId),
    Left(EntityId),
    Moved { from: EntityId, to: EntityId },
}

/// Keeps at most one entity highlighted: the one under the pointer.
#[derive(Debug, Clone)]
pub struct HighlightController {
    color: Color,
    scale: f32,
    current: Option<EntityId>,
}

impl Default for HighlightController {
    fn default() -> Self {
        Self::new(Color::WHITE, HIGHLIGHT_SCALE)
    }
}

impl HighlightController {
    pub fn new(color: Color, scale: f32) -> Self {
        Self {
            color,
            scale,
            current: None,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Entity highlighted by the last call, if any.
    pub fn current(&self) -> Option<EntityId> {
        self.current
    }

    /// Reset every entity to its base appearance, then highlight the picked
    /// one. An id the grid does not know is treated as a miss.
    pub fn apply_hover(&mut self, grid: &mut EntityGrid, pick: PickResult) -> HoverChange {
        for entity in grid.entities_mut() {
            entity.reset_appearance();
        }

        let target = match pick {
            PickResult::Hit(hit) => match grid.entity_mut(hit.entity) {
                Some(entity) => {
                    entity.set_highlight(self.color, self.scale);
                    Some(hit.entity)
                }
                None => {
                    tracing::warn!(entity = %hit.entity, "pick hit an entity outside the grid");
                    None
                }
            },
            PickResult::Miss => None,
        };

        let change = match (self.current, target) {
            (None, None) => HoverChange::Unchanged,
            (Some(a), Some(b)) if a == b => HoverChange::Unchanged,
            (None, Some(to)) => HoverChange::Entered(to),
            (Some(from), None) => HoverChange::Left(from),
            (Some(from), Some(to)) => HoverChange::Moved { from, to },
        };
        self.current = target;
        if change != HoverChange::Unchanged {
            tracing::debug!(?change, "hover changed");
        }
        change
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picker::Hit;

    fn hit(id: u32) -> PickResult {
        PickResult::Hit(Hit {
            entity: EntityId(id),
            distance: 1.0,
        })
    }

    fn assert_default(grid: &EntityGrid, except: Option<EntityId>) {
        for entity in grid.entities() {
            if Some(entity.id()) == except {
                continue;
            }
            assert_eq!(entity.color(), entity.base_color());
            assert_eq!(entity.scale(), 1.0);
            assert!(!entity.is_highlighted());
        }
    }

    #[test]
    fn miss_leaves_everything_default() {
        let mut grid = EntityGrid::with_seed(4);
        let mut controller = HighlightController::default();
        assert_eq!(controller.apply_hover(&mut grid, PickResult::Miss), HoverChange::Unchanged);
        assert_default(&grid, None);
    }

    #[test]
    fn hit_highlights_exactly_one() {
        let mut grid = EntityGrid::with_seed(4);
        let mut controller = HighlightController::default();
        assert_eq!(
            controller.apply_hover(&mut grid, hit(42)),
            HoverChange::Entered(EntityId(42))
        );

        let e = grid.entity(EntityId(42)).unwrap();
        assert_eq!(e.color(), Color::WHITE);
        assert_eq!(e.scale(), 2.0);
        assert!(e.is_highlighted());
        assert_eq!(grid.highlighted().count(), 1);
        assert_default(&grid, Some(EntityId(42)));
    }

    #[test]
    fn transitions_are_reported() {
        let mut grid = EntityGrid::with_seed(4);
        let mut controller = HighlightController::default();
        controller.apply_hover(&mut grid, hit(1));
        assert_eq!(controller.apply_hover(&mut grid, hit(1)), HoverChange::Unchanged);
        assert_eq!(
            controller.apply_hover(&mut grid, hit(2)),
            HoverChange::Moved {
                from: EntityId(1),
                to: EntityId(2)
            }
        );
        assert_eq!(grid.highlighted().count(), 1);
        assert_eq!(
            controller.apply_hover(&mut grid, PickResult::Miss),
            HoverChange::Left(EntityId(2))
        );
        assert_default(&grid, None);
        assert_eq!(controller.current(), None);
    }

    #[test]
    fn stale_highlight_is_cleared_even_if_set_elsewhere() {
        let mut grid = EntityGrid::with_seed(4);
        grid.entity_mut(EntityId(9))
            .unwrap()
            .set_highlight(Color::BLACK, 3.0);
        HighlightController::default().apply_hover(&mut grid, hit(10));
        assert_eq!(grid.highlighted().map(|e| e.id()).collect::<Vec<_>>(), vec![EntityId(10)]);
    }

    #[test]
    fn unknown_entity_is_a_miss() {
        let mut grid = EntityGrid::with_seed(4);
        let mut controller = HighlightController::default();
        assert_eq!(controller.apply_hover(&mut grid, hit(5_000)), HoverChange::Unchanged);
        assert_default(&grid, None);
    }

    #[test]
    fn custom_color_and_scale() {
        let mut grid = EntityGrid::with_seed(4);
        let mut controller = HighlightController::new(Color::BLACK, 1.5);
        controller.apply_hover(&mut grid, hit(0));
        let e = grid.entity(EntityId(0)).unwrap();
        assert_eq!((e.color(), e.scale()), (Color::BLACK, 1.5));
    }
}

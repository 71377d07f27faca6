use cubefield_common::{Color, EntityId, LatticeCoord};
use cubefield_kernel::EntityGrid;
use std::collections::BTreeMap;

/// Read-only queries against the entity grid for the diagnostics overlay.
pub struct GridInspector;

impl GridInspector {
    pub fn summary(grid: &EntityGrid) -> GridSummary {
        let mut histogram: BTreeMap<u32, usize> = BTreeMap::new();
        for entity in grid.entities() {
            *histogram.entry(entity.base_color().to_hex()).or_default() += 1;
        }
        GridSummary {
            size: grid.size(),
            entity_count: grid.len(),
            highlighted: grid.highlighted().next().map(|e| e.id()),
            group_rotation: grid.group_rotation().to_array(),
            palette_histogram: histogram
                .into_iter()
                .map(|(hex, count)| (Color::from_hex(hex), count))
                .collect(),
        }
    }

    pub fn inspect_entity(grid: &EntityGrid, id: EntityId) -> Option<EntityInfo> {
        grid.entity(id).map(|e| EntityInfo {
            id,
            coord: e.coord(),
            position: e.position().to_array(),
            rotation: e.rotation().to_array(),
            scale: e.scale(),
            color: e.color(),
            base_color: e.base_color(),
            highlighted: e.is_highlighted(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct GridSummary {
    pub size: u32,
    pub entity_count: usize,
    pub highlighted: Option<EntityId>,
    pub group_rotation: [f32; 3],
    /// Entities per base color, ordered by color value.
    pub palette_histogram: Vec<(Color, usize)>,
}

impl std::fmt::Display for GridSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Grid: {}³ entities={}", self.size, self.entity_count)?;
        match self.highlighted {
            Some(id) => write!(f, " hover={id}"),
            None => write!(f, " hover=none"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EntityInfo {
    pub id: EntityId,
    pub coord: LatticeCoord,
    pub position: [f32; 3],
    /// Euler XYZ radians.
    pub rotation: [f32; 3],
    pub scale: f32,
    pub color: Color,
    pub base_color: Color,
    pub highlighted: bool,
}

impl std::fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Entity {} at ({}, {}, {}) pos=({:.1}, {:.1}, {:.1}) rot=({:.2}, {:.2}, {:.2}) scale={:.1} color={}",
            self.id,
            self.coord.x,
            self.coord.y,
            self.coord.z,
            self.position[0],
            self.position[1],
            self.position[2],
            self.rotation[0],
            self.rotation[1],
            self.rotation[2],
            self.scale,
            self.color,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubefield_kernel::DEFAULT_PALETTE;

    #[test]
    fn summary_counts_everything() {
        let grid = EntityGrid::with_seed(5);
        let summary = GridInspector::summary(&grid);
        assert_eq!(summary.size, 10);
        assert_eq!(summary.entity_count, 1000);
        assert_eq!(summary.highlighted, None);

        let total: usize = summary.palette_histogram.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 1000);
        for (color, _) in &summary.palette_histogram {
            assert!(DEFAULT_PALETTE.contains(color));
        }
    }

    #[test]
    fn summary_reports_hover() {
        let mut grid = EntityGrid::with_seed(5);
        grid.entity_mut(EntityId(12))
            .unwrap()
            .set_highlight(Color::WHITE, 2.0);
        let summary = GridInspector::summary(&grid);
        assert_eq!(summary.highlighted, Some(EntityId(12)));
        assert!(summary.to_string().contains("hover=#12"));
    }

    #[test]
    fn inspect_entity_found() {
        let mut grid = EntityGrid::with_seed(5);
        grid.update(0.0);
        let info = GridInspector::inspect_entity(&grid, EntityId(0)).unwrap();
        assert_eq!(info.coord, LatticeCoord::new(0, 0, 0));
        assert_eq!(info.position, [5.0, 5.0, 5.0]);
        assert!((info.rotation[1] - 2.847).abs() < 1e-3);
        assert!(info.to_string().starts_with("Entity #0 at (0, 0, 0)"));
    }

    #[test]
    fn inspect_entity_not_found() {
        let grid = EntityGrid::with_seed(5);
        assert!(GridInspector::inspect_entity(&grid, EntityId(1000)).is_none());
    }
}

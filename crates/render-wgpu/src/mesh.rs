use bytemuck::{Pod, Zeroable};
use cubefield_kernel::EntityGrid;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

/// Per-cube data uploaded each frame.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
}

/// Cube of the given edge length centered at the origin.
pub(crate) fn cube_mesh(edge: f32) -> (Vec<Vertex>, Vec<u16>) {
    let p = edge * 0.5;
    let v = |position: [f32; 3], normal: [f32; 3]| Vertex { position, normal };
    #[rustfmt::skip]
    let vertices = vec![
        // +Z
        v([-p, -p,  p], [0.0, 0.0, 1.0]),
        v([ p, -p,  p], [0.0, 0.0, 1.0]),
        v([ p,  p,  p], [0.0, 0.0, 1.0]),
        v([-p,  p,  p], [0.0, 0.0, 1.0]),
        // -Z
        v([ p, -p, -p], [0.0, 0.0, -1.0]),
        v([-p, -p, -p], [0.0, 0.0, -1.0]),
        v([-p,  p, -p], [0.0, 0.0, -1.0]),
        v([ p,  p, -p], [0.0, 0.0, -1.0]),
        // +X
        v([ p, -p,  p], [1.0, 0.0, 0.0]),
        v([ p, -p, -p], [1.0, 0.0, 0.0]),
        v([ p,  p, -p], [1.0, 0.0, 0.0]),
        v([ p,  p,  p], [1.0, 0.0, 0.0]),
        // -X
        v([-p, -p, -p], [-1.0, 0.0, 0.0]),
        v([-p, -p,  p], [-1.0, 0.0, 0.0]),
        v([-p,  p,  p], [-1.0, 0.0, 0.0]),
        v([-p,  p, -p], [-1.0, 0.0, 0.0]),
        // +Y
        v([-p,  p,  p], [0.0, 1.0, 0.0]),
        v([ p,  p,  p], [0.0, 1.0, 0.0]),
        v([ p,  p, -p], [0.0, 1.0, 0.0]),
        v([-p,  p, -p], [0.0, 1.0, 0.0]),
        // -Y
        v([-p, -p, -p], [0.0, -1.0, 0.0]),
        v([ p, -p, -p], [0.0, -1.0, 0.0]),
        v([ p, -p,  p], [0.0, -1.0, 0.0]),
        v([-p, -p,  p], [0.0, -1.0, 0.0]),
    ];
    #[rustfmt::skip]
    let indices: Vec<u16> = vec![
        0,1,2, 2,3,0,
        4,5,6, 6,7,4,
        8,9,10, 10,11,8,
        12,13,14, 14,15,12,
        16,17,18, 18,19,16,
        20,21,22, 22,23,20,
    ];
    (vertices, indices)
}

/// One instance per entity, in id order, with its world matrix and current
/// display color in linear space.
pub fn grid_instances(grid: &EntityGrid) -> Vec<InstanceData> {
    let group = grid.group_matrix();
    grid.entities()
        .iter()
        .map(|entity| {
            let cols = (group * entity.local_transform().to_matrix()).to_cols_array_2d();
            InstanceData {
                model_0: cols[0],
                model_1: cols[1],
                model_2: cols[2],
                model_3: cols[3],
                color: entity.color().to_linear().to_rgba(),
            }
        })
        .collect()
}

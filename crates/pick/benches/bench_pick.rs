use std::hint::black_box;
use std::time::Instant;

use cubefield_common::Viewport;
use cubefield_kernel::EntityGrid;
use cubefield_pick::{HighlightController, Picker, Raycast};
use cubefield_render::PerspectiveCamera;
use glam::Vec2;

fn bench_pick(iterations: usize) {
    let mut grid = EntityGrid::with_seed(11);
    grid.update(1.5);
    let camera = PerspectiveCamera::default();
    let viewport = Viewport::new(1280, 720);
    let picker = Picker::new();
    let targets: [&dyn Raycast; 1] = [&grid];

    let mut hits = 0usize;
    let start = Instant::now();
    for i in 0..iterations {
        let pointer = Vec2::new((i * 37 % 1280) as f32, (i * 53 % 720) as f32);
        if picker.pick(black_box(pointer), viewport, &camera, &targets).is_hit() {
            hits += 1;
        }
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  pick ({} entities, {iterations} picks, {hits} hits): {per_iter:?}/pick, total {elapsed:?}",
        grid.len()
    );
}

fn bench_hover(iterations: usize) {
    let mut grid = EntityGrid::with_seed(11);
    let camera = PerspectiveCamera::default();
    let viewport = Viewport::new(1280, 720);
    let picker = Picker::new();
    let mut controller = HighlightController::default();

    let start = Instant::now();
    for i in 0..iterations {
        let pointer = Vec2::new(640.0 + (i % 40) as f32, 360.0);
        let result = picker.pick(pointer, viewport, &camera, &[&grid]);
        black_box(controller.apply_hover(&mut grid, result));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  pick + highlight ({iterations} moves): {per_iter:?}/move, total {elapsed:?}");
}

fn main() {
    println!("=== bench_pick ===");
    bench_pick(2_000);
    bench_hover(1_000);
}

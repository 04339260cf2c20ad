//! Primary ray benchmark: a pinhole camera looking at a cloud of random triangles.

use std::time::{Duration, Instant};

use glam::Vec3A;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;

use kd_accel::*;

const TRIANGLES_NUM: usize = 20_000;

const CAM_POS: Vec3A = Vec3A::new(0.0, 0.0, -18.0);
const P0: Vec3A = Vec3A::new(-1.0, 1.0, -15.0);
const P1: Vec3A = Vec3A::new(1.0, 1.0, -15.0);
const P2: Vec3A = Vec3A::new(-1.0, -1.0, -15.0);

const RESOLUTION_X: u32 = 640;
const RESOLUTION_Y: u32 = 640;

fn random_triangles(rng: &mut StdRng, count: usize) -> Vec<Triangle> {
    (0..count)
        .map(|_| {
            let v0 = rng.gen::<Vec3A>() * 9.0 - Vec3A::splat(5.0);
            let v1 = v0 + rng.gen::<Vec3A>() - Vec3A::splat(0.5);
            let v2 = v0 + rng.gen::<Vec3A>() - Vec3A::splat(0.5);
            Triangle::new(v0, v1, v2)
        })
        .collect()
}

fn camera_rays() -> Vec<Ray> {
    (0..RESOLUTION_Y)
        .flat_map(|y| (0..RESOLUTION_X).map(move |x| (x, y)))
        .map(|(x, y)| {
            let pixel_pos = P0
                + (P1 - P0) * (x as f32 / RESOLUTION_X as f32)
                + (P2 - P0) * (y as f32 / RESOLUTION_Y as f32);
            Ray::infinite_ray(CAM_POS, (pixel_pos - CAM_POS).normalize_or_zero())
        })
        .collect()
}

fn report(name: &str, rays: usize, hits: usize, elapsed: Duration) {
    let mrays = rays as f64 / elapsed.as_secs_f64() / 1e6;
    println!(
        "{:<24} {:>10.2?}  {:>8.2} Mrays/s  ({} hits)",
        name, elapsed, mrays, hits
    );
}

fn main() {
    let mut rng = StdRng::seed_from_u64(95756739);
    let triangles = random_triangles(&mut rng, TRIANGLES_NUM);
    let rays = camera_rays();

    println!("kd-tree benchmark");
    println!("=================\n");

    let build_start = Instant::now();
    let tree = KdTree::with_default_config(triangles.clone());
    let build_time = build_start.elapsed();
    println!("Build: {:.2?}", build_time);
    println!("{}\n", tree.stats());

    // the linear scan is slow, only a slice of the rays is traced
    let linear_rays = &rays[..rays.len() / 16];
    let start = Instant::now();
    let hits = linear_rays
        .iter()
        .filter(|ray| {
            let mut ray = **ray;
            let mut hit = false;
            for tri in &triangles {
                hit |= tri.intersect(&mut ray).is_some();
            }
            hit
        })
        .count();
    report("linear scan", linear_rays.len(), hits, start.elapsed());

    let start = Instant::now();
    let hits = rays
        .iter()
        .filter(|ray| {
            let mut ray = **ray;
            tree.find_closest_hit(&mut ray).is_some()
        })
        .count();
    report("closest hit", rays.len(), hits, start.elapsed());

    let start = Instant::now();
    let mut mailbox = CounterMailbox::new(tree.primitives().len());
    let hits = rays
        .iter()
        .filter(|ray| {
            let mut ray = **ray;
            tree.find_closest_hit_with_mailbox(&mut ray, &mut mailbox).is_some()
        })
        .count();
    report("closest hit (counter)", rays.len(), hits, start.elapsed());

    let start = Instant::now();
    let hits = rays.iter().filter(|ray| tree.exists_hit(ray)).count();
    report("any hit", rays.len(), hits, start.elapsed());

    let start = Instant::now();
    let hits = rays
        .par_iter()
        .filter(|ray| {
            let mut ray = **ray;
            tree.find_closest_hit(&mut ray).is_some()
        })
        .count();
    report("closest hit (rayon)", rays.len(), hits, start.elapsed());
}

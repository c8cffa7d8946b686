//! Node placement
//!
//! All layouts place nodes around the origin within `LAYOUT_SCALE`.

use std::collections::HashMap;
use std::f64::consts::TAU;

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{Layout, SocialGraph};

/// Half-width of the square every layout fits into
pub const LAYOUT_SCALE: f64 = 10.0;

const SPRING_SEED: u64 = 0x5EED_F011;
const SPRING_ITERATIONS: usize = 50;
const SPECTRAL_ITERATIONS: usize = 500;
const MIN_DISTANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Place every node of `graph`, returned in node order.
pub fn compute_layout<'a>(graph: &SocialGraph<'a>, layout: Layout) -> Vec<(&'a str, Position)> {
    let nodes: Vec<&'a str> = graph.nodes().collect();
    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(position, node)| (*node, position))
        .collect();
    let adjacency: Vec<(usize, usize)> = graph
        .edges()
        .filter(|(a, b)| a != b)
        .map(|(a, b)| (index[a], index[b]))
        .collect();

    let positions = match (layout, nodes.len()) {
        (_, 0) => Vec::new(),
        (_, 1) => vec![Position::ORIGIN],
        (Layout::Circular, n) => circular(n),
        (Layout::Spring, n) => spring(n, &adjacency),
        // Two nodes have no informative spectrum.
        (Layout::Spectral, 2) => circular(2),
        (Layout::Spectral, n) => spectral(n, &adjacency),
    };

    nodes.into_iter().zip(positions).collect()
}

fn circular(n: usize) -> Vec<Position> {
    (0..n)
        .map(|i| {
            let theta = TAU * i as f64 / n as f64;
            Position::new(theta.cos() * LAYOUT_SCALE, theta.sin() * LAYOUT_SCALE)
        })
        .collect()
}

/// Fruchterman-Reingold force layout from a fixed seed.
fn spring(n: usize, adjacency: &[(usize, usize)]) -> Vec<Position> {
    let mut rng = StdRng::seed_from_u64(SPRING_SEED);
    let mut pos: Vec<(f64, f64)> = (0..n).map(|_| (rng.r#gen(), rng.r#gen())).collect();

    let k = (1.0 / n as f64).sqrt();
    let (min_x, max_x, min_y, max_y) = pos.iter().fold(
        (f64::MAX, f64::MIN, f64::MAX, f64::MIN),
        |(min_x, max_x, min_y, max_y), &(x, y)| {
            (min_x.min(x), max_x.max(x), min_y.min(y), max_y.max(y))
        },
    );
    let mut temperature = (max_x - min_x).max(max_y - min_y) * 0.1;
    let cooling = temperature / (SPRING_ITERATIONS as f64 + 1.0);

    for _ in 0..SPRING_ITERATIONS {
        let mut displacement = vec![(0.0_f64, 0.0_f64); n];

        // Every pair repels.
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dx = pos[i].0 - pos[j].0;
                let dy = pos[i].1 - pos[j].1;
                let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                let force = k * k / (distance * distance);
                displacement[i].0 += dx * force;
                displacement[i].1 += dy * force;
            }
        }

        // Connected pairs attract; `adjacency` holds each edge once.
        for &(a, b) in adjacency {
            let dx = pos[a].0 - pos[b].0;
            let dy = pos[a].1 - pos[b].1;
            let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
            let force = distance / k;
            displacement[a].0 -= dx * force;
            displacement[a].1 -= dy * force;
            displacement[b].0 += dx * force;
            displacement[b].1 += dy * force;
        }

        for (p, (dx, dy)) in pos.iter_mut().zip(displacement) {
            let length = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
            p.0 += dx * temperature / length;
            p.1 += dy * temperature / length;
        }
        temperature -= cooling;
    }

    rescale(pos)
}

/// Coordinates from the second and third smallest Laplacian eigenvectors.
///
/// The eigenvectors are found by power iteration on `cI - L`, deflating the
/// constant vector and every vector already found.
fn spectral(n: usize, adjacency: &[(usize, usize)]) -> Vec<Position> {
    let mut neighbours = vec![Vec::new(); n];
    for &(a, b) in adjacency {
        neighbours[a].push(b);
        neighbours[b].push(a);
    }
    let max_degree = neighbours.iter().map(Vec::len).max().unwrap_or(0);
    let shift = 2.0 * max_degree as f64 + 1.0;

    let apply = |v: &[f64]| -> Vec<f64> {
        (0..n)
            .map(|i| {
                let laplacian =
                    neighbours[i].len() as f64 * v[i] - neighbours[i].iter().map(|&j| v[j]).sum::<f64>();
                shift * v[i] - laplacian
            })
            .collect()
    };

    let mut basis: Vec<Vec<f64>> = vec![vec![1.0 / (n as f64).sqrt(); n]];
    let mut coordinates = Vec::with_capacity(2);
    for seed in 1..=2 {
        let mut v: Vec<f64> = (0..n).map(|i| ((i + seed) as f64 * 1.618).sin()).collect();
        orthonormalize(&mut v, &basis);
        for _ in 0..SPECTRAL_ITERATIONS {
            v = apply(&v);
            orthonormalize(&mut v, &basis);
        }
        basis.push(v.clone());
        coordinates.push(v);
    }

    let pos = (0..n)
        .map(|i| (coordinates[0][i], coordinates[1][i]))
        .collect();
    rescale(pos)
}

fn orthonormalize(v: &mut [f64], basis: &[Vec<f64>]) {
    for b in basis {
        let dot: f64 = v.iter().zip(b).map(|(x, y)| x * y).sum();
        for (x, y) in v.iter_mut().zip(b) {
            *x -= dot * y;
        }
    }
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > f64::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Center on the origin and stretch so the largest coordinate is `LAYOUT_SCALE`.
fn rescale(pos: Vec<(f64, f64)>) -> Vec<Position> {
    let n = pos.len() as f64;
    let (mean_x, mean_y) = pos
        .iter()
        .fold((0.0, 0.0), |(sx, sy), &(x, y)| (sx + x / n, sy + y / n));
    let centered: Vec<(f64, f64)> = pos.iter().map(|&(x, y)| (x - mean_x, y - mean_y)).collect();
    let limit = centered
        .iter()
        .fold(0.0_f64, |acc, &(x, y)| acc.max(x.abs()).max(y.abs()));
    let factor = if limit > f64::EPSILON {
        LAYOUT_SCALE / limit
    } else {
        0.0
    };

    centered
        .into_iter()
        .map(|(x, y)| Position::new(x * factor, y * factor))
        .collect()
}

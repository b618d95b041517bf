//! Candidate mark positions.
//!
//! The lattice has spacing `1000 / frequency` and overscans the canvas by one
//! cell on every side. Each lattice cell is tested against the global shape
//! in its pre-rotation position, rotated about the canvas center, then
//! jittered by an offset keyed on the cell index and the seed. Jitter never
//! depends on iteration order or output resolution.
//!
//! [`GridGenerator::iter`] is lazy and holds no state between calls: iterating
//! twice yields the same sequence.

use glam::DVec2;

use crate::geometry::in_global_shape;
use crate::prng::jitter_factors;
use crate::settings::{Direction, GlobalShape, Settings};

/// Viewport edges move in by this fraction of a spacing, so lattice points
/// that land on an edge only through rounding are classified consistently.
const EDGE_TOLERANCE: f64 = 1e-9;

/// One candidate mark position, valid for a single render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    /// Canvas position after rotation and jitter.
    pub position: DVec2,
    /// Pre-rotation lattice cell `(i, j)`; its origin sits at `(i, j) * spacing`.
    pub cell: (i64, i64),
    /// Grid rotation in radians.
    pub angle: f64,
}

/// Enumerates grid points for one canvas and settings value.
#[derive(Debug, Clone)]
pub struct GridGenerator {
    canvas: DVec2,
    spacing: f64,
    rotation: DVec2,
    angle: f64,
    jitter: f64,
    seed: i64,
    global_shape: GlobalShape,
    direction: Direction,
    cells_x: (i64, i64),
    cells_y: (i64, i64),
}

impl GridGenerator {
    /// Prepares a generator for a `width` x `height` canvas.
    ///
    /// Non-finite or non-positive dimensions produce a generator that yields
    /// nothing.
    pub fn new(width: f64, height: f64, settings: &Settings) -> Self {
        let spacing = settings.spacing();
        let angle = if settings.angle.is_finite() {
            settings.angle.to_radians()
        } else {
            0.0
        };
        let jitter = if settings.jitter.is_finite() {
            settings.jitter.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let canvas = DVec2::new(width, height);
        let rotation = DVec2::from_angle(angle);

        let mut generator = Self {
            canvas,
            spacing,
            rotation,
            angle,
            jitter,
            seed: settings.seed,
            global_shape: settings.global_shape,
            direction: settings.direction,
            cells_x: (0, -1),
            cells_y: (0, -1),
        };
        if canvas.is_finite() && width > 0.0 && height > 0.0 {
            generator.compute_cell_range();
        }
        generator
    }

    /// Lattice spacing in canvas units.
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Lazily yields every surviving grid point, row by row.
    pub fn iter(&self) -> GridIter<'_> {
        GridIter {
            generator: self,
            i: self.cells_x.0,
            j: self.cells_y.0,
        }
    }

    /// Collects [`GridGenerator::iter`].
    pub fn generate(&self) -> Vec<GridPoint> {
        self.iter().collect()
    }

    /// Lattice cells whose rotated positions can land in the overscanned
    /// viewport: the inverse-rotated viewport's bounding box, in cell units.
    fn compute_cell_range(&mut self) {
        let s = self.spacing;
        let center = self.canvas * 0.5;
        let inverse = DVec2::new(self.rotation.x, -self.rotation.y);
        let (min, max) = self.viewport();
        let corners = [min, DVec2::new(max.x, min.y), DVec2::new(min.x, max.y), max];
        let mut lo = DVec2::splat(f64::INFINITY);
        let mut hi = DVec2::splat(f64::NEG_INFINITY);
        for corner in corners {
            let p = center + inverse.rotate(corner - center);
            lo = lo.min(p);
            hi = hi.max(p);
        }
        self.cells_x = ((lo.x / s).floor() as i64, (hi.x / s).ceil() as i64);
        self.cells_y = ((lo.y / s).floor() as i64, (hi.y / s).ceil() as i64);
    }

    /// Canvas extended by one spacing on each side; max edge exclusive.
    fn viewport(&self) -> (DVec2, DVec2) {
        let pad = DVec2::splat(self.spacing);
        (-pad, self.canvas + pad)
    }

    fn point_at(&self, i: i64, j: i64) -> Option<GridPoint> {
        let s = self.spacing;
        let lattice = DVec2::new(i as f64 * s, j as f64 * s);
        if !in_global_shape(lattice, self.canvas, self.global_shape, self.direction) {
            return None;
        }

        let mut position = if self.angle == 0.0 {
            lattice
        } else {
            let center = self.canvas * 0.5;
            center + self.rotation.rotate(lattice - center)
        };
        let (min, max) = self.viewport();
        let tolerance = DVec2::splat(s * EDGE_TOLERANCE);
        if position.cmplt(min - tolerance).any() || position.cmpge(max - tolerance).any() {
            return None;
        }

        if self.jitter > 0.0 {
            let (jx, jy) = jitter_factors(self.seed, i, j);
            position += DVec2::new(jx, jy) * (s * self.jitter);
        }

        Some(GridPoint {
            position,
            cell: (i, j),
            angle: self.angle,
        })
    }
}

/// Lazy iterator over a [`GridGenerator`]'s points.
#[derive(Debug, Clone)]
pub struct GridIter<'a> {
    generator: &'a GridGenerator,
    i: i64,
    j: i64,
}

impl Iterator for GridIter<'_> {
    type Item = GridPoint;

    fn next(&mut self) -> Option<GridPoint> {
        let (x0, x1) = self.generator.cells_x;
        let (_, y1) = self.generator.cells_y;
        while self.j <= y1 && x0 <= x1 {
            let (i, j) = (self.i, self.j);
            if self.i < x1 {
                self.i += 1;
            } else {
                self.i = x0;
                self.j += 1;
            }
            if let Some(point) = self.generator.point_at(i, j) {
                return Some(point);
            }
        }
        None
    }
}

/// Grid points for a `width` x `height` canvas.
pub fn generate(width: f64, height: f64, settings: &Settings) -> Vec<GridPoint> {
    GridGenerator::new(width, height, settings).generate()
}

//! Force contributors for the spring-based particle systems
//!
//! Defines the [`ForceTerm`] trait and the [`ForceSet`] collection, plus the
//! terms the pendulum and cloth are assembled from: uniform gravity, linear
//! drag, a serial spring chain and the structural/shear/flexion grid mesh.

use crate::error::{SimError, SimResult};
use crate::simulation::params::{RestLengths, SpringConstants};
use crate::simulation::states::{NVec3, StateVector};

/// Separations at or below this are treated as coincident particles.
pub const MIN_SEPARATION: f64 = 1e-12;

/// Hooke's-law force on particle `i` (at `xi`) from its spring to `j` (at `xj`)
///
/// `F = -k (|d| - L) d / |d|` with `d = xi - xj`. Coincident endpoints have no
/// defined direction and fail with [`SimError::DegenerateGeometry`].
pub fn hooke_force(
    xi: NVec3,
    xj: NVec3,
    k: f64,
    rest_length: f64,
    (i, j): (usize, usize),
) -> SimResult<NVec3> {
    let d = xi - xj;
    let len = d.norm();
    if len <= MIN_SEPARATION {
        return Err(SimError::DegenerateGeometry { first: i, second: j });
    }
    Ok(-k * (len - rest_length) * (d / len))
}

/// Collection of force terms (gravity, drag, springs)
/// Each term implements [`ForceTerm`] and their contributions are summed
/// into a single force vector per particle
pub struct ForceSet {
    terms: Vec<Box<dyn ForceTerm + Send + Sync>>,
}

impl Default for ForceSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceSet {
    /// Create an empty force set
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Add a force term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: ForceTerm + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Compute total forces for all particles of `state`
    /// - `out[i]` is overwritten with the sum of contributions from all terms
    pub fn accumulate_forces(&self, state: &StateVector, out: &mut [NVec3]) -> SimResult<()> {
        if out.len() != state.particle_count() {
            return Err(SimError::ShapeMismatch {
                expected: state.particle_count(),
                found: out.len(),
            });
        }
        for f in out.iter_mut() {
            *f = NVec3::zeros();
        }
        for term in &self.terms {
            term.accumulate(state, out)?;
        }
        Ok(())
    }
}

/// A force source operating on a full state snapshot
/// Implementations add their contribution into `out[i]` for each particle
pub trait ForceTerm {
    fn accumulate(&self, state: &StateVector, out: &mut [NVec3]) -> SimResult<()>;
}

/// Constant gravity `mass * g` along y
pub struct UniformGravity {
    pub mass: f64,
    pub g: f64,
}

impl ForceTerm for UniformGravity {
    fn accumulate(&self, _state: &StateVector, out: &mut [NVec3]) -> SimResult<()> {
        let f = NVec3::new(0.0, self.mass * self.g, 0.0);
        for o in out.iter_mut() {
            *o += f;
        }
        Ok(())
    }
}

/// Linear viscous drag `-k v`
pub struct LinearDrag {
    pub k: f64,
}

impl ForceTerm for LinearDrag {
    fn accumulate(&self, state: &StateVector, out: &mut [NVec3]) -> SimResult<()> {
        for (o, v) in out.iter_mut().zip(state.velocities()) {
            *o -= self.k * v;
        }
        Ok(())
    }
}

/// Springs between consecutive particles `i - 1` and `i`
pub struct ChainSprings {
    pub k: f64,
    pub rest_length: f64,
}

impl ForceTerm for ChainSprings {
    fn accumulate(&self, state: &StateVector, out: &mut [NVec3]) -> SimResult<()> {
        for i in 1..state.particle_count() {
            let f = hooke_force(
                state.position_at(i),
                state.position_at(i - 1),
                self.k,
                self.rest_length,
                (i, i - 1),
            )?;
            // equal and opposite on the pair
            out[i] += f;
            out[i - 1] -= f;
        }
        Ok(())
    }
}

/// Cloth spring categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpringKind {
    Structural, // (+-1, 0), (0, +-1)
    Shear,      // (+-1, +-1)
    Flexion,    // (+-2, 0), (0, +-2)
}

/// One undirected spring between particles `a` and `b`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spring {
    pub a: usize,
    pub b: usize,
    pub kind: SpringKind,
}

/// Forward (column, row) offsets; together with their negations they cover
/// every neighbor, so each undirected spring is visited exactly once.
static FORWARD_OFFSETS: [(isize, isize, SpringKind); 6] = [
    (1, 0, SpringKind::Structural),
    (0, 1, SpringKind::Structural),
    (1, 1, SpringKind::Shear),
    (-1, 1, SpringKind::Shear),
    (2, 0, SpringKind::Flexion),
    (0, 2, SpringKind::Flexion),
];

/// Structural, shear and flexion springs of a `width x height` particle grid
///
/// Particle `(c, r)` is index `r * width + c`. Springs are derived from the
/// offset rules on every call and never stored.
pub struct GridSprings {
    pub width: usize,
    pub height: usize,
    pub constants: SpringConstants,
    pub rest_lengths: RestLengths,
}

impl GridSprings {
    /// Every spring of the mesh, each listed once
    pub fn springs(&self) -> impl Iterator<Item = Spring> + '_ {
        let (w, h) = (self.width as isize, self.height as isize);
        (0..h).flat_map(move |r| {
            (0..w).flat_map(move |c| {
                FORWARD_OFFSETS.iter().filter_map(move |&(dc, dr, kind)| {
                    let (nc, nr) = (c + dc, r + dr);
                    if nc < 0 || nc >= w || nr < 0 || nr >= h {
                        return None;
                    }
                    Some(Spring {
                        a: (r * w + c) as usize,
                        b: (nr * w + nc) as usize,
                        kind,
                    })
                })
            })
        })
    }

    pub fn constant(&self, kind: SpringKind) -> f64 {
        match kind {
            SpringKind::Structural => self.constants.structural,
            SpringKind::Shear => self.constants.shear,
            SpringKind::Flexion => self.constants.flexion,
        }
    }

    pub fn rest_length(&self, kind: SpringKind) -> f64 {
        match kind {
            SpringKind::Structural => self.rest_lengths.structural,
            SpringKind::Shear => self.rest_lengths.shear,
            SpringKind::Flexion => self.rest_lengths.flexion,
        }
    }

    /// Force on `i` from `j`, or `None` when they share no spring
    pub fn force_between(&self, state: &StateVector, i: usize, j: usize) -> SimResult<Option<NVec3>> {
        let spring = self
            .springs()
            .find(|s| (s.a == i && s.b == j) || (s.a == j && s.b == i));
        match spring {
            Some(s) => Ok(Some(hooke_force(
                state.position_at(i),
                state.position_at(j),
                self.constant(s.kind),
                self.rest_length(s.kind),
                (i, j),
            )?)),
            None => Ok(None),
        }
    }
}

impl ForceTerm for GridSprings {
    fn accumulate(&self, state: &StateVector, out: &mut [NVec3]) -> SimResult<()> {
        let expected = self.width * self.height;
        if state.particle_count() != expected {
            return Err(SimError::ShapeMismatch {
                expected: 2 * expected,
                found: state.len(),
            });
        }
        for s in self.springs() {
            let f = hooke_force(
                state.position_at(s.a),
                state.position_at(s.b),
                self.constant(s.kind),
                self.rest_length(s.kind),
                (s.a, s.b),
            )?;
            out[s.a] += f;
            out[s.b] -= f;
        }
        Ok(())
    }
}

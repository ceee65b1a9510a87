//! Core state types for the particle systems.
//!
//! Defines the interleaved state layout shared by every system:
//! - `StateVector`: (position, velocity) pairs, index `2i` / `2i + 1`
//! - `DerivativeVector`: (velocity, acceleration) pairs, same layout
//!
//! Integrators only ever combine whole vectors, so the pairing survives
//! every step as long as `eval_f` returns a vector of matching shape.

use nalgebra::Vector3;

use crate::error::{SimError, SimResult};

pub type NVec3 = Vector3<f64>;

/// Time derivative of a [`StateVector`]: (velocity, acceleration) pairs.
pub type DerivativeVector = StateVector;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StateVector {
    data: Vec<NVec3>, // interleaved x_0, v_0, x_1, v_1, ...
}

impl StateVector {
    /// Build from an interleaved vector; rejects odd lengths.
    pub fn from_interleaved(data: Vec<NVec3>) -> SimResult<Self> {
        if data.len() % 2 != 0 {
            return Err(SimError::OddStateLength(data.len()));
        }
        Ok(Self { data })
    }

    /// Build from explicit (position, velocity) pairs.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (NVec3, NVec3)>,
    {
        let mut data = Vec::new();
        for (x, v) in pairs {
            data.push(x);
            data.push(v);
        }
        Self { data }
    }

    /// Particles at `positions`, all at rest.
    pub fn at_rest<I>(positions: I) -> Self
    where
        I: IntoIterator<Item = NVec3>,
    {
        Self::from_pairs(positions.into_iter().map(|x| (x, NVec3::zeros())))
    }

    /// All-zero vector for `n` particles.
    pub fn zeros(n: usize) -> Self {
        Self {
            data: vec![NVec3::zeros(); 2 * n],
        }
    }

    pub fn particle_count(&self) -> usize {
        self.data.len() / 2
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[NVec3] {
        &self.data
    }

    /// Position of particle `i`.
    ///
    /// # Panics
    /// If `i >= particle_count()`.
    pub fn position_at(&self, i: usize) -> NVec3 {
        self.data[2 * i]
    }

    /// Velocity of particle `i`.
    ///
    /// # Panics
    /// If `i >= particle_count()`.
    pub fn velocity_at(&self, i: usize) -> NVec3 {
        self.data[2 * i + 1]
    }

    /// Checked (position, velocity) of particle `i`.
    pub fn particle(&self, i: usize) -> SimResult<(NVec3, NVec3)> {
        if i >= self.particle_count() {
            return Err(SimError::ParticleIndexOutOfRange {
                index: i,
                count: self.particle_count(),
            });
        }
        Ok((self.data[2 * i], self.data[2 * i + 1]))
    }

    /// Overwrite position and velocity of particle `i`.
    ///
    /// # Panics
    /// If `i >= particle_count()`.
    pub fn set_particle(&mut self, i: usize, x: NVec3, v: NVec3) {
        self.data[2 * i] = x;
        self.data[2 * i + 1] = v;
    }

    /// Iterator over all particle positions.
    pub fn positions(&self) -> impl Iterator<Item = NVec3> + '_ {
        self.data.iter().step_by(2).copied()
    }

    /// Iterator over all particle velocities.
    pub fn velocities(&self) -> impl Iterator<Item = NVec3> + '_ {
        self.data.iter().skip(1).step_by(2).copied()
    }

    /// True when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.iter().all(|c| c.is_finite()))
    }

    /// `self + sum_k w_k * terms[k]`
    ///
    /// Every term must have the same length as `self`; a mismatch means an
    /// `eval_f` implementation broke the pairing contract.
    pub fn combine(&self, terms: &[(f64, &DerivativeVector)]) -> SimResult<StateVector> {
        for (_, d) in terms {
            if d.len() != self.len() {
                return Err(SimError::ShapeMismatch {
                    expected: self.len(),
                    found: d.len(),
                });
            }
        }

        let data = self
            .data
            .iter()
            .enumerate()
            .map(|(k, x)| {
                terms
                    .iter()
                    .fold(*x, |acc, (w, d)| acc + *w * d.data[k])
            })
            .collect();

        Ok(StateVector { data })
    }

    /// Largest Euclidean distance between matching entries of two states.
    pub fn max_deviation(&self, other: &StateVector) -> SimResult<f64> {
        if self.len() != other.len() {
            return Err(SimError::ShapeMismatch {
                expected: self.len(),
                found: other.len(),
            });
        }
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| (a - b).norm())
            .fold(0.0, f64::max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairing_layout() {
        let s = StateVector::from_pairs(vec![
            (NVec3::new(1.0, 0.0, 0.0), NVec3::new(0.0, 1.0, 0.0)),
            (NVec3::new(2.0, 0.0, 0.0), NVec3::new(0.0, 2.0, 0.0)),
        ]);
        assert_eq!(s.len(), 4);
        assert_eq!(s.particle_count(), 2);
        assert_eq!(s.position_at(1), NVec3::new(2.0, 0.0, 0.0));
        assert_eq!(s.velocity_at(0), NVec3::new(0.0, 1.0, 0.0));
        assert_eq!(s.positions().count(), 2);
        assert_eq!(s.velocities().nth(1), Some(NVec3::new(0.0, 2.0, 0.0)));
    }

    #[test]
    fn test_odd_length_rejected() {
        let err = StateVector::from_interleaved(vec![NVec3::zeros(); 3]).unwrap_err();
        assert_eq!(err, SimError::OddStateLength(3));
    }

    #[test]
    fn test_checked_particle_access() {
        let s = StateVector::zeros(2);
        assert!(s.particle(1).is_ok());
        assert_eq!(
            s.particle(2).unwrap_err(),
            SimError::ParticleIndexOutOfRange { index: 2, count: 2 }
        );
    }

    #[test]
    fn test_combine_weighted_sum() {
        let s = StateVector::from_pairs(vec![(NVec3::new(1.0, 0.0, 0.0), NVec3::zeros())]);
        let d = StateVector::from_pairs(vec![(NVec3::new(0.0, 2.0, 0.0), NVec3::new(4.0, 0.0, 0.0))]);
        let out = s.combine(&[(0.5, &d), (0.25, &d)]).unwrap();
        assert_eq!(out.position_at(0), NVec3::new(1.0, 1.5, 0.0));
        assert_eq!(out.velocity_at(0), NVec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_combine_shape_mismatch() {
        let s = StateVector::zeros(2);
        let d = StateVector::zeros(3);
        assert_eq!(
            s.combine(&[(1.0, &d)]).unwrap_err(),
            SimError::ShapeMismatch { expected: 4, found: 6 }
        );
    }

    #[test]
    #[should_panic]
    fn test_set_particle_out_of_range_panics() {
        let mut s = StateVector::zeros(2);
        s.set_particle(2, NVec3::zeros(), NVec3::zeros());
    }

    #[test]
    fn test_non_finite_detection() {
        let mut s = StateVector::zeros(1);
        assert!(s.is_finite());
        s.set_particle(0, NVec3::new(f64::NAN, 0.0, 0.0), NVec3::zeros());
        assert!(!s.is_finite());
    }
}

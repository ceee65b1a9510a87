//! Draw interface between particle systems and a rendering backend
//!
//! Systems only push material, transform, sphere and line calls through
//! [`Renderer`]; the backend decides what they mean. [`DrawRecorder`] keeps
//! the calls as data for tests and headless runs.

use nalgebra::Matrix4;

use crate::simulation::states::NVec3;

pub trait Renderer {
    /// Set the material color for following draws.
    fn update_material(&mut self, color: NVec3);
    /// Set the model transform for following draws.
    fn update_model_matrix(&mut self, transform: Matrix4<f64>);
    fn draw_sphere(&mut self, radius: f64, slices: u32, stacks: u32);
    /// Queue one line segment.
    fn record_line(&mut self, a: NVec3, b: NVec3, color: NVec3);
    /// Flush queued line segments.
    fn draw_lines(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Material(NVec3),
    ModelMatrix(Matrix4<f64>),
    Sphere { radius: f64, slices: u32, stacks: u32 },
    Lines(Vec<(NVec3, NVec3, NVec3)>),
}

/// Renderer that stores every call
#[derive(Debug, Default)]
pub struct DrawRecorder {
    pub calls: Vec<DrawCall>,
    pending: Vec<(NVec3, NVec3, NVec3)>,
}

impl DrawRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sphere_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Sphere { .. }))
            .count()
    }

    pub fn line_count(&self) -> usize {
        self.calls
            .iter()
            .map(|c| match c {
                DrawCall::Lines(l) => l.len(),
                _ => 0,
            })
            .sum()
    }

    /// Translations of every sphere, in draw order.
    pub fn sphere_centers(&self) -> Vec<NVec3> {
        let mut current = Matrix4::identity();
        let mut centers = Vec::new();
        for call in &self.calls {
            match call {
                DrawCall::ModelMatrix(m) => current = *m,
                DrawCall::Sphere { .. } => {
                    centers.push(NVec3::new(current[(0, 3)], current[(1, 3)], current[(2, 3)]));
                }
                _ => {}
            }
        }
        centers
    }

    pub fn clear(&mut self) {
        self.calls.clear();
        self.pending.clear();
    }
}

impl Renderer for DrawRecorder {
    fn update_material(&mut self, color: NVec3) {
        self.calls.push(DrawCall::Material(color));
    }

    fn update_model_matrix(&mut self, transform: Matrix4<f64>) {
        self.calls.push(DrawCall::ModelMatrix(transform));
    }

    fn draw_sphere(&mut self, radius: f64, slices: u32, stacks: u32) {
        self.calls.push(DrawCall::Sphere { radius, slices, stacks });
    }

    fn record_line(&mut self, a: NVec3, b: NVec3, color: NVec3) {
        self.pending.push((a, b, color));
    }

    fn draw_lines(&mut self) {
        let lines = std::mem::take(&mut self.pending);
        self.calls.push(DrawCall::Lines(lines));
    }
}

/// Draw one sphere per particle position
pub fn draw_particles<I>(renderer: &mut dyn Renderer, positions: I, color: NVec3, radius: f64, detail: u32)
where
    I: IntoIterator<Item = NVec3>,
{
    renderer.update_material(color);
    for x in positions {
        renderer.update_model_matrix(Matrix4::new_translation(&x));
        renderer.draw_sphere(radius, detail, detail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_tracks_sphere_centers() {
        let mut rec = DrawRecorder::new();
        let points = vec![NVec3::new(1.0, 2.0, 3.0), NVec3::new(-1.0, 0.0, 0.5)];
        draw_particles(&mut rec, points.clone(), NVec3::new(1.0, 1.0, 1.0), 0.1, 8);
        assert_eq!(rec.sphere_count(), 2);
        assert_eq!(rec.sphere_centers(), points);
    }

    #[test]
    fn test_lines_flushed_on_draw() {
        let mut rec = DrawRecorder::new();
        rec.record_line(NVec3::zeros(), NVec3::x(), NVec3::zeros());
        rec.record_line(NVec3::zeros(), NVec3::y(), NVec3::zeros());
        assert_eq!(rec.line_count(), 0);
        rec.draw_lines();
        assert_eq!(rec.line_count(), 2);
    }
}

use super::config::{AtomLayout, SceneConfig};
use crate::core::geometry::Rect;
use crate::core::models::atom::Atom;
use nalgebra::Point2;

/// Places the atoms of `scene` inside `bounds`.
pub fn build_atoms(scene: &SceneConfig, bounds: &Rect) -> Vec<Atom> {
    match scene.layout {
        AtomLayout::Single { width } => {
            let width = width.unwrap_or_else(|| bounds.width());
            vec![Atom::new(scene.atom_kind, bounds.center(), width)]
        }
        AtomLayout::Lattice { rows, columns } => {
            let cell_width = bounds.width() / columns as f64;
            let cell_height = bounds.height() / rows as f64;
            let atom_width = cell_width.min(cell_height);
            (0..rows)
                .flat_map(|row| (0..columns).map(move |column| (row, column)))
                .map(|(row, column)| {
                    let center = Point2::new(
                        bounds.min.x + (column as f64 + 0.5) * cell_width,
                        bounds.min.y + (row as f64 + 0.5) * cell_height,
                    );
                    Atom::new(scene.atom_kind, center, atom_width)
                })
                .collect()
        }
    }
}

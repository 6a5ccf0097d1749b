use nalgebra::Vector2;

/// A mesh vertex. `id` is the global vertex index; edges refer to vertices
/// by value but compare them by `id`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vert {
    pub id: usize,
    pub x: f64,
    pub y: f64,
}

impl Vert {
    #[inline]
    pub fn new(id: usize, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    #[inline]
    pub fn pos(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

use bytemuck::Pod;
use bytemuck::Zeroable;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

pub const TRIANGLE: [Vertex; 3] = [
    Vertex {
        position: [-0.5, -0.5, 0.0],
    },
    Vertex {
        position: [0.0, 0.5, 0.0],
    },
    Vertex {
        position: [0.5, -0.5, 0.0],
    },
];

pub const VERTEX_STRIDE: u32 = std::mem::size_of::<Vertex>() as u32;

pub fn triangle_bytes() -> &'static [u8] {
    bytemuck::cast_slice(&TRIANGLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_is_three_tightly_packed_positions() {
        assert_eq!(VERTEX_STRIDE, 12);
        assert_eq!(triangle_bytes().len(), 36);

        let round_trip: &[Vertex] = bytemuck::cast_slice(triangle_bytes());
        assert_eq!(round_trip, &TRIANGLE);
    }
}

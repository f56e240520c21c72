use bytemuck::{Pod, Zeroable};

/// Floats in one packed vertex record.
pub const VERT_LEN: usize = 12;

pub const POSITION_OFFSET: usize = 0;
pub const TEX_COORD_OFFSET: usize = 3;
pub const TEX_BOUNDS_OFFSET: usize = 5;
pub const TINT_OFFSET: usize = 9;

/// One vertex as laid out in the mesh buffers. Records wider than [`VERT_LEN`] carry zeros
/// after these fields.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ChunkVertex {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
    /// Atlas rectangle as `[u_min, v_min, u_max, v_max]`.
    pub tex_bounds: [f32; 4],
    /// Vertex tint already multiplied by the face shade.
    pub tint: [f32; 3],
}
const _: [(); 48] = [(); std::mem::size_of::<ChunkVertex>()];

impl ChunkVertex {
    /// Reads the leading [`VERT_LEN`] floats of `record`.
    pub fn read(record: &[f32]) -> Option<Self> {
        let fields = record.get(..VERT_LEN)?;
        Some(bytemuck::pod_read_unaligned(bytemuck::cast_slice(fields)))
    }

    /// Writes the vertex into the leading [`VERT_LEN`] floats of `record`.
    pub fn write(&self, record: &mut [f32]) {
        let fields: &[f32] = bytemuck::cast_slice(std::slice::from_ref(self));
        record[..VERT_LEN].copy_from_slice(fields);
    }
}

/// Iterates the records of a packed buffer with stride `vert_len`.
pub fn vertices(buffer: &[f32], vert_len: usize) -> impl Iterator<Item = ChunkVertex> + '_ {
    buffer
        .chunks_exact(vert_len.max(VERT_LEN))
        .filter_map(ChunkVertex::read)
}

#[cfg(test)]
mod tests {
    use super::{
        vertices, ChunkVertex, POSITION_OFFSET, TEX_BOUNDS_OFFSET, TEX_COORD_OFFSET, TINT_OFFSET,
        VERT_LEN,
    };

    fn sample() -> ChunkVertex {
        ChunkVertex {
            position: [1.0, 2.0, 3.0],
            tex_coord: [0.25, 0.75],
            tex_bounds: [0.0, 0.5, 0.5, 1.0],
            tint: [0.9, 0.8, 0.7],
        }
    }

    #[test]
    fn field_offsets_match_record_layout() {
        let mut record = [0.0f32; VERT_LEN];
        sample().write(&mut record);

        assert_eq!(&record[POSITION_OFFSET..TEX_COORD_OFFSET], &[1.0, 2.0, 3.0]);
        assert_eq!(&record[TEX_COORD_OFFSET..TEX_BOUNDS_OFFSET], &[0.25, 0.75]);
        assert_eq!(&record[TEX_BOUNDS_OFFSET..TINT_OFFSET], &[0.0, 0.5, 0.5, 1.0]);
        assert_eq!(&record[TINT_OFFSET..VERT_LEN], &[0.9, 0.8, 0.7]);
    }

    #[test]
    fn wide_records_leave_padding_untouched() {
        let mut buffer = vec![0.0f32; 16 * 2];
        sample().write(&mut buffer[..16]);
        sample().write(&mut buffer[16..]);

        assert!(buffer[VERT_LEN..16].iter().all(|&value| value == 0.0));
        let read: Vec<_> = vertices(&buffer, 16).collect();
        assert_eq!(read, vec![sample(), sample()]);
    }

    #[test]
    fn short_records_are_rejected() {
        assert_eq!(ChunkVertex::read(&[0.0; VERT_LEN - 1]), None);
    }
}

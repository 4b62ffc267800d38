use super::error::RasterError;

/// Groups a flat vertex sequence into consecutive triangles, preserving order.
///
/// Output is appended to `triangles` so the caller can reuse its allocation
/// between frames. A sequence whose length isn't a multiple of three is rejected
/// before anything is appended.
pub fn assemble_primitives<T: Clone>(vertices: &[T], triangles: &mut Vec<[T; 3]>) -> Result<(), RasterError> {
    if vertices.len() % 3 != 0 {
        return Err(RasterError::MalformedPrimitiveGroup { count: vertices.len() });
    }
    triangles.reserve(vertices.len() / 3);
    for group in vertices.chunks_exact(3) {
        triangles.push([group[0].clone(), group[1].clone(), group[2].clone()]);
    }
    return Ok(());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_in_order_and_concatenates_back() {
        let vertices: Vec<u32> = (0..12).collect();
        let mut triangles = Vec::new();
        assemble_primitives(&vertices, &mut triangles).unwrap();
        assert_eq!(triangles.len(), 4);
        assert_eq!(triangles[1], [3, 4, 5]);
        let flattened: Vec<u32> = triangles.iter().flatten().copied().collect();
        assert_eq!(flattened, vertices);
    }

    #[test]
    fn rejects_partial_group_without_touching_output() {
        let mut triangles = vec![[9, 9, 9]];
        let result = assemble_primitives(&[1, 2, 3, 4], &mut triangles);
        assert_eq!(result, Err(RasterError::MalformedPrimitiveGroup { count: 4 }));
        assert_eq!(triangles, vec![[9, 9, 9]]);
    }

    #[test]
    fn empty_input_yields_no_triangles() {
        let mut triangles: Vec<[u8; 3]> = Vec::new();
        assemble_primitives(&[], &mut triangles).unwrap();
        assert!(triangles.is_empty());
    }
}

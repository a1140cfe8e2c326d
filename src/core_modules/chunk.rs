// THEORY:
// The `Chunk` module represents a square block of the grayscale plane that will
// collapse into a single cell of the 28×28 network input. It is the unit of
// spatial pooling: a 280×280 canvas becomes 784 blocks of 10×10 pixels.
//
// Key architectural principles:
// 1.  **Zero-copy view**: A `Chunk` borrows the grayscale plane and remembers only
//     its origin and size. Averaging walks the rows in place.
// 2.  **Noise Reduction**: Averaging a block smooths out the jagged edges of a
//     rasterized stroke, so a thin line contributes a partial value to the cells
//     it crosses instead of an all-or-nothing one.
// 3.  **Data Container**: `Chunk` knows how to summarize itself and nothing else.
//     The polarity inversion and grid layout live in the `grid_manager`.

pub mod chunk {
    use crate::core_modules::grayscale::GrayscaleMatrix;

    /// A square block of a `GrayscaleMatrix`.
    pub struct Chunk<'a> {
        matrix: &'a GrayscaleMatrix,
        /// Column of the block's top-left pixel.
        pub origin_x: usize,
        /// Row of the block's top-left pixel.
        pub origin_y: usize,
        /// Edge length of the block in pixels.
        pub size: usize,
    }

    impl<'a> Chunk<'a> {
        pub fn new(matrix: &'a GrayscaleMatrix, origin_x: usize, origin_y: usize, size: usize) -> Self {
            debug_assert!(origin_x + size <= matrix.width);
            debug_assert!(origin_y + size <= matrix.height);
            Self {
                matrix,
                origin_x,
                origin_y,
                size,
            }
        }

        /// Mean intensity over the block. An empty block averages to 0.
        pub fn average_intensity(&self) -> f32 {
            let num_pixels = self.size * self.size;
            if num_pixels == 0 {
                return 0.0;
            }

            // Accumulate in f64 so large blocks do not lose low-order bits.
            let mut sum = 0f64;
            for v in 0..self.size {
                let row = self.matrix.row(self.origin_y + v);
                for &value in &row[self.origin_x..self.origin_x + self.size] {
                    sum += value as f64;
                }
            }

            (sum / num_pixels as f64) as f32
        }
    }
}

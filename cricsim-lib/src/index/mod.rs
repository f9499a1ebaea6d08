//! Exhaustive nearest-neighbour index
//!
//! Vectors are stored row-major and searched by brute force under squared
//! Euclidean distance. With unit-normalized rows this ranks exactly like
//! cosine similarity. The corpus is a few hundred players per format, so no
//! approximation is needed.

use crate::{Error, Result};

/// A search hit: a row position and its squared L2 distance to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

/// Flat index over vectors of one fixed dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Create an empty index for vectors of `dimension` entries.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::InvalidInput("index dimension must be positive".into()));
        }
        Ok(Self {
            dimension,
            data: Vec::new(),
        })
    }

    /// Rebuild an index from its row-major contents.
    pub fn from_parts(dimension: usize, data: Vec<f32>) -> Result<Self> {
        let index = Self::new(dimension)?;
        if data.len() % dimension != 0 {
            return Err(Error::InvalidInput(format!(
                "{} values do not split into rows of {dimension}",
                data.len()
            )));
        }
        Ok(Self { data, ..index })
    }

    /// Append a vector, returning its position.
    pub fn add(&mut self, vector: &[f32]) -> Result<usize> {
        self.check_dimension(vector)?;
        let position = self.len();
        self.data.extend_from_slice(vector);
        Ok(position)
    }

    /// Find the `k` nearest rows to `query`, nearest first.
    ///
    /// Equal distances keep ascending position order. `k` larger than the
    /// index returns every row.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.check_dimension(query)?;

        let mut neighbors: Vec<Neighbor> = self
            .rows()
            .enumerate()
            .map(|(position, row)| Neighbor {
                position,
                distance: squared_l2(query, row),
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.position.cmp(&b.position))
        });
        neighbors.truncate(k);

        Ok(neighbors)
    }

    /// The stored vector at `position`.
    #[must_use]
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dimension)?;
        let end = start.checked_add(self.dimension)?;
        self.data.get(start..end)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dimension)
    }

    /// Row-major contents.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

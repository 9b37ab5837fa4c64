/// Cosine similarity. The zero vector has no direction; its similarity to
/// anything is 0.
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Dense symmetric k×k similarity matrix with a unit diagonal.
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    pub fn build(vectors: &[&[f64]]) -> Self {
        let size = vectors.len();
        let mut values = vec![0.0; size * size];
        for i in 0..size {
            values[i * size + i] = 1.0;
            for j in (i + 1)..size {
                let sim = cosine(vectors[i], vectors[j]);
                values[i * size + j] = sim;
                values[j * size + i] = sim;
            }
        }
        Self { size, values }
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    /// Mean similarity of member `i` to every other member.
    pub fn avg_for(&self, i: usize) -> f64 {
        if self.size < 2 {
            return 0.0;
        }
        let row_sum: f64 = (0..self.size).filter(|&j| j != i).map(|j| self.get(i, j)).sum();
        row_sum / (self.size - 1) as f64
    }

    /// Mean over the upper triangle (all unordered pairs); 0 with no pairs.
    pub fn upper_triangle_mean(&self) -> f64 {
        if self.size < 2 {
            return 0.0;
        }
        let mut sum = 0.0;
        let mut pairs = 0usize;
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                sum += self.get(i, j);
                pairs += 1;
            }
        }
        sum / pairs as f64
    }
}

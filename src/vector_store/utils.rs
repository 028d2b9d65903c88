/// Render an embedding as a pgvector literal, e.g. `[0.1,0.2]`.
pub fn vector_literal(embedding: &[f32]) -> String {
    format!(
        "[{}]",
        embedding
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    )
}

/// Euclidean distance. Extra components of the longer vector count as
/// distance from zero.
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len().max(b.len());
    (0..n)
        .map(|i| {
            let d = a.get(i).copied().unwrap_or(0.0) - b.get(i).copied().unwrap_or(0.0);
            d * d
        })
        .sum::<f32>()
        .sqrt()
}

/// Map an L2 distance onto a (0, 1] similarity score.
pub fn distance_to_score(distance: f32) -> f32 {
    1.0 / (1.0 + distance.max(0.0))
}

use tch::{Kind, Tensor};

const NORM_EPSILON: f64 = 1e-9;

/// Cosine similarity of every row of `embeddings` (`[n, dim]`) with `reference` (`[dim]`).
/// A zero vector has a similarity of 0 with anything.
pub(crate) fn cosine_similarity(reference: &Tensor, embeddings: &Tensor) -> Tensor {
    let embeddings = embeddings
        / embeddings
            .linalg_norm(2.0, vec![1i64].as_slice(), true, Kind::Float)
            .clamp_min(NORM_EPSILON);
    let reference = reference
        / reference
            .linalg_norm(2.0, vec![0i64].as_slice(), true, Kind::Float)
            .clamp_min(NORM_EPSILON);

    embeddings.matmul(&reference).clamp(-1.0, 1.0)
}

/// Unit first right singular vector of the (uncentered) `[n, dim]` matrix, `None` if the
/// matrix is null.
pub(crate) fn first_principal_component(vectors: &Tensor) -> Option<Tensor> {
    let (_, singular_values, right_singular_vectors) = vectors.svd(true, true);
    if singular_values.size()[0] == 0 || singular_values.double_value(&[0]) <= NORM_EPSILON {
        return None;
    }
    Some(right_singular_vectors.select(1, 0))
}

/// Subtracts from every row of `vectors` its projection on the unit vector `component`.
pub(crate) fn remove_projection(vectors: &Tensor, component: &Tensor) -> Tensor {
    let projection = vectors.matmul(component);
    vectors - projection.unsqueeze(1) * component.unsqueeze(0)
}

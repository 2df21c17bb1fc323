use crate::SifRankError;
use serde::{Deserialize, Serialize};
use tch::{Kind, Tensor};

/// # Mixing weights of the embedding model layers
///
/// Lower layers of a contextual model carry more syntactic information, upper layers more
/// semantic information. Weights must be finite, non-negative and not all zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerWeights(pub Vec<f64>);

impl Default for LayerWeights {
    /// Uses only the middle layer of a three layer model
    fn default() -> Self {
        LayerWeights(vec![0.0, 1.0, 0.0])
    }
}

impl From<[f64; 3]> for LayerWeights {
    fn from(weights: [f64; 3]) -> Self {
        LayerWeights(weights.to_vec())
    }
}

impl LayerWeights {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn validate(&self) -> Result<(), SifRankError> {
        if self.0.is_empty() {
            return Err(SifRankError::InvalidRequestError(
                "At least one layer weight must be provided".to_string(),
            ));
        }
        if let Some(weight) = self
            .0
            .iter()
            .find(|weight| !weight.is_finite() || **weight < 0.0)
        {
            return Err(SifRankError::InvalidRequestError(format!(
                "Layer weights must be finite and non-negative, got {}",
                weight
            )));
        }
        if self.0.iter().all(|weight| *weight == 0.0) {
            return Err(SifRankError::InvalidRequestError(
                "Layer weights cannot all be zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Combines per-layer token embeddings.
    ///
    /// # Arguments
    ///
    /// * `layers` - `Tensor` of shape (*layers*, *tokens*, *embedding dimension*)
    ///
    /// # Returns
    ///
    /// * `Tensor` of shape (*tokens*, *embedding dimension*): weighted sum of the layers
    pub fn mix(&self, layers: &Tensor) -> Result<Tensor, SifRankError> {
        self.validate()?;
        let layer_count = layers.size().first().copied().unwrap_or(0);
        if layers.dim() != 3 || layer_count != self.0.len() as i64 {
            return Err(SifRankError::InvalidRequestError(format!(
                "{} layer weights provided for embeddings of shape {:?}",
                self.0.len(),
                layers.size()
            )));
        }
        let weights = Tensor::from_slice(self.0.as_slice())
            .to_kind(Kind::Float)
            .to(layers.device())
            .view([-1, 1, 1]);
        Ok((layers.to_kind(Kind::Float) * weights).sum_dim_intlist(
            [0i64].as_slice(),
            false,
            Kind::Float,
        ))
    }
}

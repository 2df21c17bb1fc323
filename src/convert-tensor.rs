// Copyright 2019-present, Laurent Mazare.
// Copyright 2019-present Guillaume Becquin
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

extern crate tch;

use sif_rank::SifRankError;

/// Converts a NumPy archive of embedding layers (`layer_0`, `layer_1`... each of shape
/// `[vocabulary, dimension]`) to the libtorch format loaded by `StaticEmbedder`.
pub fn main() -> Result<(), SifRankError> {
    let args: Vec<_> = std::env::args().collect();
    if args.len() != 3 {
        return Err(SifRankError::InvalidRequestError(format!(
            "usage: {} source.npz destination.ot",
            args[0].as_str()
        )));
    }

    let source_file = &args[1];
    let destination_file = &args[2];
    let tensors = tch::Tensor::read_npz(source_file)?;

    let shape = match tensors.first() {
        Some((_, tensor)) => tensor.size(),
        None => {
            return Err(SifRankError::InvalidConfigurationError(format!(
                "No embedding layer found in {}",
                source_file
            )));
        }
    };
    for (name, tensor) in tensors.iter() {
        if !name.starts_with("layer_") || tensor.size() != shape || shape.len() != 2 {
            return Err(SifRankError::InvalidConfigurationError(format!(
                "Expected `layer_<index>` matrices of shape {:?}, got `{}` of shape {:?}",
                shape,
                name,
                tensor.size()
            )));
        }
    }

    tch::Tensor::save_multi(&tensors, destination_file)?;
    println!(
        "Converted {} embedding layers of shape {:?} to {}",
        tensors.len(),
        shape,
        destination_file
    );

    Ok(())
}

// Loader for trained weights exported as JSON:
//
//     { "w1": [[..784 rows of H1..]], "b1": [..H1..],
//       "w2": [[..H1 rows of H2..]],  "b2": [..H2..],
//       "w3": [[..H2 rows of 10..]],  "b3": [..10..] }
//
// Matrices are `inputs × outputs`, the same orientation the dense layer reads.

use crate::core_modules::dense_layer::LayerWeights;
use crate::core_modules::error::PreconditionError;
use crate::core_modules::network::NetworkWeights;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum WeightsFileError {
    #[error("Failed to read weights from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed weights JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Inconsistent weight shapes: {0}")]
    Shape(#[from] PreconditionError),
}

#[derive(Debug, Deserialize)]
struct WeightsDocument {
    w1: Vec<Vec<f64>>,
    b1: Vec<f64>,
    w2: Vec<Vec<f64>>,
    b2: Vec<f64>,
    w3: Vec<Vec<f64>>,
    b3: Vec<f64>,
}

/// Parses a JSON weights document and validates its shapes.
pub fn parse_weights_json(json: &str) -> Result<NetworkWeights, WeightsFileError> {
    let doc: WeightsDocument = serde_json::from_str(json)?;
    let weights = NetworkWeights::new(
        LayerWeights::new(doc.w1, doc.b1)?,
        LayerWeights::new(doc.w2, doc.b2)?,
        LayerWeights::new(doc.w3, doc.b3)?,
    )?;
    Ok(weights)
}

/// Reads and validates a JSON weights file.
pub fn load_weights_json(path: &Path) -> Result<NetworkWeights, WeightsFileError> {
    let json = std::fs::read_to_string(path).map_err(|source| WeightsFileError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let weights = parse_weights_json(&json)?;
    let (h1, h2) = weights.hidden_sizes();
    info!(path = %path.display(), h1, h2, "loaded network weights");
    Ok(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::grid_manager::FEATURE_LEN;
    use serde_json::json;

    fn document(h1: usize, h2: usize, classes: usize) -> String {
        json!({
            "w1": vec![vec![0.01f64; h1]; FEATURE_LEN],
            "b1": vec![0.0f64; h1],
            "w2": vec![vec![0.02f64; h2]; h1],
            "b2": vec![0.0f64; h2],
            "w3": vec![vec![0.03f64; classes]; h2],
            "b3": vec![0.0f64; classes],
        })
        .to_string()
    }

    #[test]
    fn parses_a_well_formed_document() {
        let weights = parse_weights_json(&document(6, 4, 10)).unwrap();
        assert_eq!(weights.hidden_sizes(), (6, 4));
        assert_eq!(weights.layer(2).weight(3, 9), 0.03);
    }

    #[test]
    fn rejects_wrong_class_count() {
        let err = parse_weights_json(&document(6, 4, 9)).unwrap_err();
        assert!(matches!(
            err,
            WeightsFileError::Shape(PreconditionError::OutputClasses { actual: 9, .. })
        ));
    }

    #[test]
    fn rejects_missing_fields() {
        let err = parse_weights_json(r#"{ "w1": [], "b1": [] }"#).unwrap_err();
        assert!(matches!(err, WeightsFileError::Json(_)));
    }

    #[test]
    fn reports_unreadable_file() {
        let err = load_weights_json(Path::new("/nonexistent/weights.json")).unwrap_err();
        assert!(matches!(err, WeightsFileError::Io { .. }));
    }
}

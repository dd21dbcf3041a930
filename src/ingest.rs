//! Parsing of uploaded performance data.
//!
//! Accepts either a bare JSON array of targets or an object carrying the
//! targets plus an average-order-value table keyed by product id.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::IngestError;
use crate::optimizer::Target;

/// Targets and optional per-product AOVs from one upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Upload {
    pub targets: Vec<Target>,
    pub aov_by_product: HashMap<String, Decimal>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UploadBody {
    Bare(Vec<Target>),
    Document {
        targets: Vec<Target>,
        #[serde(default, alias = "averageOrderValues")]
        average_order_values: HashMap<String, Decimal>,
    },
}

/// Parse an uploaded file.
pub fn parse_upload(bytes: &[u8]) -> Result<Upload, IngestError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(IngestError::Empty);
    }

    // Untagged enums only say "did not match any variant".
    let upload = match serde_json::from_slice::<UploadBody>(bytes) {
        Ok(UploadBody::Bare(targets)) => Upload {
            targets,
            aov_by_product: HashMap::new(),
        },
        Ok(UploadBody::Document {
            targets,
            average_order_values,
        }) => Upload {
            targets,
            aov_by_product: average_order_values,
        },
        Err(_) => return Err(detailed_error(bytes)),
    };

    if let Some((product_id, _)) = upload
        .aov_by_product
        .iter()
        .find(|(_, aov)| **aov <= Decimal::ZERO)
    {
        return Err(IngestError::InvalidAverageOrderValue {
            product_id: product_id.clone(),
        });
    }

    tracing::debug!(
        targets = upload.targets.len(),
        products = upload.aov_by_product.len(),
        "Parsed upload"
    );

    Ok(upload)
}

/// Re-parse against the concrete shape to get a useful serde error.
fn detailed_error(bytes: &[u8]) -> IngestError {
    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct Document {
        targets: Vec<Target>,
        #[serde(default, alias = "averageOrderValues")]
        average_order_values: HashMap<String, Decimal>,
    }

    let trimmed = bytes.iter().find(|b| !b.is_ascii_whitespace());
    let err = if trimmed == Some(&b'[') {
        serde_json::from_slice::<Vec<Target>>(bytes).err()
    } else {
        serde_json::from_slice::<Document>(bytes).err()
    };

    match err {
        Some(e) => IngestError::Malformed(e),
        // Both concrete shapes parsed, so only the untagged dispatch failed.
        None => IngestError::Malformed(serde::de::Error::custom(
            "expected a list of targets or an object with a `targets` field",
        )),
    }
}

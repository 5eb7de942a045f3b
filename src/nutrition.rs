use serde::{Deserialize, Serialize};

use crate::errors::TrackerError;

/// Nutrition values for one logged food, as estimated by the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutritionRecord {
    pub proteins: f64,
    pub carbs: f64,
    pub fat: f64,
    pub calories: f64,
}

/// Parse a reply of the form `"<proteins> <carbs> <fat> <calories>"`.
///
/// Only the first four whitespace-separated tokens are looked at; anything after
/// them is ignored. Each token must be a finite, non-negative number. The reply
/// carries no labels or units, so the order is the whole contract.
///
/// `description` is only used to make the error message useful.
pub fn parse_nutrition_response(
    reply: &str,
    description: &str,
) -> Result<NutritionRecord, TrackerError> {
    let malformed = |reason: String| TrackerError::MalformedNutritionResponse {
        description: description.to_string(),
        reply: reply.to_string(),
        reason,
    };

    let tokens: Vec<&str> = reply.split_whitespace().take(4).collect();
    if tokens.len() < 4 {
        return Err(malformed(format!(
            "expected 4 numbers, got {} token(s)",
            tokens.len()
        )));
    }

    let mut values = [0.0_f64; 4];
    for (slot, token) in values.iter_mut().zip(&tokens) {
        let value = token
            .parse::<f64>()
            .map_err(|_| malformed(format!("'{}' is not a number", token)))?;
        if !value.is_finite() || value < 0.0 {
            return Err(malformed(format!(
                "'{}' is not a non-negative number",
                token
            )));
        }
        *slot = value;
    }

    let [proteins, carbs, fat, calories] = values;
    Ok(NutritionRecord {
        proteins,
        carbs,
        fat,
        calories,
    })
}

use serde::{Deserialize, Serialize};

/// Input of the `combine` command: named parameters and how to combine them.
///
/// ```json
/// {
///   "name": "fungi",
///   "combine": "product",
///   "parameters": [
///     { "name": "soil microbial biomass", "value": 3e16, "uncertainty": 2.5 },
///     { "name": "fungal fraction", "fractions": [0.6, 0.75, 0.7] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateSheet {
    /// Name of the taxon or environment being estimated
    pub name: String,
    /// How the parameters combine into the estimate
    pub combine: CombineMode,
    /// Parameters entering the estimate, in sheet order
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineMode {
    /// Multiply the parameters (e.g. area x density x carbon content)
    Product,
    /// Add the parameters (e.g. per-environment biomass into a total)
    Sum,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(flatten)]
    pub source: ParameterSource,
}

/// Where a parameter's value and uncertainty come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterSource {
    /// A value with a known multiplicative CI; without one, the no-data
    /// order-of-magnitude uncertainty is assumed.
    Value {
        value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        uncertainty: Option<f64>,
    },
    /// Independent measurements summarized by their geometric mean.
    Measurements { measurements: Vec<f64> },
    /// Measured fractions summarized in odds space.
    Fractions {
        fractions: Vec<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        weights: Option<Vec<f64>>,
    },
}

impl ParameterSource {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ParameterSource::Value { .. } => "value",
            ParameterSource::Measurements { .. } => "measurements",
            ParameterSource::Fractions { .. } => "fractions",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_parameter_sources() {
        let sheet: EstimateSheet = serde_json::from_str(
            r#"{
                "name": "fungi",
                "combine": "product",
                "parameters": [
                    { "name": "a", "value": 3e16, "uncertainty": 2.5 },
                    { "name": "b", "value": 0.5 },
                    { "name": "c", "measurements": [1.0, 2.0] },
                    { "name": "d", "fractions": [0.2, 0.3], "weights": [1.0, 2.0] }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(sheet.combine, CombineMode::Product);
        let kinds = sheet
            .parameters
            .iter()
            .map(|p| p.source.kind())
            .collect::<Vec<_>>();
        assert_eq!(kinds, ["value", "value", "measurements", "fractions"]);
        assert!(matches!(
            sheet.parameters[1].source,
            ParameterSource::Value {
                uncertainty: None,
                ..
            }
        ));
        assert!(matches!(
            &sheet.parameters[3].source,
            ParameterSource::Fractions { weights: Some(w), .. } if w.len() == 2
        ));
    }

    #[test]
    fn test_unknown_combine_mode_is_rejected() {
        let result = serde_json::from_str::<EstimateSheet>(
            r#"{ "name": "x", "combine": "mean", "parameters": [] }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_parameter_without_source_is_rejected() {
        let result = serde_json::from_str::<Parameter>(r#"{ "name": "x", "uncertainty": 2.0 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_round_trip_keeps_shape() {
        let parameter = Parameter {
            name: "carbon per cell".to_owned(),
            source: ParameterSource::Value {
                value: 1.4e-14,
                uncertainty: None,
            },
        };
        let json = serde_json::to_string(&parameter).unwrap();
        assert_eq!(json, r#"{"name":"carbon per cell","value":1.4e-14}"#);
    }
}

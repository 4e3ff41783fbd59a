use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// Built-in rules, most specific first. A "Pro" variant has to precede its
/// base family or it would be classified under the family multiplier.
const BUILTIN_RULES: &[(&str, f64)] = &[
    (r"iPhone\s*(1[5-6])\s*Pro", 7.0),
    (r"iPhone\s*1[4-6]", 6.86),
    (r"iPhone\s*13\s*Pro", 6.0),
    (r"iPhone", 5.7),
    (r"Pixel\s*8\s*Pro", 6.7),
    (r"Pixel", 6.0),
    (r"Galaxy\s*S2[34]\s*Ultra", 6.6),
    (r"Galaxy\s*S", 6.0),
];

#[derive(Debug, Error)]
pub enum CropFactorError {
    #[error("invalid camera model pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("crop factor for `{pattern}` must be a positive number, got {multiplier}")]
    InvalidMultiplier { pattern: String, multiplier: f64 },
}

#[derive(Debug, Clone)]
pub struct CropFactorRule {
    pattern: Regex,
    multiplier: f64,
}

impl CropFactorRule {
    pub fn new(pattern: &str, multiplier: f64) -> Result<Self, CropFactorError> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(CropFactorError::InvalidMultiplier {
                pattern: pattern.to_string(),
                multiplier,
            });
        }

        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| CropFactorError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self {
            pattern: regex,
            multiplier,
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    fn matches(&self, model: &str) -> bool {
        self.pattern.is_match(model)
    }
}

/// Ordered camera-model rules used to estimate a 35mm-equivalent focal length.
/// First match wins.
#[derive(Debug, Clone)]
pub struct CropFactorTable {
    rules: Vec<CropFactorRule>,
}

impl CropFactorTable {
    pub fn new(rules: Vec<CropFactorRule>) -> Self {
        Self { rules }
    }

    pub fn builtin() -> Result<Self, CropFactorError> {
        Self::with_user_rules(&[])
    }

    /// User rules are consulted before the built-in ones.
    pub fn with_user_rules(user_rules: &[(String, f64)]) -> Result<Self, CropFactorError> {
        let mut rules = Vec::with_capacity(user_rules.len() + BUILTIN_RULES.len());
        for (pattern, multiplier) in user_rules {
            rules.push(CropFactorRule::new(pattern, *multiplier)?);
        }
        for (pattern, multiplier) in BUILTIN_RULES {
            rules.push(CropFactorRule::new(pattern, *multiplier)?);
        }
        Ok(Self::new(rules))
    }

    pub fn lookup(&self, model: &str) -> Option<f64> {
        self.rules
            .iter()
            .find(|rule| rule.matches(model))
            .map(CropFactorRule::multiplier)
    }

    pub fn rules(&self) -> &[CropFactorRule] {
        &self.rules
    }
}

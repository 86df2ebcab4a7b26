//! Settings

use serde::Deserialize;

/// Run-wide settings read from `general.yaml`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GeneralSettings {
    /// Divisor turning a tax-inclusive price into a tax-exclusive one (1.055 for 5.5% VAT)
    #[serde(rename = "vat")]
    pub vat_factor: f64,
}

impl GeneralSettings {
    /// Creates settings with the given VAT factor.
    pub fn new(vat_factor: f64) -> Self {
        Self { vat_factor }
    }

    /// Returns true if the VAT factor can be divided by.
    pub fn is_valid(&self) -> bool {
        self.vat_factor.is_finite() && self.vat_factor > 0.0
    }
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self::new(1.0)
    }
}

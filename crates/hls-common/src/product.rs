//! HLS product types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HlsError;

/// HLS surface reflectance product.
///
/// Both products share the tiling grid and the object naming scheme; they
/// differ only in the sensor the observation was harmonized from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Product {
    /// Sentinel-2 MSI derived, 30m
    S30,
    /// Landsat-8 OLI derived, 30m
    L30,
}

impl Product {
    pub fn as_str(&self) -> &'static str {
        match self {
            Product::S30 => "S30",
            Product::L30 => "L30",
        }
    }

    /// The product observed by the other sensor.
    pub fn other(&self) -> Product {
        match self {
            Product::S30 => Product::L30,
            Product::L30 => Product::S30,
        }
    }

    /// Band numbers for a true-colour composite (red, green, blue).
    pub fn rgb_bands(&self) -> [&'static str; 3] {
        // v1.4 numbers red/green/blue identically for both sensors
        ["04", "03", "02"]
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Product {
    type Err = HlsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "S30" => Ok(Product::S30),
            "L30" => Ok(Product::L30),
            _ => Err(HlsError::invalid(
                "product",
                format!("'{}' is not one of S30, L30", s),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_product() {
        assert_eq!("S30".parse::<Product>().unwrap(), Product::S30);
        assert_eq!("l30".parse::<Product>().unwrap(), Product::L30);
        assert!("S10".parse::<Product>().is_err());
        assert!("".parse::<Product>().is_err());
    }

    #[test]
    fn test_other_product() {
        assert_eq!(Product::S30.other(), Product::L30);
        assert_eq!(Product::L30.other(), Product::S30);
    }
}

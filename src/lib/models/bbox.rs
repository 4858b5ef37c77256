use serde_derive::{Deserialize, Serialize};

/// Geographic rectangle in degrees. All sources are assumed to share one
/// projected CRS, so no reprojection is ever applied to these coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl BoundingBox {
    pub fn new(west: f64, east: f64, south: f64, north: f64) -> Self {
        BoundingBox {
            west,
            east,
            south,
            north,
        }
    }

    /// Washington State study area.
    pub fn washington() -> Self {
        BoundingBox::new(-124.85, -116.90, 45.50, 49.05)
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn washington_box_extents() {
        let b = BoundingBox::washington();
        assert!(b.width() > 0.0);
        assert!(b.height() > 0.0);
    }
}

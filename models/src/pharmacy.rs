// models/src/pharmacy.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Medication catalog entry, replicated across all sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub id: Uuid,
    pub name: String,
    pub active_ingredient: Option<String>,
    pub description: Option<String>,
    pub unit: String,
    pub main_supplier: Option<String>,
}

/// Per-site stock for one medication. Unique per (site, medication) pair;
/// `updated_at` is stamped on every decrement or restock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: Uuid,
    pub site_id: Uuid,
    pub medication_id: Uuid,
    pub stock: u32,
    pub updated_at: DateTime<Utc>,
}

impl InventoryRecord {
    pub fn level(&self) -> StockLevel {
        StockLevel::from_stock(self.stock)
    }
}

/// Banding used by inventory listings and dashboard alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockLevel {
    Critical,
    Low,
    Medium,
    Ok,
}

impl StockLevel {
    pub fn from_stock(stock: u32) -> Self {
        match stock {
            0..=9 => StockLevel::Critical,
            10..=49 => StockLevel::Low,
            50..=99 => StockLevel::Medium,
            _ => StockLevel::Ok,
        }
    }
}

impl fmt::Display for StockLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StockLevel::Critical => "CRITICAL",
            StockLevel::Low => "LOW",
            StockLevel::Medium => "MEDIUM",
            StockLevel::Ok => "OK",
        };
        f.write_str(s)
    }
}

/// A medication issued against a clinical visit. Writing one decrements the
/// dispensing site's stock in the same store operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub history_id: Uuid,
    pub appointment_id: Uuid,
    pub medication_id: Uuid,
    pub dosage: String,
    pub frequency: String,
    pub duration_days: u32,
    pub quantity: u32,
    pub issued_on: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::StockLevel;

    #[test]
    fn stock_bands_match_thresholds() {
        assert_eq!(StockLevel::from_stock(0), StockLevel::Critical);
        assert_eq!(StockLevel::from_stock(9), StockLevel::Critical);
        assert_eq!(StockLevel::from_stock(10), StockLevel::Low);
        assert_eq!(StockLevel::from_stock(49), StockLevel::Low);
        assert_eq!(StockLevel::from_stock(50), StockLevel::Medium);
        assert_eq!(StockLevel::from_stock(99), StockLevel::Medium);
        assert_eq!(StockLevel::from_stock(100), StockLevel::Ok);
    }
}

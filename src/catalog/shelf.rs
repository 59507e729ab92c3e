//! Shelf layout of the store

use crate::types::ShelfId;
use serde::{Deserialize, Serialize};

/// One physical shelf unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelfConfig {
    /// Shelf identifier, e.g. `SHELF-A`
    pub id: ShelfId,
    /// Display name, e.g. `Aisle 1 - Drinks & Dairy`
    pub name: String,
    /// Number of slot rows
    pub rows: u32,
    /// Number of slot columns
    pub columns: u32,
}

impl ShelfConfig {
    /// Create a shelf
    pub fn new(id: impl Into<String>, name: impl Into<String>, rows: u32, columns: u32) -> Self {
        Self { id: ShelfId::new(id), name: name.into(), rows, columns }
    }

    /// Number of product slots on the shelf
    pub fn capacity(&self) -> u32 {
        self.rows * self.columns
    }
}

/// The full shelf layout of a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ShelfLayout {
    /// Name of the layout
    pub layout_name: String,
    /// Shelves in display order
    pub shelves: Vec<ShelfConfig>,
}

impl ShelfLayout {
    /// Create a layout
    pub fn new(layout_name: impl Into<String>, shelves: Vec<ShelfConfig>) -> Self {
        Self { layout_name: layout_name.into(), shelves }
    }

    /// Number of shelves
    pub fn shelf_count(&self) -> usize {
        self.shelves.len()
    }

    /// Look up a shelf by id
    pub fn get(&self, id: &ShelfId) -> Option<&ShelfConfig> {
        self.shelves.iter().find(|shelf| &shelf.id == id)
    }

    /// Whether the layout contains a shelf
    pub fn contains(&self, id: &ShelfId) -> bool {
        self.get(id).is_some()
    }

    /// Iterate over shelf ids in display order
    pub fn shelf_ids(&self) -> impl Iterator<Item = &ShelfId> {
        self.shelves.iter().map(|shelf| &shelf.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_and_lookup() {
        let layout = ShelfLayout::new(
            "Test",
            vec![ShelfConfig::new("SHELF-A", "Aisle 1", 2, 3), ShelfConfig::new("SHELF-B", "Aisle 2", 1, 4)],
        );

        assert_eq!(layout.shelf_count(), 2);
        assert_eq!(layout.get(&ShelfId::from("SHELF-A")).map(|s| s.capacity()), Some(6));
        assert!(layout.contains(&ShelfId::from("SHELF-B")));
        assert!(!layout.contains(&ShelfId::from("SHELF-Z")));
        assert_eq!(layout.shelf_ids().count(), 2);
    }
}

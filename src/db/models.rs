use sqlx::FromRow;
use std::fmt;

/// One row of the `store` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct InventoryItem {
    #[sqlx(rename = "pid")]
    pub id: i64,
    pub quantity: i64,
    #[sqlx(rename = "pname")]
    pub name: String,
}

impl InventoryItem {
    pub fn new(id: i64, quantity: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            quantity,
            name: name.into(),
        }
    }

    /// The row every bootstrapped table carries.
    pub fn sentinel() -> Self {
        Self::new(0, 0, "demo")
    }
}

/// Renders as `(pid, quantity, 'name')`.
impl fmt::Display for InventoryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, '{}')", self.id, self.quantity, self.name)
    }
}

use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
    pub budget: Decimal,
}

impl Category {
    pub fn new(name: String, budget: Decimal) -> Self {
        Self {
            id: None,
            name,
            budget,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

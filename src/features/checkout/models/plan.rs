/// A purchasable credit pack. Prices live on the server; clients only name
/// the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    pub id: &'static str,
    pub name: &'static str,
    /// Price in minor currency units (cents)
    pub amount: i64,
    pub currency: &'static str,
    pub credits: i32,
}

pub const PLANS: [Plan; 3] = [
    Plan {
        id: "basic-plan",
        name: "Basic",
        amount: 699,
        currency: "usd",
        credits: 30,
    },
    Plan {
        id: "premium",
        name: "Premium",
        amount: 999,
        currency: "usd",
        credits: 50,
    },
    Plan {
        id: "pro",
        name: "Pro",
        amount: 1899,
        currency: "usd",
        credits: 100,
    },
];

impl Plan {
    pub fn find(id: &str) -> Option<&'static Plan> {
        PLANS.iter().find(|p| p.id == id)
    }
}

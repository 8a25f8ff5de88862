mod order;
mod plan;

pub use order::{Order, OrderStatus};
pub use plan::{Plan, PLANS};

pub mod random_walk;
pub mod types;

pub use random_walk::{simulate_long_short_positions, simulate_managed_money, weekly_dates};
pub use types::{ManagedMoneyPoint, PositionPoint, RandomWalkParams};

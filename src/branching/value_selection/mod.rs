mod center_value;
mod cheapest_value;
mod max_value;
mod min_value;
mod random_value;
mod value_selector;

pub use center_value::CenterValue;
pub use cheapest_value::CheapestValue;
pub use max_value::MaxValue;
pub use min_value::MinValue;
pub use random_value::RandomValue;
pub use value_selector::ValueSelector;

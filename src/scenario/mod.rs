pub mod draw;
pub mod schema;
pub mod validate;

pub use draw::draw_day_scenarios;
pub use schema::{
    Department, DepartmentParseError, HotelType, HotelTypeParseError, Scenario, ScenarioDraft,
    ScenarioOption,
};
pub use validate::validate_scenario;

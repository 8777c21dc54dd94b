pub mod density;
pub mod length;
pub mod mass;
pub mod pressure;
pub mod temperature;
pub mod time;
pub mod viscosity;


pub use density::Density;
pub use length::Length;
pub use mass::Mass;
pub use pressure::{Pressure, STANDARD_ATMOSPHERE_PA};
pub use temperature::Temperature;
pub use time::Time;
pub use viscosity::Viscosity;

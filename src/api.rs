mod entsoe;
mod generation_source;

pub use self::{
    entsoe::{Api as Entsoe, DEFAULT_API_URL as ENTSOE_DEFAULT_API_URL},
    generation_source::{GenerationSource, PlantSeries},
};

#[cfg(test)]
pub use self::generation_source::tests::{FakeSource, quarter_hourly};

pub mod error;
pub mod export;
pub mod interval;
pub mod psr_type;
pub mod request;
pub mod series;
pub mod session;
pub mod table;
pub mod transform;
pub mod zone;

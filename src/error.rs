use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown optimization method: {0} (use 'linear' or 'grid_search')")]
    UnknownStrategy(String),
    #[error("Unknown sensitivity parameter: {0} (use 'fuel_price_origin', 'fuel_price_dest' or 'cargo_revenue_rate')")]
    UnknownParameter(String),
    #[error("Unknown override key: {0}")]
    UnknownOverride(String),
    #[error("Unknown route code: {0}")]
    UnknownRoute(String),
    #[error("Missing required {section} configuration keys: {keys:?}")]
    MissingKeys {
        section: &'static str,
        keys: Vec<&'static str>,
    },
    #[error("Invalid specification: {0}")]
    InvalidSpec(String),
    #[error("Origin fuel price is zero; tankering factor is undefined")]
    ZeroOriginPrice,
}

pub type Result<T> = std::result::Result<T, Error>;

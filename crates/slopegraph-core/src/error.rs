pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("theme JSON error: {0}")]
    Theme(#[from] serde_json::Error),

    #[error("source table has no column named '{column}'")]
    SchemaMismatch { column: String },

    #[error("no display name is mapped for item id '{id}'")]
    UnknownItem { id: String },

    #[error("duplicate price observation for '{item}' in {city}")]
    PivotCollision { item: String, city: String },

    #[error("no price for '{item}' in {city}")]
    MissingPrice { item: String, city: String },

    #[error("baseline price for '{item}' in {city} is zero; relative variance is undefined")]
    ZeroBaseline { item: String, city: String },
}

pub type SlidereelResult<T> = Result<T, SlidereelError>;

#[derive(thiserror::Error, Debug)]
pub enum SlidereelError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("lookup error: unknown {family} '{name}', available: {available:?}")]
    Lookup {
        family: &'static str,
        name: String,
        available: Vec<String>,
    },

    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlidereelError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn lookup(family: &'static str, name: impl Into<String>, available: Vec<String>) -> Self {
        Self::Lookup {
            family,
            name: name.into(),
            available,
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

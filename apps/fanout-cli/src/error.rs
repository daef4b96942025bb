use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] fanout_csvs::CsvError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] fanout_dispatch::DispatchError),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

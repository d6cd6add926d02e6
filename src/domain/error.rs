use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RangeError {
    #[error("wrong format for date: {input:?} ({source}), please use dd.mm.yyyy")]
    InvalidDateFormat {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("from-date needs to be before to-date ({from} > {to})")]
    RangeInverted { from: NaiveDate, to: NaiveDate },

    #[error("history of {0} days reaches outside the supported calendar")]
    HistoryOutOfRange(u64),
}

//! Conversion from raw trade replies to settlements.

use super::wire::TradeReply;
use super::Settlement;
use crate::error::{HttpError, SdkError, SessionError};
use crate::shared::parse_decimal;

/// Shown when the exchange refuses a trade without saying why.
const DEFAULT_REJECTION: &str = "Trade rejected";

impl TryFrom<TradeReply> for Settlement {
    type Error = SdkError;

    fn try_from(reply: TradeReply) -> Result<Self, Self::Error> {
        match reply.status {
            200 => {
                let holdings = parse_decimal(&reply.body)
                    .map_err(|e| SdkError::Session(SessionError::InvalidHoldings(e)))?;
                Ok(Settlement::Filled { holdings })
            }
            400 => {
                let message = reply.body.trim();
                Ok(Settlement::Rejected {
                    message: if message.is_empty() {
                        DEFAULT_REJECTION.to_string()
                    } else {
                        message.to_string()
                    },
                })
            }
            status => Err(SdkError::Http(HttpError::ServerError {
                status,
                body: reply.body,
            })),
        }
    }
}

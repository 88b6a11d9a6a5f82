#![warn(clippy::all)]

#[macro_use]
extern crate error_chain;

pub mod api_client;
pub mod auth;
pub mod budget_formatter;
pub mod category_filter;
pub mod clipboard;
mod cli;
pub mod constants;
pub mod group_name_parser;
pub mod rate_limiter;
pub mod scenario;
pub mod types;
pub mod utilities;
pub mod ynab_client;

pub mod errors {
    error_chain! {
        errors {
            RateLimitExceeded(max_requests: u32) {
                description("YNAB API rate limit exceeded")
                display("YNAB API rate limit exceeded: max {} requests per hour.", max_requests)
            }
            InvalidCredential(reason: String) {
                description("invalid credential")
                display("Refusing to send request with invalid credential: {}", reason)
            }
            NetworkError(detail: String) {
                description("network error")
                display("Network error while contacting YNAB API: {}", detail)
            }
            ApiError(status: Option<u16>, message: String) {
                description("YNAB API error")
                display("YNAB API error: {}", message)
            }
            DecodeError(detail: String) {
                description("YNAB API response could not be parsed")
                display("Failed to parse YNAB API response: {}", detail)
            }
            InvalidApiKeyFormat {
                description("invalid API key format")
                display("Invalid API key format")
            }
        }
    }
}

pub use cli::run;

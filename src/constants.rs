use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;

pub const YNAB_API_BASE_URL: &str = "https://api.ynab.com/v1";

pub const MAX_REQUESTS_PER_WINDOW: u32 = 200;
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60 * 60);
pub const NETWORK_RETRY_DELAY: Duration = Duration::from_millis(500);

pub const DEFAULT_PAGE_SIZE: &str = "25";
pub const VARIABLE_CATEGORY_TYPE: &str = "variable";
pub const GROUP_NAME_SEPARATOR: char = ':';

pub const YNAB_ACCESS_TOKEN_ARG: &str = "ynab-access-token";
pub const YNAB_ACCESS_TOKEN_ENV: &str = "YNAB_ACCESS_TOKEN";
pub const YNAB_BUDGET_ID_ARG: &str = "budget-id";
pub const YNAB_BUDGET_ID_ENV: &str = "YNAB_BUDGET_ID";
pub const DEV_MODE_ARG: &str = "dev";
pub const DEV_MODE_ENV: &str = "YNAB_BUDGET_LAB_DEV";
pub const CATEGORY_ID_ARG: &str = "category-id";
pub const PAGE_ARG: &str = "page";
pub const PAGE_SIZE_ARG: &str = "page-size";
pub const FILTER_ARG: &str = "filter";
pub const SORT_ARG: &str = "sort";
pub const DESC_ARG: &str = "desc";
pub const DISABLE_ARG: &str = "disable";
pub const ADJUST_ARG: &str = "adjust";
pub const SELECT_ARG: &str = "select";
pub const COPY_ARG: &str = "copy";
pub const POSSIBLE_BOOL_VALUES: [&str; 2] = ["true", "false"];

pub const AUTH_COMMAND: &str = "auth";
pub const BUDGETS_COMMAND: &str = "budgets";
pub const CATEGORIES_COMMAND: &str = "categories";
pub const TRANSACTIONS_COMMAND: &str = "transactions";
pub const SCENARIO_COMMAND: &str = "scenario";

lazy_static! {
    pub static ref API_KEY_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9_-]{32,64}$").expect("API_KEY_REGEX should be valid");
    // Budget identifiers that have been mistakenly passed where the access token belongs.
    pub static ref BUDGET_ID_LIKE_REGEX: Regex = Regex::new(
        r"(?i)^(?:[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}|last-used|default|.*budget[-_]id.*)$"
    )
    .expect("BUDGET_ID_LIKE_REGEX should be valid");
}

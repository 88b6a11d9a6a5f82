use chrono::NaiveDate;
use std::env;
use std::ffi::OsStr;

use crate::errors::*;

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Splits a `KEY=VALUE` command line argument at the first `=`.
pub fn split_key_value(arg: &str) -> Result<(&str, &str)> {
    let mut parts = arg.splitn(2, '=');
    let key = parts.next().unwrap_or("").trim();
    let value = parts
        .next()
        .chain_err(|| format!("Invalid argument (expected KEY=VALUE): {}", arg))?;
    ensure!(!key.is_empty(), "Invalid argument (empty key): {}", arg);
    Ok((key, value))
}

pub fn default_env<V: AsRef<OsStr>>(var_name: &str, default_value: V) {
    if let Err(env::VarError::NotPresent) = env::var(var_name) {
        env::set_var(var_name, default_value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_iso_date() {
        assert_eq!(
            format_iso_date(NaiveDate::from_ymd_opt(2011, 4, 7).unwrap()),
            "2011-04-07"
        );
    }

    #[test]
    fn test_split_key_value() {
        assert_eq!(split_key_value("c1=12.5").unwrap(), ("c1", "12.5"));
        assert_eq!(split_key_value(" name = a=b").unwrap(), ("name", " a=b"));
        assert!(split_key_value("c1").is_err());
        assert!(split_key_value("=5").is_err());
    }

    #[test]
    fn test_default_env_keeps_existing_value() {
        env::set_var("YNAB_BUDGET_LAB_TEST_EXISTING", "set");
        default_env("YNAB_BUDGET_LAB_TEST_EXISTING", "default");
        assert_eq!(env::var("YNAB_BUDGET_LAB_TEST_EXISTING").unwrap(), "set");
        default_env("YNAB_BUDGET_LAB_TEST_MISSING", "default");
        assert_eq!(env::var("YNAB_BUDGET_LAB_TEST_MISSING").unwrap(), "default");
    }
}

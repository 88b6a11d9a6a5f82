use log::debug;
use std::collections::HashSet;

use crate::api_client::*;
use crate::auth::*;
use crate::budget_formatter::*;
use crate::category_filter::*;
use crate::clipboard::*;
use crate::constants::*;
use crate::errors::*;
use crate::scenario::*;
use crate::types::*;
use crate::utilities::*;
use crate::ynab_client::*;

pub fn run() -> Result<()> {
    initialize();
    run_clap_matches(get_clap_matches())
}

fn initialize() {
    openssl_probe::init_ssl_cert_env_vars();
    dotenv::dotenv().ok();
    env_logger::init();

    default_env(DEV_MODE_ENV, false.to_string());
}

fn get_clap_matches() -> clap::ArgMatches<'static> {
    clap::App::new(clap::crate_name!())
        .version(option_env!("CI_BUILD_VERSION").unwrap_or(clap::crate_version!()))
        .author(clap::crate_authors!())
        .about(clap::crate_description!())
        .setting(clap::AppSettings::SubcommandRequiredElseHelp)
        .arg(
            clap::Arg::with_name(YNAB_ACCESS_TOKEN_ARG)
                .env(YNAB_ACCESS_TOKEN_ENV)
                .long(YNAB_ACCESS_TOKEN_ARG)
                .value_name("KEY")
                .help("YNAB personal access token")
                .takes_value(true)
                .required(true),
        )
        .arg(
            clap::Arg::with_name(DEV_MODE_ARG)
                .env(DEV_MODE_ENV)
                .long(DEV_MODE_ARG)
                .value_name("BOOLEAN")
                .help("Log every YNAB API request and response (at 'info' level)")
                .takes_value(true)
                .possible_values(&POSSIBLE_BOOL_VALUES),
        )
        .subcommand(
            clap::SubCommand::with_name(AUTH_COMMAND)
                .about("Check the access token format and confirm it with YNAB"),
        )
        .subcommand(clap::SubCommand::with_name(BUDGETS_COMMAND).about("List budgets"))
        .subcommand(
            clap::SubCommand::with_name(CATEGORIES_COMMAND)
                .about("List a budget's categories, optionally filtered and sorted")
                .arg(budget_id_arg())
                .args(&filter_sort_args()),
        )
        .subcommand(
            clap::SubCommand::with_name(TRANSACTIONS_COMMAND)
                .about("Show one page of a category's transactions")
                .arg(budget_id_arg())
                .arg(
                    clap::Arg::with_name(CATEGORY_ID_ARG)
                        .long(CATEGORY_ID_ARG)
                        .value_name("ID")
                        .help("Category whose transactions are shown")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    clap::Arg::with_name(PAGE_ARG)
                        .long(PAGE_ARG)
                        .value_name("N")
                        .help("Page number, starting at 1")
                        .takes_value(true)
                        .default_value("1")
                        .validator(validate_positive_number),
                )
                .arg(
                    clap::Arg::with_name(PAGE_SIZE_ARG)
                        .long(PAGE_SIZE_ARG)
                        .value_name("N")
                        .help("Transactions per page")
                        .takes_value(true)
                        .default_value(DEFAULT_PAGE_SIZE)
                        .validator(validate_positive_number),
                ),
        )
        .subcommand(
            clap::SubCommand::with_name(SCENARIO_COMMAND)
                .about("Run a what-if scenario over a budget's categories")
                .arg(budget_id_arg())
                .args(&filter_sort_args())
                .arg(
                    clap::Arg::with_name(DISABLE_ARG)
                        .long(DISABLE_ARG)
                        .value_name("ID")
                        .help("Leave this category out of the total")
                        .takes_value(true)
                        .multiple(true)
                        .number_of_values(1),
                )
                .arg(
                    clap::Arg::with_name(ADJUST_ARG)
                        .long(ADJUST_ARG)
                        .value_name("ID=AMOUNT")
                        .help("Override a variable category's amount (in milliunits)")
                        .takes_value(true)
                        .multiple(true)
                        .number_of_values(1),
                )
                .arg(
                    clap::Arg::with_name(SELECT_ARG)
                        .long(SELECT_ARG)
                        .value_name("ID")
                        .help("Include this category in the spreadsheet formula")
                        .takes_value(true)
                        .multiple(true)
                        .number_of_values(1),
                )
                .arg(
                    clap::Arg::with_name(COPY_ARG)
                        .long(COPY_ARG)
                        .help("Also copy the spreadsheet formula to the system clipboard")
                        .requires(SELECT_ARG),
                ),
        )
        .get_matches()
}

fn budget_id_arg() -> clap::Arg<'static, 'static> {
    clap::Arg::with_name(YNAB_BUDGET_ID_ARG)
        .env(YNAB_BUDGET_ID_ENV)
        .long(YNAB_BUDGET_ID_ARG)
        .value_name("ID")
        .help("YNAB budget identifier (see the 'budgets' command)")
        .takes_value(true)
        .required(true)
}

fn filter_sort_args() -> Vec<clap::Arg<'static, 'static>> {
    vec![
        clap::Arg::with_name(FILTER_ARG)
            .long(FILTER_ARG)
            .value_name("KEY=VALUE")
            .help("Only show categories whose field equals the value (frequency, priority and type come from the group name)")
            .takes_value(true)
            .multiple(true)
            .number_of_values(1)
            .validator(|value| {
                FilterState::parse_filter_arg(&value)
                    .map(|_| ())
                    .map_err(|err| err.to_string())
            }),
        clap::Arg::with_name(SORT_ARG)
            .long(SORT_ARG)
            .value_name("KEY")
            .help("Sort categories by this field")
            .takes_value(true),
        clap::Arg::with_name(DESC_ARG)
            .long(DESC_ARG)
            .help("Sort in descending order")
            .requires(SORT_ARG),
    ]
}

fn validate_positive_number(value: String) -> std::result::Result<(), String> {
    match value.parse::<usize>() {
        Ok(number) if number > 0 => Ok(()),
        _ => Err(format!("Expected a positive number: {}", value)),
    }
}

fn run_clap_matches(matches: clap::ArgMatches) -> Result<()> {
    let dev_mode = clap::value_t!(matches.value_of(DEV_MODE_ARG), bool)
        .expect("CLAP matches should have valid DEV_MODE_ARG");
    let mut auth_gate = AuthGate::new();
    auth_gate.set_token(
        matches
            .value_of(YNAB_ACCESS_TOKEN_ARG)
            .expect("CLAP matches should have YNAB_ACCESS_TOKEN_ARG"),
    )?;
    let api_client = YnabApiClient::new(dev_mode);
    let ynab_client = YnabClient::new(&api_client);
    let access_token = auth_gate.token().ok_or(ErrorKind::InvalidApiKeyFormat)?;
    let formatter = BudgetFormatter::new();

    match matches.subcommand() {
        (AUTH_COMMAND, Some(_)) => {
            println!("Confirming access token with YNAB...");
            let user = auth_gate
                .confirm_live(&ynab_client)
                .chain_err(|| "Failed to confirm access token with YNAB")?;
            println!("Access token is valid (YNAB user {}).", user.id);
            Ok(())
        }
        (BUDGETS_COMMAND, Some(_)) => {
            println!("Loading budgets from YNAB...");
            let budgets = ynab_client
                .fetch_budgets(access_token)
                .chain_err(|| "Failed to load budgets from YNAB")?;
            for budget in budgets {
                println!("  {} ({})", budget.name, budget.id);
            }
            Ok(())
        }
        (CATEGORIES_COMMAND, Some(sub_matches)) => {
            let categories = load_categories(&ynab_client, access_token, sub_matches)?;
            println!("{}", formatter.format_categories(&categories));
            Ok(())
        }
        (TRANSACTIONS_COMMAND, Some(sub_matches)) => {
            let budget_id = budget_id(sub_matches);
            let category_id = YnabCategoryId::new(
                sub_matches
                    .value_of(CATEGORY_ID_ARG)
                    .expect("CLAP matches should have CATEGORY_ID_ARG"),
            );
            let page = clap::value_t!(sub_matches.value_of(PAGE_ARG), usize)
                .expect("CLAP matches should have valid PAGE_ARG");
            let page_size = clap::value_t!(sub_matches.value_of(PAGE_SIZE_ARG), usize)
                .expect("CLAP matches should have valid PAGE_SIZE_ARG");
            println!("Loading transactions from YNAB...");
            let transactions_page = ynab_client
                .fetch_transactions(access_token, &budget_id, &category_id, page, page_size)
                .chain_err(|| "Failed to load transactions from YNAB")?;
            println!(
                "{}",
                formatter.format_transactions_page(&transactions_page, page, page_size)
            );
            Ok(())
        }
        (SCENARIO_COMMAND, Some(sub_matches)) => {
            let categories = load_categories(&ynab_client, access_token, sub_matches)?;
            run_scenario(&categories, sub_matches, &formatter)
        }
        _ => bail!("Unknown command"),
    }
}

fn budget_id(matches: &clap::ArgMatches) -> YnabBudgetId {
    YnabBudgetId::new(
        matches
            .value_of(YNAB_BUDGET_ID_ARG)
            .expect("CLAP matches should have YNAB_BUDGET_ID_ARG"),
    )
}

fn load_categories(
    ynab_client: &YnabClient,
    access_token: &str,
    matches: &clap::ArgMatches,
) -> Result<Vec<Category>> {
    println!("Loading categories from YNAB...");
    let categories = ynab_client
        .fetch_categories(access_token, &budget_id(matches))
        .chain_err(|| "Failed to load categories from YNAB")?;
    let filter_state = matches
        .values_of(FILTER_ARG)
        .map(|values| {
            values.fold(Ok(FilterState::new()), |state: Result<FilterState>, arg| {
                let (key, value) = FilterState::parse_filter_arg(arg)?;
                Ok(state?.with(&key, value))
            })
        })
        .transpose()?;
    let sort_state = matches.value_of(SORT_ARG).map(|key| {
        SortState::new(
            key,
            if matches.is_present(DESC_ARG) {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            },
        )
    });
    debug!(
        "Applying filter {:?} and sort {:?} to {} categories",
        filter_state,
        sort_state,
        categories.len()
    );
    Ok(apply_filter_sort(
        &categories,
        filter_state.as_ref(),
        sort_state.as_ref(),
    ))
}

fn run_scenario(
    categories: &[Category],
    matches: &clap::ArgMatches,
    formatter: &BudgetFormatter,
) -> Result<()> {
    let mut engine = ScenarioEngine::new(categories);
    let find_category = |id: &str| {
        categories
            .iter()
            .find(|category| category.id.0 == id)
            .chain_err(|| format!("No category with id {} in this scenario", id))
    };

    for id in matches.values_of(DISABLE_ARG).into_iter().flatten() {
        engine.set_enabled(&find_category(id)?.id, false);
    }
    for arg in matches.values_of(ADJUST_ARG).into_iter().flatten() {
        let (id, amount) = split_key_value(arg)?;
        let category = find_category(id)?;
        ensure!(
            engine.is_adjustable(category),
            "Only variable categories may be adjusted: {}",
            category.name
        );
        let amount = amount
            .trim()
            .parse::<f64>()
            .chain_err(|| format!("Invalid amount for category {}: {}", id, amount))?;
        engine.adjust(&category.id, amount);
    }

    println!("{}", formatter.format_scenario(categories, &engine));

    let selected_ids = matches
        .values_of(SELECT_ARG)
        .into_iter()
        .flatten()
        .map(|id| find_category(id).map(|category| category.id.clone()))
        .collect::<Result<HashSet<YnabCategoryId>>>()?;
    if matches.is_present(COPY_ARG) {
        if let Some(formula) =
            copy_selected_formula(&engine, categories, &selected_ids, &mut SystemClipboard)?
        {
            println!("Copied spreadsheet formula to the clipboard: {}", formula);
        }
    } else if let Some(formula) = engine.selected_formula(categories, &selected_ids) {
        println!("Spreadsheet formula for the selected categories:");
        println!("{}", formula);
    }
    Ok(())
}

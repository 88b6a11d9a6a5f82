#[macro_use]
extern crate error_chain;

quick_main!(ynab_budget_lab::run);

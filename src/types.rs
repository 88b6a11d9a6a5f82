use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(transparent)]
pub struct YnabBudgetId(pub String);

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(transparent)]
pub struct YnabCategoryId(pub String);

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(transparent)]
pub struct YnabTransactionId(pub String);

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ApiResponse<T> {
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<ApiErrorDetail>,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct ApiErrorDetail {
    pub id: String,
    pub name: String,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct UserData {
    pub user: User,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct BudgetSummary {
    pub id: YnabBudgetId,
    pub name: String,
    #[serde(default)]
    pub last_modified_on: Option<String>,
    #[serde(default)]
    pub first_month: Option<String>,
    #[serde(default)]
    pub last_month: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct BudgetsData {
    pub budgets: Vec<BudgetSummary>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Category {
    pub id: YnabCategoryId,
    pub name: String,
    pub category_group_id: String,
    #[serde(default)]
    pub category_group_name: String,
    pub budgeted: i64,
    pub activity: i64,
    pub balance: i64,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default, rename = "type")]
    pub category_type: Option<String>,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CategoryGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CategoryGroupsData {
    pub category_groups: Vec<CategoryGroup>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Transaction {
    pub id: YnabTransactionId,
    pub date: NaiveDate,
    pub amount: i64,
    #[serde(default)]
    pub memo: Option<String>,
    pub cleared: String,
    pub approved: bool,
    #[serde(default)]
    pub category_id: Option<YnabCategoryId>,
    #[serde(default)]
    pub payee_name: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TransactionsData {
    pub transactions: Vec<Transaction>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransactionsPage {
    pub items: Vec<Transaction>,
    pub total: usize,
}

impl YnabBudgetId {
    pub fn new(id: impl Into<String>) -> YnabBudgetId {
        YnabBudgetId(id.into())
    }
}

impl YnabCategoryId {
    pub fn new(id: impl Into<String>) -> YnabCategoryId {
        YnabCategoryId(id.into())
    }
}

impl fmt::Display for YnabBudgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for YnabCategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for YnabTransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TransactionsPage {
    /// Number of pages for display purposes; an empty result still shows one page.
    pub fn total_pages(&self, page_size: usize) -> usize {
        if page_size == 0 {
            return 1;
        }
        let full_pages = self.total / page_size;
        let partial_page = usize::from(self.total % page_size != 0);
        std::cmp::max(1, full_pages + partial_page)
    }
}
